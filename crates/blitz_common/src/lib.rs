//! Blitz Common - shared types and math for the win-rate bot.
//!
//! Pure layer shared by the command core: value types, battle-counter
//! math, and chat number formatting. No I/O and no async in this crate.

pub mod display_format;
pub mod stats;
pub mod types;

pub use types::*;
