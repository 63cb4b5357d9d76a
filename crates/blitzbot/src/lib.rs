//! Blitzbot - World of Tanks Blitz win-rate chat bot core.
//!
//! Resolves free-text vehicle names against the tankopedia, fetches
//! battle statistics from the Wargaming mobile API, and formats the
//! "tank-win-rate" / "win-rate" chat responses, including the progress
//! delta since the user last asked. The chat gateway and the command
//! dispatch framework live outside this crate: they hand in
//! `IncomingMessage` values plus the invoker's stored record, send
//! whatever `Reply::Message` comes back, and persist returned record
//! updates.

pub mod commands;
pub mod config;
pub mod matcher;
pub mod record;
pub mod wargaming;
