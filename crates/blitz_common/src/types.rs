//! Value types shared across the win-rate core.
//!
//! Everything here is constructed fresh per query and dropped once the
//! response is built, except `AccountRecord`, which mirrors the document
//! the record store keeps per chat user.

use serde::{Deserialize, Serialize};

/// One vehicle from the tankopedia catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleEntry {
    pub tank_id: u32,
    pub name: String,
    pub nation: String,
    pub tier: u32,
}

/// Raw battle counters for an account or a single vehicle.
///
/// The upstream API guarantees `wins <= battles`; this core does not
/// re-validate that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleCounters {
    #[serde(default)]
    pub battles: u64,
    #[serde(default)]
    pub wins: u64,
    #[serde(default)]
    pub damage_dealt: f64,
}

/// Metrics derived from one snapshot of counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub win_rate_pct: f64,
    pub avg_damage: f64,
}

/// Progress between two snapshots of the same account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaStats {
    pub battles: u64,
    pub wins: u64,
    pub win_rate_pct: f64,
    /// Absent when the stored record predates damage tracking.
    pub avg_damage: Option<f64>,
}

/// Persisted per-user record, keyed by the chat platform user id.
///
/// `wins`/`battles`/`damage` are absent on a record that has never been
/// through a whole-account query. `damage` can additionally be absent on
/// older records written before damage was tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub user_id: String,
    pub account_id: u64,
    #[serde(default)]
    pub wins: Option<u64>,
    #[serde(default)]
    pub battles: Option<u64>,
    #[serde(default)]
    pub damage: Option<f64>,
}

impl AccountRecord {
    /// A record that links a chat user to an account id but carries no
    /// stored counters yet.
    pub fn new(user_id: impl Into<String>, account_id: u64) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            wins: None,
            battles: None,
            damage: None,
        }
    }
}

/// Fresh counters handed back for the caller to persist after a
/// whole-account query. Always the fetched totals, never deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub wins: u64,
    pub battles: u64,
    pub damage: f64,
}
