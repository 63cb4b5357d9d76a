//! Per-user account records.
//!
//! One document per chat user id, holding the linked account id and the
//! counters captured at the last whole-account query. The commands only
//! ever read; the dispatch layer persists the `RecordUpdate` a command
//! hands back, and creates the link in the first place.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use blitz_common::{AccountRecord, RecordUpdate};

/// The record-store surface the commands consume.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Record for a chat user, if that user ever linked an account.
    async fn find(&self, user_id: &str) -> Result<Option<AccountRecord>>;

    /// Create or refresh the link from a chat user to an account id.
    /// Stored counters, if any, are kept.
    async fn link_account(&self, user_id: &str, account_id: u64) -> Result<()>;

    /// Persist fresh counters for a linked user.
    async fn apply_update(&self, user_id: &str, update: &RecordUpdate) -> Result<()>;
}

// ============================================================================
// In-memory store (testing)
// ============================================================================

/// HashMap-backed store for tests and local experiments.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, AccountRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a complete record, counters included.
    pub fn insert(&self, record: AccountRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(&self, user_id: &str) -> Result<Option<AccountRecord>> {
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn link_account(&self, user_id: &str, account_id: u64) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        records
            .entry(user_id.to_string())
            .and_modify(|record| record.account_id = account_id)
            .or_insert_with(|| AccountRecord::new(user_id, account_id));
        Ok(())
    }

    async fn apply_update(&self, user_id: &str, update: &RecordUpdate) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(user_id) else {
            bail!("no record for user {user_id}");
        };
        record.wins = Some(update.wins);
        record.battles = Some(update.battles);
        record.damage = Some(update.damage);
        Ok(())
    }
}

// ============================================================================
// SQLite store (production)
// ============================================================================

/// Single-table SQLite store, one row per chat user.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    path: PathBuf,
}

impl SqliteRecordStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let store = Self { path };
        store.init_db()?;
        Ok(store)
    }

    fn conn(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("failed opening record db at {}", self.path.display()))
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS account_records (
    user_id TEXT PRIMARY KEY,
    account_id INTEGER NOT NULL,
    wins INTEGER,
    battles INTEGER,
    damage REAL,
    updated_at TEXT NOT NULL
);
"#,
        )
        .context("failed creating record table")?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find(&self, user_id: &str) -> Result<Option<AccountRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT account_id, wins, battles, damage FROM account_records WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let account_id: i64 = row.get(0)?;
                    let wins: Option<i64> = row.get(1)?;
                    let battles: Option<i64> = row.get(2)?;
                    let damage: Option<f64> = row.get(3)?;
                    Ok(AccountRecord {
                        user_id: user_id.to_string(),
                        account_id: account_id as u64,
                        wins: wins.map(|w| w as u64),
                        battles: battles.map(|b| b as u64),
                        damage,
                    })
                },
            )
            .optional()
            .context("failed querying account record")?;
        Ok(record)
    }

    async fn link_account(&self, user_id: &str, account_id: u64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
INSERT INTO account_records (user_id, account_id, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(user_id) DO UPDATE SET account_id = excluded.account_id, updated_at = excluded.updated_at
"#,
            params![user_id, account_id as i64, chrono::Utc::now().to_rfc3339()],
        )
        .context("failed linking account")?;
        Ok(())
    }

    async fn apply_update(&self, user_id: &str, update: &RecordUpdate) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
UPDATE account_records
SET wins = ?2, battles = ?3, damage = ?4, updated_at = ?5
WHERE user_id = ?1
"#,
                params![
                    user_id,
                    update.wins as i64,
                    update.battles as i64,
                    update.damage,
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .context("failed updating account record")?;
        if changed == 0 {
            bail!("no record for user {user_id}");
        }
        Ok(())
    }
}
