//! Wargaming mobile API boundary.
//!
//! The commands consume the [`WargamingApi`] trait; production traffic
//! goes through [`WotbClient`], and tests use [`FakeWargamingApi`] with
//! pre-configured answers and per-method call counters.
//!
//! Failures propagate unchanged to the caller. No retries, no caching,
//! no partial responses at this layer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use blitz_common::{BattleCounters, VehicleEntry};

use crate::config::BotConfig;
use crate::matcher::normalize_name;

const VEHICLES_PATH: &str = "/wotb/encyclopedia/vehicles/";
const TANK_STATS_PATH: &str = "/wotb/tanks/stats/";
const ACCOUNT_INFO_PATH: &str = "/wotb/account/info/";

const VEHICLES_FIELDS: &str = "name,nation,tier";
const TANK_STATS_FIELDS: &str = "tank_id,all.battles,all.wins,all.damage_dealt";
const ACCOUNT_INFO_FIELDS: &str =
    "statistics.all.battles,statistics.all.wins,statistics.all.damage_dealt";

/// Errors at the API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: u32, message: String },

    #[error("malformed API response: {0}")]
    Malformed(String),
}

/// Catalog entries matching a name filter, with the match count.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogResult {
    pub count: u32,
    pub entries: Vec<VehicleEntry>,
}

/// Battle counters of one vehicle on one account.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VehicleStats {
    pub tank_id: u32,
    pub all: BattleCounters,
}

/// The slice of the Wargaming mobile API the commands consume.
#[async_trait]
pub trait WargamingApi: Send + Sync {
    /// Catalog entries matching a free-text name filter. A count above
    /// the matcher's limit is reported as-is and the caller may ignore
    /// the entry list.
    async fn vehicles(&self, name_filter: &str) -> Result<CatalogResult>;

    /// Per-vehicle counters for one account, batched over the given tank
    /// ids in order. `None` when the API holds no record of the account.
    async fn tank_stats(
        &self,
        account_id: u64,
        tank_ids: &[u32],
    ) -> Result<Option<Vec<VehicleStats>>>;

    /// Whole-account counters. `None` when the account is unknown upstream.
    async fn account_info(&self, account_id: u64) -> Result<Option<BattleCounters>>;
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    status: String,
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    meta: Option<ApiMeta>,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiMeta {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Deserialize)]
struct CatalogEntryBody {
    name: String,
    nation: String,
    tier: u32,
}

#[derive(Debug, Deserialize)]
struct AccountInfoBody {
    statistics: AccountStatisticsBody,
}

#[derive(Debug, Deserialize)]
struct AccountStatisticsBody {
    all: BattleCounters,
}

// ============================================================================
// Production client
// ============================================================================

/// HTTP client for api.wotblitz.com.
pub struct WotbClient {
    http: reqwest::Client,
    base_url: String,
    application_id: String,
    access_token: String,
    language: String,
}

impl WotbClient {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base.clone(),
            application_id: config.application_id.clone(),
            access_token: config.access_token.clone(),
            language: config.language.clone(),
        }
    }

    async fn post_api<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "wotblitz API request");

        let response = self.http.post(&url).form(form).send().await?;
        let envelope: ApiEnvelope<T> = response.error_for_status()?.json().await?;

        if envelope.status != "ok" {
            let body = envelope.error.unwrap_or(ApiErrorBody {
                code: 0,
                message: "unknown error".to_string(),
            });
            return Err(ApiError::Api {
                code: body.code,
                message: body.message,
            });
        }
        if let Some(meta) = &envelope.meta {
            debug!(count = meta.count, path, "wotblitz API response");
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Malformed(format!("missing data for {path}")))
    }
}

#[async_trait]
impl WargamingApi for WotbClient {
    async fn vehicles(&self, name_filter: &str) -> Result<CatalogResult> {
        let form = [
            ("application_id", self.application_id.clone()),
            ("fields", VEHICLES_FIELDS.to_string()),
            ("language", self.language.clone()),
            ("nation", String::new()),
            ("tank_id", String::new()),
        ];
        let data: HashMap<String, CatalogEntryBody> =
            self.post_api(VEHICLES_PATH, &form).await?;

        // The encyclopedia endpoint has no server-side name filter, so the
        // filter contract is honored here: only matching entries are
        // returned and `count` is the number of matches.
        let needle = normalize_name(name_filter);
        let mut entries = Vec::new();
        for (tank_id, body) in data {
            if !normalize_name(&body.name).contains(&needle) {
                continue;
            }
            let tank_id = tank_id
                .parse::<u32>()
                .map_err(|_| ApiError::Malformed(format!("non-numeric tank id `{tank_id}`")))?;
            entries.push(VehicleEntry {
                tank_id,
                name: body.name,
                nation: body.nation,
                tier: body.tier,
            });
        }
        entries.sort_by_key(|entry| entry.tank_id);

        Ok(CatalogResult {
            count: entries.len() as u32,
            entries,
        })
    }

    async fn tank_stats(
        &self,
        account_id: u64,
        tank_ids: &[u32],
    ) -> Result<Option<Vec<VehicleStats>>> {
        let tank_id_list = tank_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let form = [
            ("access_token", self.access_token.clone()),
            ("account_id", account_id.to_string()),
            ("application_id", self.application_id.clone()),
            ("fields", TANK_STATS_FIELDS.to_string()),
            ("in_garage", String::new()),
            ("language", self.language.clone()),
            ("tank_id", tank_id_list),
        ];
        let mut data: HashMap<String, Option<Vec<VehicleStats>>> =
            self.post_api(TANK_STATS_PATH, &form).await?;
        Ok(data.remove(&account_id.to_string()).flatten())
    }

    async fn account_info(&self, account_id: u64) -> Result<Option<BattleCounters>> {
        let form = [
            ("access_token", self.access_token.clone()),
            ("account_id", account_id.to_string()),
            ("application_id", self.application_id.clone()),
            ("extra", String::new()),
            ("fields", ACCOUNT_INFO_FIELDS.to_string()),
            ("language", self.language.clone()),
        ];
        let mut data: HashMap<String, Option<AccountInfoBody>> =
            self.post_api(ACCOUNT_INFO_PATH, &form).await?;
        Ok(data
            .remove(&account_id.to_string())
            .flatten()
            .map(|body| body.statistics.all))
    }
}

// ============================================================================
// Fake client (testing)
// ============================================================================

/// Deterministic [`WargamingApi`] with pre-configured answers.
///
/// Applies the same name-filter semantics as [`WotbClient`], so matcher
/// and command tests exercise the real local-validation path. Call
/// counters let tests assert exactly how many upstream requests a
/// command made.
#[derive(Default)]
pub struct FakeWargamingApi {
    catalog: Vec<VehicleEntry>,
    tank_stats: Option<Vec<VehicleStats>>,
    account_info: Option<BattleCounters>,
    vehicles_calls: AtomicUsize,
    tank_stats_calls: AtomicUsize,
    account_info_calls: AtomicUsize,
    last_tank_stats_request: Mutex<Option<(u64, Vec<u32>)>>,
}

impl FakeWargamingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the full catalog the fake filters per query.
    pub fn with_catalog(mut self, catalog: Vec<VehicleEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Seed the per-vehicle stats answer. Without this, the account is
    /// reported as having no record at all (`data[account] = null`).
    pub fn with_tank_stats(mut self, stats: Vec<VehicleStats>) -> Self {
        self.tank_stats = Some(stats);
        self
    }

    /// Seed the whole-account counters answer.
    pub fn with_account_info(mut self, counters: BattleCounters) -> Self {
        self.account_info = Some(counters);
        self
    }

    pub fn vehicles_calls(&self) -> usize {
        self.vehicles_calls.load(Ordering::SeqCst)
    }

    pub fn tank_stats_calls(&self) -> usize {
        self.tank_stats_calls.load(Ordering::SeqCst)
    }

    pub fn account_info_calls(&self) -> usize {
        self.account_info_calls.load(Ordering::SeqCst)
    }

    /// Account id and tank-id batch of the most recent stats request.
    pub fn last_tank_stats_request(&self) -> Option<(u64, Vec<u32>)> {
        self.last_tank_stats_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl WargamingApi for FakeWargamingApi {
    async fn vehicles(&self, name_filter: &str) -> Result<CatalogResult> {
        self.vehicles_calls.fetch_add(1, Ordering::SeqCst);

        let needle = normalize_name(name_filter);
        let mut entries: Vec<VehicleEntry> = self
            .catalog
            .iter()
            .filter(|entry| normalize_name(&entry.name).contains(&needle))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.tank_id);

        Ok(CatalogResult {
            count: entries.len() as u32,
            entries,
        })
    }

    async fn tank_stats(
        &self,
        account_id: u64,
        tank_ids: &[u32],
    ) -> Result<Option<Vec<VehicleStats>>> {
        self.tank_stats_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_tank_stats_request.lock().unwrap() = Some((account_id, tank_ids.to_vec()));
        Ok(self.tank_stats.clone())
    }

    async fn account_info(&self, _account_id: u64) -> Result<Option<BattleCounters>> {
        self.account_info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.account_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ok_envelope() {
        let raw = r#"{
            "status": "ok",
            "meta": {"count": 1},
            "data": {
                "54289": {"name": "Löwe", "nation": "germany", "tier": 8}
            }
        }"#;
        let envelope: ApiEnvelope<HashMap<String, CatalogEntryBody>> =
            serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.status, "ok");
        assert_eq!(envelope.meta.unwrap().count, 1);
        assert_eq!(envelope.data.unwrap()["54289"].name, "Löwe");
    }

    #[test]
    fn decodes_error_envelope() {
        let raw = r#"{
            "status": "error",
            "error": {"code": 407, "message": "INVALID_APPLICATION_ID", "field": "application_id"}
        }"#;
        let envelope: ApiEnvelope<HashMap<String, CatalogEntryBody>> =
            serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.status, "error");
        let body = envelope.error.unwrap();
        assert_eq!(body.code, 407);
        assert_eq!(body.message, "INVALID_APPLICATION_ID");
    }

    #[test]
    fn decodes_null_account_in_tank_stats() {
        let raw = r#"{"status": "ok", "meta": {"count": 1}, "data": {"100998143": null}}"#;
        let envelope: ApiEnvelope<HashMap<String, Option<Vec<VehicleStats>>>> =
            serde_json::from_str(raw).unwrap();
        let mut data = envelope.data.unwrap();
        assert_eq!(data.remove("100998143").flatten(), None);
    }

    #[tokio::test]
    async fn fake_filters_and_counts_like_the_contract() {
        let fake = FakeWargamingApi::new().with_catalog(vec![
            VehicleEntry {
                tank_id: 13345,
                name: "T26E4 SuperPershing".to_string(),
                nation: "usa".to_string(),
                tier: 8,
            },
            VehicleEntry {
                tank_id: 5921,
                name: "M26 Pershing".to_string(),
                nation: "usa".to_string(),
                tier: 8,
            },
            VehicleEntry {
                tank_id: 54289,
                name: "Löwe".to_string(),
                nation: "germany".to_string(),
                tier: 8,
            },
        ]);

        let result = fake.vehicles("pershing").await.unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(
            result.entries.iter().map(|e| e.tank_id).collect::<Vec<_>>(),
            vec![5921, 13345]
        );
        assert_eq!(fake.vehicles_calls(), 1);
    }

    #[tokio::test]
    async fn fake_records_tank_stats_requests() {
        let fake = FakeWargamingApi::new();

        let stats = fake.tank_stats(100998145, &[5921, 13345]).await.unwrap();
        assert_eq!(stats, None);
        assert_eq!(fake.tank_stats_calls(), 1);
        assert_eq!(
            fake.last_tank_stats_request(),
            Some((100998145, vec![5921, 13345]))
        );
    }
}
