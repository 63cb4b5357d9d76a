//! Free-text vehicle matching against the tankopedia catalog.
//!
//! Matching is case-insensitive and diacritic-insensitive, so a query
//! typed as "Lowe" resolves the vehicle named "Löwe".

use blitz_common::VehicleEntry;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::wargaming::CatalogResult;

/// Upper bound on catalog matches before a query is rejected as too
/// broad, mirroring the tankopedia endpoint's page limit.
pub const CATALOG_MATCH_LIMIT: u32 = 100;

/// Outcome of resolving a user's free-text vehicle query.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// Nothing in the catalog survives the query.
    NoMatch,
    /// The catalog matched more entries than the limit; carries the count.
    TooManyCandidates(u32),
    /// All surviving entries, ascending by tank id. Several vehicles
    /// sharing a name fragment is a normal outcome, not an error.
    Matched(Vec<VehicleEntry>),
}

/// Casefold a vehicle name and strip diacritics.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Classify the catalog collaborator's answer for `query`.
///
/// The collaborator already filtered with its own semantics; entries are
/// re-checked here against the normalized query, since upstream does not
/// necessarily fold accents the way chat input needs. An over-limit count
/// short-circuits before any local filtering.
pub fn resolve(query: &str, catalog: &CatalogResult) -> MatchResult {
    if catalog.count > CATALOG_MATCH_LIMIT {
        return MatchResult::TooManyCandidates(catalog.count);
    }

    let needle = normalize_name(query);
    let mut matched: Vec<VehicleEntry> = catalog
        .entries
        .iter()
        .filter(|entry| normalize_name(&entry.name).contains(&needle))
        .cloned()
        .collect();

    if matched.is_empty() {
        return MatchResult::NoMatch;
    }
    matched.sort_by_key(|entry| entry.tank_id);
    MatchResult::Matched(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tank_id: u32, name: &str) -> VehicleEntry {
        VehicleEntry {
            tank_id,
            name: name.to_string(),
            nation: "germany".to_string(),
            tier: 8,
        }
    }

    fn catalog(entries: Vec<VehicleEntry>) -> CatalogResult {
        CatalogResult {
            count: entries.len() as u32,
            entries,
        }
    }

    #[test]
    fn normalize_strips_case_and_accents() {
        assert_eq!(normalize_name("Löwe"), "lowe");
        assert_eq!(normalize_name("Großtraktor"), "großtraktor");
        assert_eq!(normalize_name("T-34-85 Victory"), "t-34-85 victory");
    }

    #[test]
    fn accented_catalog_name_matches_plain_query() {
        let result = resolve("Lowe", &catalog(vec![entry(54289, "Löwe")]));
        assert_eq!(result, MatchResult::Matched(vec![entry(54289, "Löwe")]));
    }

    #[test]
    fn no_survivors_is_no_match() {
        let result = resolve("Maus", &catalog(vec![entry(54289, "Löwe")]));
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn fragment_matches_all_siblings_in_id_order() {
        let result = resolve(
            "pershing",
            &catalog(vec![
                entry(13345, "T26E4 SuperPershing"),
                entry(5921, "M26 Pershing"),
            ]),
        );
        match result {
            MatchResult::Matched(entries) => {
                assert_eq!(
                    entries.iter().map(|e| e.tank_id).collect::<Vec<_>>(),
                    vec![5921, 13345]
                );
            }
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    #[test]
    fn over_limit_short_circuits_without_filtering() {
        // The entry list deliberately contains nothing matching the
        // query: an over-limit count must win before local filtering.
        let result = resolve(
            "t",
            &CatalogResult {
                count: 236,
                entries: vec![entry(1, "Löwe")],
            },
        );
        assert_eq!(result, MatchResult::TooManyCandidates(236));
    }
}
