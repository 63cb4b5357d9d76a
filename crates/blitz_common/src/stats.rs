//! Win-rate and damage math over battle counters.
//!
//! Pure functions; the orchestrators own fetching and formatting.

use crate::types::{AccountRecord, BattleCounters, DeltaStats, DerivedStats};

/// Derive win percentage and average damage from raw counters.
///
/// Zero battles yields zero for both metrics, never a division.
pub fn derive(counters: &BattleCounters) -> DerivedStats {
    if counters.battles == 0 {
        return DerivedStats {
            win_rate_pct: 0.0,
            avg_damage: 0.0,
        };
    }
    let battles = counters.battles as f64;
    DerivedStats {
        win_rate_pct: counters.wins as f64 / battles * 100.0,
        avg_damage: counters.damage_dealt / battles,
    }
}

/// Progress between a fresh snapshot and the previously stored one.
///
/// Returns `None` when the stored record has no usable counters (wins and
/// battles are persisted as a pair) or when no battles were played since
/// it was taken. A suppressed delta is distinct from a present-but-zero
/// one: the caller renders no delta narrative at all.
///
/// Metrics come from the raw counter differences; subtracting two already
/// rounded percentages would drift from the expected output.
pub fn delta(current: &BattleCounters, prior: &AccountRecord) -> Option<DeltaStats> {
    let (prior_wins, prior_battles) = match (prior.wins, prior.battles) {
        (Some(wins), Some(battles)) => (wins, battles),
        _ => return None,
    };
    if current.battles <= prior_battles {
        return None;
    }

    let battles = current.battles - prior_battles;
    let wins = current.wins.saturating_sub(prior_wins);
    let avg_damage = prior
        .damage
        .map(|prior_damage| (current.damage_dealt - prior_damage) / battles as f64);

    Some(DeltaStats {
        battles,
        wins,
        win_rate_pct: wins as f64 / battles as f64 * 100.0,
        avg_damage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(wins: Option<u64>, battles: Option<u64>, damage: Option<f64>) -> AccountRecord {
        AccountRecord {
            user_id: "user".to_string(),
            account_id: 100994565,
            wins,
            battles,
            damage,
        }
    }

    #[test]
    fn derive_zero_battles_is_zero_not_nan() {
        let stats = derive(&BattleCounters::default());
        assert_eq!(stats.win_rate_pct, 0.0);
        assert_eq!(stats.avg_damage, 0.0);
    }

    #[test]
    fn derive_computes_percentage_and_average() {
        let stats = derive(&BattleCounters {
            battles: 283,
            wins: 159,
            damage_dealt: 28300.0,
        });
        assert_relative_eq!(stats.win_rate_pct, 56.18374, epsilon = 1e-4);
        assert_relative_eq!(stats.avg_damage, 100.0);
    }

    #[test]
    fn delta_requires_stored_counters() {
        let current = BattleCounters {
            battles: 13933,
            wins: 9260,
            damage_dealt: 13933000.0,
        };
        assert_eq!(delta(&current, &record(None, None, None)), None);
        // Wins and battles are written as a pair; a record with only one
        // of them is not usable as a prior snapshot.
        assert_eq!(delta(&current, &record(None, Some(13932), None)), None);
    }

    #[test]
    fn delta_suppressed_without_new_battles() {
        let current = BattleCounters {
            battles: 18290,
            wins: 7682,
            damage_dealt: 18290000.0,
        };
        assert_eq!(
            delta(&current, &record(Some(7682), Some(18290), None)),
            None
        );
        // A stored count ahead of the fresh one also yields no narrative.
        assert_eq!(
            delta(&current, &record(Some(7682), Some(18291), None)),
            None
        );
    }

    #[test]
    fn delta_over_one_battle() {
        let current = BattleCounters {
            battles: 13933,
            wins: 9260,
            damage_dealt: 13933000.0,
        };
        let d = delta(&current, &record(Some(9259), Some(13932), Some(13931164.0))).unwrap();
        assert_eq!(d.battles, 1);
        assert_eq!(d.wins, 1);
        assert_relative_eq!(d.win_rate_pct, 100.0);
        assert_relative_eq!(d.avg_damage.unwrap(), 1836.0);
    }

    #[test]
    fn delta_over_several_battles() {
        let current = BattleCounters {
            battles: 11502,
            wins: 5003,
            damage_dealt: 9836625.0,
        };
        let d = delta(&current, &record(Some(4992), Some(11483), Some(9822276.0))).unwrap();
        assert_eq!(d.battles, 19);
        assert_eq!(d.wins, 11);
        assert_relative_eq!(d.win_rate_pct, 57.894736, epsilon = 1e-4);
        assert_relative_eq!(d.avg_damage.unwrap(), 755.2105, epsilon = 1e-4);
    }

    #[test]
    fn delta_damage_component_absent_on_old_records() {
        let current = BattleCounters {
            battles: 11501,
            wins: 5000,
            damage_dealt: 11501000.0,
        };
        let d = delta(&current, &record(Some(4992), Some(11483), None)).unwrap();
        assert_eq!(d.battles, 18);
        assert_eq!(d.wins, 8);
        assert_relative_eq!(d.win_rate_pct, 44.4444, epsilon = 1e-4);
        assert_eq!(d.avg_damage, None);
    }
}
