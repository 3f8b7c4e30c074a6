// Budget and roster ledger, derived from pick history.
//
// Everything here is a pure function of (owner id, pick history, league
// rules): snapshots are recomputed on every history change and never
// stored, so they cannot drift from the ledger of record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::catalog::PlayerCatalog;
use super::pick::{DraftPick, Position, POSITIONS};

/// Economic and roster constraints for a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueRules {
    /// Per-owner auction budget.
    pub salary_cap: u32,
    /// Number of roster slots each owner must fill.
    pub roster_size: u32,
    /// Minimum legal bid.
    pub min_bid: u32,
}

impl Default for LeagueRules {
    fn default() -> Self {
        LeagueRules {
            salary_cap: 200,
            roster_size: 14,
            min_bid: 1,
        }
    }
}

/// Derived view of a single owner's budget and roster state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub owner_id: u32,
    /// Total spent across this owner's committed picks.
    pub spent: u32,
    /// Budget left: `salary_cap - spent`.
    pub remaining: u32,
    /// Roster slots still to fill, in `[0, roster_size]`.
    pub empty_slots: u32,
    /// Highest legal bid: `remaining - (empty_slots - 1)` while slots
    /// remain, reserving the minimum dollar for every slot after this
    /// purchase. Zero once the roster is full.
    pub max_bid: u32,
    /// Per-position counts of this owner's picks, seeded at zero for
    /// every canonical position.
    pub position_counts: HashMap<Position, u32>,
}

impl BudgetSnapshot {
    /// Compute the full snapshot for one owner from the pick history.
    ///
    /// Deterministic and side-effect free; safe to call on every tick.
    pub fn compute(
        owner_id: u32,
        history: &[DraftPick],
        catalog: &PlayerCatalog,
        rules: &LeagueRules,
    ) -> Self {
        let owner_picks: Vec<&DraftPick> = history
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .collect();

        let spent: u32 = owner_picks.iter().map(|p| p.amount).sum();
        let remaining = rules.salary_cap.saturating_sub(spent);
        let empty_slots = rules.roster_size.saturating_sub(owner_picks.len() as u32);
        let max_bid = if empty_slots > 0 {
            remaining.saturating_sub(empty_slots - 1)
        } else {
            0
        };

        BudgetSnapshot {
            owner_id,
            spent,
            remaining,
            empty_slots,
            max_bid,
            position_counts: position_counts(owner_id, history, catalog),
        }
    }
}

/// Per-position pick counts for an owner.
///
/// Raw catalog positions are normalized before counting (legacy "TD"
/// counts as DEF). Picks whose player is missing from the catalog are
/// silently skipped: catalog and history are fetched independently and
/// may be transiently out of sync.
pub fn position_counts(
    owner_id: u32,
    history: &[DraftPick],
    catalog: &PlayerCatalog,
) -> HashMap<Position, u32> {
    let mut counts: HashMap<Position, u32> =
        POSITIONS.iter().map(|&pos| (pos, 0)).collect();

    for pick in history.iter().filter(|p| p.owner_id == owner_id) {
        let Some(player) = catalog.get(pick.player_id) else {
            continue;
        };
        if let Some(pos) = Position::from_raw(&player.position) {
            *counts.entry(pos).or_insert(0) += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::Player;
    use chrono::Utc;

    fn pick(id: u64, owner_id: u32, player_id: u32, amount: u32) -> DraftPick {
        DraftPick {
            id,
            session_id: "TEST_2026-08-01".to_string(),
            owner_id,
            player_id,
            amount,
            timestamp: Utc::now(),
        }
    }

    fn player(id: u32, name: &str, pos: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            position: pos.to_string(),
            nfl_team: "KC".to_string(),
        }
    }

    fn rules() -> LeagueRules {
        LeagueRules::default()
    }

    #[test]
    fn empty_history_full_budget() {
        let catalog = PlayerCatalog::new(vec![]);
        let snap = BudgetSnapshot::compute(1, &[], &catalog, &rules());
        assert_eq!(snap.spent, 0);
        assert_eq!(snap.remaining, 200);
        assert_eq!(snap.empty_slots, 14);
        // 14 empty slots: reserve $1 for each of the 13 later slots.
        assert_eq!(snap.max_bid, 187);
    }

    #[test]
    fn spent_plus_remaining_equals_cap() {
        let catalog = PlayerCatalog::new(vec![]);
        let history = vec![pick(1, 1, 10, 45), pick(2, 1, 11, 30), pick(3, 2, 12, 60)];
        for owner_id in [1, 2, 3] {
            let snap = BudgetSnapshot::compute(owner_id, &history, &catalog, &rules());
            assert_eq!(snap.spent + snap.remaining, 200);
        }
    }

    #[test]
    fn one_slot_left_full_remaining_biddable() {
        // 13 picks totaling $180: one slot left, no reserve needed.
        let catalog = PlayerCatalog::new(vec![]);
        let mut history: Vec<DraftPick> =
            (0..12).map(|i| pick(i, 1, 100 + i as u32, 14)).collect();
        history.push(pick(12, 1, 200, 12)); // 12*14 + 12 = 180
        let snap = BudgetSnapshot::compute(1, &history, &catalog, &rules());
        assert_eq!(snap.spent, 180);
        assert_eq!(snap.remaining, 20);
        assert_eq!(snap.empty_slots, 1);
        assert_eq!(snap.max_bid, 20);
    }

    #[test]
    fn full_roster_max_bid_zero() {
        let catalog = PlayerCatalog::new(vec![]);
        let history: Vec<DraftPick> =
            (0..14).map(|i| pick(i, 1, 100 + i as u32, 1)).collect();
        let snap = BudgetSnapshot::compute(1, &history, &catalog, &rules());
        assert_eq!(snap.empty_slots, 0);
        // Budget remains but no slots: no more purchases allowed.
        assert_eq!(snap.remaining, 186);
        assert_eq!(snap.max_bid, 0);
    }

    #[test]
    fn max_bid_monotonically_non_increasing() {
        let catalog = PlayerCatalog::new(vec![]);
        let mut history = Vec::new();
        let mut last_max = u32::MAX;
        for i in 0..14 {
            history.push(pick(i, 1, 100 + i as u32, 5));
            let snap = BudgetSnapshot::compute(1, &history, &catalog, &rules());
            assert!(
                snap.max_bid <= last_max,
                "max_bid increased after pick {i}: {} -> {}",
                last_max,
                snap.max_bid
            );
            last_max = snap.max_bid;
        }
    }

    #[test]
    fn recompute_is_idempotent() {
        let catalog = PlayerCatalog::new(vec![player(10, "Josh Allen", "QB")]);
        let history = vec![pick(1, 1, 10, 45)];
        let a = BudgetSnapshot::compute(1, &history, &catalog, &rules());
        let b = BudgetSnapshot::compute(1, &history, &catalog, &rules());
        assert_eq!(a, b);
    }

    #[test]
    fn other_owners_picks_ignored() {
        let catalog = PlayerCatalog::new(vec![]);
        let history = vec![pick(1, 2, 10, 150)];
        let snap = BudgetSnapshot::compute(1, &history, &catalog, &rules());
        assert_eq!(snap.spent, 0);
        assert_eq!(snap.remaining, 200);
    }

    #[test]
    fn position_counts_seeded_at_zero() {
        let catalog = PlayerCatalog::new(vec![]);
        let counts = position_counts(1, &[], &catalog);
        assert_eq!(counts.len(), POSITIONS.len());
        for pos in POSITIONS {
            assert_eq!(counts[&pos], 0);
        }
    }

    #[test]
    fn position_counts_normalizes_legacy_td() {
        let catalog = PlayerCatalog::new(vec![
            player(10, "Steelers D/ST", "TD"),
            player(11, "Bills D/ST", "DEF"),
        ]);
        let history = vec![pick(1, 1, 10, 2), pick(2, 1, 11, 3)];
        let counts = position_counts(1, &history, &catalog);
        assert_eq!(counts[&Position::Defense], 2);
    }

    #[test]
    fn position_counts_skips_unknown_players() {
        // Pick references a player id absent from the catalog: excluded
        // from counts, no panic.
        let catalog = PlayerCatalog::new(vec![player(10, "Josh Allen", "QB")]);
        let history = vec![pick(1, 1, 10, 40), pick(2, 1, 999, 5)];
        let counts = position_counts(1, &history, &catalog);
        assert_eq!(counts[&Position::Quarterback], 1);
        let total: u32 = counts.values().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn position_counts_skips_unparseable_positions() {
        let catalog = PlayerCatalog::new(vec![player(10, "Mystery Man", "P")]);
        let history = vec![pick(1, 1, 10, 5)];
        let counts = position_counts(1, &history, &catalog);
        let total: u32 = counts.values().sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn snapshot_includes_position_counts() {
        let catalog = PlayerCatalog::new(vec![
            player(10, "Josh Allen", "QB"),
            player(11, "Saquon Barkley", "RB"),
        ]);
        let history = vec![pick(1, 1, 10, 45), pick(2, 1, 11, 50)];
        let snap = BudgetSnapshot::compute(1, &history, &catalog, &rules());
        assert_eq!(snap.position_counts[&Position::Quarterback], 1);
        assert_eq!(snap.position_counts[&Position::RunningBack], 1);
        assert_eq!(snap.position_counts[&Position::Kicker], 0);
    }
}
