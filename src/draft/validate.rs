// Sale validation: the checks a candidate transaction must pass before
// a commit is requested from the backend.

use thiserror::Error;

use super::catalog::PlayerCatalog;
use super::ledger::{BudgetSnapshot, LeagueRules};
use super::pick::DraftPick;

/// Why a candidate sale was rejected.
///
/// Every variant is recoverable: the session continues, the timer is
/// reset, and the candidate is retained for editing. `CommitFailed`
/// covers the backend refusing (or being unreachable for) a commit and
/// is handled identically to a local rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no winning owner selected")]
    NoWinnerSelected,

    #[error("player not found: {0:?}")]
    PlayerNotFound(String),

    #[error("player already drafted")]
    AlreadyDrafted,

    #[error("winning owner's roster is full")]
    RosterFull,

    #[error("bid outside legal range (min bid {min_bid}, max bid {max_bid})")]
    OverBudget { min_bid: u32, max_bid: u32 },

    #[error("commit rejected by backend: {0}")]
    CommitFailed(String),
}

/// The candidate transaction being assembled on the auction block.
///
/// Ephemeral and in-memory only; nothing is persisted until the
/// validator accepts it and the backend commits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Free-text player search entry; resolved by exact
    /// case-insensitive name match at validation time.
    pub player_query: String,
    /// The owner who will win the player, if one has been selected.
    pub winner_id: Option<u32>,
    pub bid_amount: u32,
}

impl Candidate {
    /// A fresh candidate with the bid preset to the league minimum.
    pub fn new(min_bid: u32) -> Self {
        Candidate {
            player_query: String::new(),
            winner_id: None,
            bid_amount: min_bid,
        }
    }
}

/// A validated sale, ready to be committed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedSale {
    pub owner_id: u32,
    pub player_id: u32,
    pub amount: u32,
}

/// Validate a candidate sale against the current history.
///
/// Checks run in a fixed order and the first failure determines the
/// rejection reason:
/// 1. a winning owner is selected
/// 2. the player query resolves in the catalog
/// 3. the player has not already been drafted this session
/// 4. the winner still has an open roster slot
/// 5. the bid is within `[min_bid, max_bid]` for the winner
///
/// Acceptance only means a commit may be *requested*; the backend is
/// the system of record and may still refuse (e.g. a concurrent
/// duplicate), which callers treat as [`RejectReason::CommitFailed`].
pub fn validate(
    candidate: &Candidate,
    catalog: &PlayerCatalog,
    history: &[DraftPick],
    rules: &LeagueRules,
) -> Result<ApprovedSale, RejectReason> {
    let Some(winner_id) = candidate.winner_id else {
        return Err(RejectReason::NoWinnerSelected);
    };

    let Some(player) = catalog.find_by_name(&candidate.player_query) else {
        return Err(RejectReason::PlayerNotFound(candidate.player_query.clone()));
    };

    if history.iter().any(|p| p.player_id == player.id) {
        return Err(RejectReason::AlreadyDrafted);
    }

    let snapshot = BudgetSnapshot::compute(winner_id, history, catalog, rules);
    if snapshot.empty_slots == 0 {
        return Err(RejectReason::RosterFull);
    }

    if candidate.bid_amount < rules.min_bid || candidate.bid_amount > snapshot.max_bid {
        return Err(RejectReason::OverBudget {
            min_bid: rules.min_bid,
            max_bid: snapshot.max_bid,
        });
    }

    Ok(ApprovedSale {
        owner_id: winner_id,
        player_id: player.id,
        amount: candidate.bid_amount,
    })
}
