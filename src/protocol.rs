// Typed channel vocabulary between the session orchestrator and its
// consumer (a UI layer, or the headless binary's logger).

use crate::api::FinalizeOutcome;
use crate::draft::catalog::PositionFilter;
use crate::draft::ledger::BudgetSnapshot;
use crate::draft::pick::{DraftPick, Owner, Player};
use crate::draft::validate::RejectReason;

/// Commands a consumer sends into the session event loop.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Update the player search query; the loop answers with
    /// [`SessionEvent::Suggestions`].
    Search(String),
    /// Pick a suggestion: replaces the query with the player's full name
    /// and clears the suggestion list.
    SelectSuggestion(String),
    /// Select the owner who will win the current nomination.
    SetWinner(u32),
    /// Set the bid to an absolute amount.
    SetBid(u32),
    /// Adjust the bid by a delta, clamped at the league minimum.
    NudgeBid(i32),
    SetPosFilter(PositionFilter),
    /// Attempt to commit the current candidate ("SOLD").
    Sold,
    StartTimer,
    ResetTimer,
    /// Force a history re-fetch from the backend.
    Refresh,
    /// Ask the backend to finalize the draft and lock rosters.
    Finalize,
    Quit,
}

/// Events the session event loop emits back to its consumer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The derived board changed (new history revision).
    Board(BoardSnapshot),
    Suggestions(Vec<Player>),
    TimerTick { time_left: u32, running: bool },
    SaleCommitted(DraftPick),
    /// A sale attempt was rejected, locally or by the backend. The
    /// candidate is retained for editing and the timer has been reset.
    SaleRejected(RejectReason),
    FinalizeResult(FinalizeOutcome),
}

/// One owner's column on the draft board.
#[derive(Debug, Clone)]
pub struct OwnerBoard {
    pub owner: Owner,
    pub budget: BudgetSnapshot,
    pub picks: Vec<DraftPick>,
}

/// Everything derived from the current pick history, captured in one
/// snapshot the consumer can apply atomically.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub session_id: String,
    /// Number of completed picks.
    pub pick_count: usize,
    /// Monotonic counter bumped on every observed history change.
    pub revision: u64,
    /// Owner whose turn it is to nominate, if the league has owners.
    pub nominator_id: Option<u32>,
    pub owners: Vec<OwnerBoard>,
}
