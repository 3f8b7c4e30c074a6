// Draft session orchestration.
//
// The central event loop that coordinates consumer commands, the
// one-second nomination countdown, and poll-driven history refreshes
// from the league backend. All derived views (budgets, position counts,
// nomination turn) are recomputed from the fetched pick history; the
// session never appends a pick locally.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::api::{DraftApi, PickRequest};
use crate::draft::catalog::{PlayerCatalog, PositionFilter};
use crate::draft::ledger::{BudgetSnapshot, LeagueRules};
use crate::draft::pick::{DraftPick, Owner, Player};
use crate::draft::schedule::current_nominator;
use crate::draft::validate::{validate, ApprovedSale, Candidate, RejectReason};
use crate::protocol::{BoardSnapshot, OwnerBoard, SessionCommand, SessionEvent};
use crate::timer::{CountdownTimer, Tick};

// ---------------------------------------------------------------------------
// DraftSession
// ---------------------------------------------------------------------------

/// The state of one live auction draft session.
///
/// Holds the candidate sale being assembled, the nomination countdown,
/// and the most recently fetched pick history with a revision counter so
/// derived views are only rebuilt when the history actually changed.
pub struct DraftSession {
    rules: LeagueRules,
    session_id: String,
    owners: Vec<Owner>,
    catalog: PlayerCatalog,
    history: Vec<DraftPick>,
    /// Player ids present in `history`, for O(1) drafted checks.
    drafted: HashSet<u32>,
    /// Bumped each time `apply_history` observes a change.
    revision: u64,
    candidate: Candidate,
    pos_filter: PositionFilter,
    timer: CountdownTimer,
}

impl DraftSession {
    /// Create a session over a fetched owner list and player catalog.
    pub fn new(
        rules: LeagueRules,
        session_id: impl Into<String>,
        timer_seconds: u32,
        owners: Vec<Owner>,
        players: Vec<Player>,
    ) -> Self {
        let candidate = Candidate::new(rules.min_bid);
        DraftSession {
            rules,
            session_id: session_id.into(),
            owners,
            catalog: PlayerCatalog::new(players),
            history: Vec::new(),
            drafted: HashSet::new(),
            revision: 0,
            candidate,
            pos_filter: PositionFilter::All,
            timer: CountdownTimer::new(timer_seconds),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    pub fn history(&self) -> &[DraftPick] {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    /// Replace the polled history if it differs from what we hold.
    ///
    /// Returns `true` when the session state changed (revision bumped,
    /// drafted set rebuilt) so callers can skip recomputing derived
    /// views on identical polls.
    pub fn apply_history(&mut self, picks: Vec<DraftPick>) -> bool {
        let unchanged = picks.len() == self.history.len()
            && picks
                .iter()
                .zip(self.history.iter())
                .all(|(a, b)| a.id == b.id);
        if unchanged {
            return false;
        }
        self.drafted = picks.iter().map(|p| p.player_id).collect();
        self.history = picks;
        self.revision += 1;
        true
    }

    /// Update the player search query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.candidate.player_query = query.into();
    }

    /// Adopt a suggestion as the query (the usual flow after a search).
    pub fn select_suggestion(&mut self, player_name: &str) {
        self.candidate.player_query = player_name.to_string();
    }

    pub fn set_winner(&mut self, owner_id: u32) {
        self.candidate.winner_id = Some(owner_id);
    }

    pub fn set_bid(&mut self, amount: u32) {
        self.candidate.bid_amount = amount;
    }

    /// Adjust the bid by a delta, clamped at the league minimum.
    pub fn nudge_bid(&mut self, delta: i32) {
        let nudged = self.candidate.bid_amount as i64 + delta as i64;
        self.candidate.bid_amount = nudged.max(self.rules.min_bid as i64) as u32;
    }

    pub fn set_pos_filter(&mut self, filter: PositionFilter) {
        self.pos_filter = filter;
    }

    /// Current suggestion list for the query: undrafted players matching
    /// the query substring and the active position filter.
    pub fn suggestions(&self) -> Vec<Player> {
        self.catalog
            .suggestions(&self.candidate.player_query, &self.drafted, self.pos_filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Validate the current candidate against the latest fetched history.
    pub fn validate_candidate(&self) -> Result<ApprovedSale, RejectReason> {
        validate(&self.candidate, &self.catalog, &self.history, &self.rules)
    }

    /// Clear the candidate after a committed sale: query and bid reset,
    /// winner selection kept so consecutive wins by one owner don't need
    /// re-selection.
    pub fn clear_candidate(&mut self) {
        self.candidate.player_query.clear();
        self.candidate.bid_amount = self.rules.min_bid;
    }

    /// Owner whose turn it is to nominate.
    pub fn nominator(&self) -> Option<&Owner> {
        current_nominator(&self.owners, self.history.len())
    }

    /// Capture every derived view into one snapshot.
    pub fn board_snapshot(&self) -> BoardSnapshot {
        let owners = self
            .owners
            .iter()
            .map(|owner| OwnerBoard {
                owner: owner.clone(),
                budget: BudgetSnapshot::compute(
                    owner.id,
                    &self.history,
                    &self.catalog,
                    &self.rules,
                ),
                picks: self
                    .history
                    .iter()
                    .filter(|p| p.owner_id == owner.id)
                    .cloned()
                    .collect(),
            })
            .collect();

        BoardSnapshot {
            session_id: self.session_id.clone(),
            pick_count: self.history.len(),
            revision: self.revision,
            nominator_id: self.nominator().map(|o| o.id),
            owners,
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the session event loop.
///
/// Listens on the command channel and two interval arms via
/// `tokio::select!`:
/// 1. consumer commands (search, bid, sold, timer control, ...)
/// 2. the one-second countdown tick, armed only while the timer runs
/// 3. the backend history poll
///
/// Dropping the command sender (or sending `Quit`) ends the loop, which
/// also cancels any pending countdown tick.
pub async fn run(
    api: Arc<dyn DraftApi>,
    mut session: DraftSession,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
    poll_interval: Duration,
) -> anyhow::Result<()> {
    info!(session_id = %session.session_id, "draft session started");

    let mut countdown = tokio::time::interval(Duration::from_secs(1));
    countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut poll = tokio::time::interval(poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Push the initial (empty-history) board so the consumer can render
    // before the first poll completes.
    let _ = event_tx
        .send(SessionEvent::Board(session.board_snapshot()))
        .await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Quit) => {
                        info!("quit command received, shutting down session");
                        break;
                    }
                    Some(cmd) => {
                        handle_command(&api, &mut session, cmd, &event_tx, &mut countdown).await;
                    }
                    None => {
                        info!("command channel closed, shutting down session");
                        break;
                    }
                }
            }

            // --- Nomination countdown (armed only while running) ---
            _ = countdown.tick(), if session.timer.is_running() => {
                match session.timer.tick() {
                    Tick::Running(secs) => {
                        let _ = event_tx
                            .send(SessionEvent::TimerTick { time_left: secs, running: true })
                            .await;
                    }
                    Tick::Expired => {
                        info!("nomination timer expired, attempting auto-sale");
                        let _ = event_tx
                            .send(SessionEvent::TimerTick { time_left: 0, running: false })
                            .await;
                        attempt_sale(&api, &mut session, &event_tx).await;
                    }
                    Tick::Idle => {}
                }
            }

            // --- History poll ---
            _ = poll.tick() => {
                refresh(&api, &mut session, &event_tx).await;
            }
        }
    }

    info!("draft session exiting");
    Ok(())
}

/// Handle a single consumer command.
async fn handle_command(
    api: &Arc<dyn DraftApi>,
    session: &mut DraftSession,
    cmd: SessionCommand,
    event_tx: &mpsc::Sender<SessionEvent>,
    countdown: &mut Interval,
) {
    match cmd {
        SessionCommand::Search(query) => {
            session.set_query(query);
            let _ = event_tx
                .send(SessionEvent::Suggestions(session.suggestions()))
                .await;
        }
        SessionCommand::SelectSuggestion(name) => {
            session.select_suggestion(&name);
            // Selection closes the suggestion list.
            let _ = event_tx.send(SessionEvent::Suggestions(Vec::new())).await;
        }
        SessionCommand::SetWinner(owner_id) => session.set_winner(owner_id),
        SessionCommand::SetBid(amount) => session.set_bid(amount),
        SessionCommand::NudgeBid(delta) => session.nudge_bid(delta),
        SessionCommand::SetPosFilter(filter) => {
            session.set_pos_filter(filter);
            let _ = event_tx
                .send(SessionEvent::Suggestions(session.suggestions()))
                .await;
        }
        SessionCommand::Sold => {
            attempt_sale(api, session, event_tx).await;
        }
        SessionCommand::StartTimer => {
            session.timer.start();
            // Restart the interval so the first decrement lands a full
            // second after the start, not on a stale scheduled tick.
            countdown.reset();
            let _ = event_tx
                .send(SessionEvent::TimerTick {
                    time_left: session.timer.time_left(),
                    running: true,
                })
                .await;
        }
        SessionCommand::ResetTimer => {
            session.timer.reset();
            let _ = event_tx
                .send(SessionEvent::TimerTick {
                    time_left: session.timer.time_left(),
                    running: false,
                })
                .await;
        }
        SessionCommand::Refresh => {
            refresh(api, session, event_tx).await;
        }
        SessionCommand::Finalize => {
            match api.finalize_draft().await {
                Ok(outcome) => {
                    info!(?outcome, "finalize request completed");
                    let _ = event_tx.send(SessionEvent::FinalizeResult(outcome)).await;
                }
                Err(e) => {
                    warn!("finalize request failed: {e}");
                    let _ = event_tx
                        .send(SessionEvent::FinalizeResult(
                            crate::api::FinalizeOutcome::Blocked(vec![e.to_string()]),
                        ))
                        .await;
                }
            }
        }
        // Quit is handled by the loop itself.
        SessionCommand::Quit => {}
    }
}

/// Attempt to commit the current candidate, manually ("SOLD") or from
/// timer expiry.
///
/// On acceptance the commit is requested from the backend and the
/// history re-fetched (no optimistic local append). Any rejection,
/// local or backend-side, resets the timer, keeps the candidate for
/// editing, and surfaces the reason.
async fn attempt_sale(
    api: &Arc<dyn DraftApi>,
    session: &mut DraftSession,
    event_tx: &mpsc::Sender<SessionEvent>,
) {
    let approved = match session.validate_candidate() {
        Ok(sale) => sale,
        Err(reason) => {
            warn!(%reason, "sale rejected");
            reject(session, event_tx, reason).await;
            return;
        }
    };

    let request = PickRequest {
        session_id: session.session_id.clone(),
        owner_id: approved.owner_id,
        player_id: approved.player_id,
        amount: approved.amount,
    };

    match api.commit_pick(&request).await {
        Ok(pick) => {
            info!(
                owner_id = pick.owner_id,
                player_id = pick.player_id,
                amount = pick.amount,
                "pick committed"
            );
            session.clear_candidate();
            session.timer.reset();
            let _ = event_tx.send(SessionEvent::SaleCommitted(pick)).await;
            let _ = event_tx
                .send(SessionEvent::TimerTick {
                    time_left: session.timer.time_left(),
                    running: false,
                })
                .await;
            // The backend stays the source of truth: pull the history it
            // now holds rather than appending locally.
            refresh(api, session, event_tx).await;
        }
        Err(e) => {
            warn!("commit failed: {e}");
            reject(session, event_tx, RejectReason::CommitFailed(e.to_string())).await;
        }
    }
}

/// Shared rejection path: stop the countdown so the board doesn't keep
/// counting toward a bad auto-sale, keep the candidate, surface the
/// reason.
async fn reject(
    session: &mut DraftSession,
    event_tx: &mpsc::Sender<SessionEvent>,
    reason: RejectReason,
) {
    session.timer.reset();
    let _ = event_tx
        .send(SessionEvent::TimerTick {
            time_left: session.timer.time_left(),
            running: false,
        })
        .await;
    let _ = event_tx.send(SessionEvent::SaleRejected(reason)).await;
}

/// Re-fetch the pick history and push a fresh board if it changed.
async fn refresh(
    api: &Arc<dyn DraftApi>,
    session: &mut DraftSession,
    event_tx: &mpsc::Sender<SessionEvent>,
) {
    match api.fetch_history(&session.session_id).await {
        Ok(picks) => {
            if session.apply_history(picks) {
                let _ = event_tx
                    .send(SessionEvent::Board(session.board_snapshot()))
                    .await;
            }
        }
        Err(e) => {
            // A failed poll is not fatal; the next interval retries.
            warn!("history fetch failed: {e}");
        }
    }
}
