// Core value types: positions, players, owners, and completed picks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical fantasy positions, in display order.
pub const POSITIONS: [Position; 6] = [
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
    Position::Kicker,
    Position::Defense,
];

/// Football positions used for roster accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Defense,
}

impl Position {
    /// Parse a raw catalog position string into a Position enum.
    ///
    /// The NFL import data carries a legacy "TD" code for team defenses;
    /// it is treated as "DEF". Unknown strings return None and are
    /// excluded from position accounting.
    pub fn from_raw(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" => Some(Position::Kicker),
            "DEF" | "TD" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DEF",
        }
    }

    /// Deterministic ordering index for board display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Quarterback => 0,
            Position::RunningBack => 1,
            Position::WideReceiver => 2,
            Position::TightEnd => 3,
            Position::Kicker => 4,
            Position::Defense => 5,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A player in the league catalog.
///
/// `position` is kept as the raw catalog string (which may be the legacy
/// "TD" code); normalization happens at accounting time via
/// [`Position::from_raw`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub nfl_team: String,
}

/// A league participant who drafts and manages a roster.
///
/// Nomination order is defined by `id` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: u32,
    pub username: String,
}

/// A completed, committed auction sale.
///
/// Picks are append-only: once created they are never mutated or deleted
/// by the engine. The ordered pick sequence for a session is the sole
/// source of truth for budgets, rosters, and nomination turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPick {
    pub id: u64,
    pub session_id: String,
    pub owner_id: u32,
    pub player_id: u32,
    /// Winning bid amount, always >= the league minimum bid.
    pub amount: u32,
    pub timestamp: DateTime<Utc>,
}
