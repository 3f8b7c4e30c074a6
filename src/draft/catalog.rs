// Player catalog with indexed lookup and nomination search.

use std::collections::{HashMap, HashSet};

use super::pick::{Player, Position};

/// Maximum number of suggestions returned by a nomination search.
pub const MAX_SUGGESTIONS: usize = 8;

/// Position filter applied to nomination search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    All,
    Only(Position),
}

impl PositionFilter {
    /// Whether a raw catalog position string passes this filter.
    /// Raw strings are normalized (legacy "TD" counts as DEF) before
    /// comparison; unnormalizable positions only pass `All`.
    pub fn matches(&self, raw_position: &str) -> bool {
        match self {
            PositionFilter::All => true,
            PositionFilter::Only(pos) => Position::from_raw(raw_position) == Some(*pos),
        }
    }
}

/// The league player catalog, indexed for the lookups the auction loop
/// performs on every keystroke and every sale attempt.
///
/// The name index is built once per catalog fetch (lowercased name ->
/// player), replacing the linear case-insensitive scan the draft board
/// would otherwise do. When two catalog rows share a name the first one
/// wins, matching first-match scan semantics.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<Player>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl PlayerCatalog {
    /// Build a catalog from a fetched player list.
    pub fn new(players: Vec<Player>) -> Self {
        let mut by_id = HashMap::with_capacity(players.len());
        let mut by_name = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            by_id.entry(player.id).or_insert(idx);
            by_name.entry(player.name.to_lowercase()).or_insert(idx);
        }
        PlayerCatalog {
            players,
            by_id,
            by_name,
        }
    }

    /// Look up a player by id.
    pub fn get(&self, id: u32) -> Option<&Player> {
        self.by_id.get(&id).map(|&idx| &self.players[idx])
    }

    /// Look up a player by exact, case-insensitive name match.
    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.players[idx])
    }

    /// Number of players in the catalog.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All players, in catalog order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Nomination search: case-insensitive substring match on player name.
    ///
    /// Already-drafted players are excluded, the active position filter is
    /// applied (normalized), and the result list is capped at
    /// [`MAX_SUGGESTIONS`]. Queries of one character or less return
    /// nothing, matching the draft board's search box behavior.
    pub fn suggestions(
        &self,
        query: &str,
        drafted: &HashSet<u32>,
        filter: PositionFilter,
    ) -> Vec<&Player> {
        if query.chars().count() <= 1 {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .filter(|p| !drafted.contains(&p.id))
            .filter(|p| filter.matches(&p.position))
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}
