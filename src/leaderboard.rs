//! Ranked leaderboard model
//!
//! Rows come from the remote store; this keeps them ordered by score and
//! answers the questions the game-over screen asks.

use serde::{Deserialize, Serialize};

/// Default number of rows shown
pub const MAX_LEADERBOARD_ROWS: usize = 10;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
}

/// Leaderboard, sorted by score descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    limit: usize,
}

impl Leaderboard {
    /// Empty leaderboard with the default row count
    pub fn new() -> Self {
        Self::with_limit(MAX_LEADERBOARD_ROWS)
    }

    /// Empty leaderboard holding up to `limit` rows
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Build from unordered rows (ties keep their incoming order)
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        Self { entries, limit }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < self.limit {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Row belonging to the player who just submitted, if present
    pub fn highlight_index(&self, player_name: &str, score: u64) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.player_name == player_name && e.score == score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new()
    }
}
