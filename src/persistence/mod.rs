//! Score persistence
//!
//! Local best score in key/value storage plus an optional remote leaderboard.
//! Failures are logged and swallowed; local and remote degrade independently.

pub mod error;
pub mod remote;

pub use error::PersistenceError;
pub use remote::{LeaderboardClient, LeaderboardRow, RemoteConfig};

use crate::leaderboard::LeaderboardEntry;
use crate::platform::KeyValueStore;

/// Storage key for the local best score
pub const HIGH_SCORE_KEY: &str = "highScore";

/// Persistence collaborator used by the host
pub struct ScorePersistence<S: KeyValueStore> {
    store: S,
    remote: Option<LeaderboardClient>,
}

impl<S: KeyValueStore> ScorePersistence<S> {
    pub fn new(store: S, remote: Option<LeaderboardClient>) -> Self {
        if remote.is_none() {
            log::info!("Remote leaderboard not configured, scores stay local");
        }
        Self { store, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn read_high_score(&self) -> Result<u64, PersistenceError> {
        let Some(value) = self.store.get(HIGH_SCORE_KEY)? else {
            return Ok(0);
        };
        value
            .trim()
            .parse()
            .map_err(|_| PersistenceError::InvalidValue {
                key: HIGH_SCORE_KEY.to_string(),
                value,
            })
    }

    /// Stored best score, 0 when absent or unreadable
    pub fn load_high_score(&self) -> u64 {
        match self.read_high_score() {
            Ok(score) => score,
            Err(e) => {
                log::warn!("Failed to load high score: {}", e);
                0
            }
        }
    }

    fn write_high_score(&self, score: u64) -> Result<(), PersistenceError> {
        // Never lower the stored best
        let best = self.read_high_score().unwrap_or(0).max(score);
        self.store.set(HIGH_SCORE_KEY, &best.to_string())
    }

    /// Persist a score locally and, given a player name, remotely.
    ///
    /// Returns immediately; the remote write runs in the background.
    pub fn save_high_score(&self, score: u64, player_name: Option<&str>) {
        match self.write_high_score(score) {
            Ok(()) => log::info!("High score saved ({})", score),
            Err(e) => log::error!("Failed to save high score: {}", e),
        }

        let Some(name) = player_name.map(str::trim).filter(|n| !n.is_empty()) else {
            return;
        };
        let Some(client) = &self.remote else {
            log::debug!("No remote leaderboard, skipping submit for {}", name);
            return;
        };

        let row = LeaderboardRow {
            player_name: name.to_string(),
            score,
            timestamp: now_iso(),
        };
        submit_in_background(client.clone(), row);
    }

    /// Highest `limit` scores, empty on any failure
    pub async fn fetch_top_scores(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let Some(client) = &self.remote else {
            return Vec::new();
        };
        match fetch_remote(client, limit).await {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Failed to fetch leaderboard: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn now_iso() -> Option<String> {
    Some(String::from(js_sys::Date::new_0().to_iso_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn now_iso() -> Option<String> {
    None
}

#[cfg(target_arch = "wasm32")]
fn submit_in_background(client: LeaderboardClient, row: LeaderboardRow) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = client.submit(&row).await {
            log::error!("Failed to save score to leaderboard: {}", e);
        }
    });
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
fn submit_in_background(_client: LeaderboardClient, row: LeaderboardRow) {
    log::debug!("Remote submit unavailable natively ({} for {})", row.score, row.player_name);
}

#[cfg(target_arch = "wasm32")]
async fn fetch_remote(
    client: &LeaderboardClient,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
    client.top_scores(limit).await
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
async fn fetch_remote(
    _client: &LeaderboardClient,
    _limit: usize,
) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    /// Storage that refuses every call
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::StorageUnavailable)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::StorageUnavailable)
        }
    }

    #[test]
    fn test_missing_high_score_is_zero() {
        let scores = ScorePersistence::new(MemoryStore::new(), None);
        assert_eq!(scores.load_high_score(), 0);
    }

    #[test]
    fn test_unparsable_high_score_is_zero() {
        let store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        let scores = ScorePersistence::new(store, None);
        assert_eq!(scores.load_high_score(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let scores = ScorePersistence::new(MemoryStore::new(), None);
        scores.save_high_score(1003, None);
        assert_eq!(scores.load_high_score(), 1003);
    }

    #[test]
    fn test_save_never_lowers_best() {
        let scores = ScorePersistence::new(MemoryStore::new(), None);
        scores.save_high_score(5000, None);
        scores.save_high_score(12, Some("ana"));
        assert_eq!(scores.load_high_score(), 5000);
    }

    #[test]
    fn test_broken_storage_degrades() {
        let scores = ScorePersistence::new(BrokenStore, None);
        scores.save_high_score(99, Some("ana"));
        assert_eq!(scores.load_high_score(), 0);
    }

    #[test]
    fn test_remote_save_keeps_local() {
        let client = LeaderboardClient::new(RemoteConfig::new("https://demo.supabase.co", "k"));
        let scores = ScorePersistence::new(MemoryStore::new(), Some(client));
        assert!(scores.has_remote());
        scores.save_high_score(640, Some("  ana  "));
        assert_eq!(scores.load_high_score(), 640);
    }

    #[test]
    fn test_fetch_without_remote_is_empty() {
        let scores = ScorePersistence::new(MemoryStore::new(), None);
        let entries = futures::executor::block_on(scores.fetch_top_scores(10));
        assert!(entries.is_empty());
    }
}
