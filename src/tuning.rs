//! Data-driven game balance
//!
//! Every number that shapes scoring lives here so a JSON file can override it
//! without touching the engine.

use serde::{Deserialize, Serialize};

use crate::persistence::PersistenceError;
use crate::platform::KeyValueStore;

/// Balance constants for the timing engine and its presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Judgement windows (deviation %, inclusive upper bound) ===
    pub perfect_pct: f64,
    pub amazing_pct: f64,
    pub good_pct: f64,

    // === Points ===
    pub perfect_points: u64,
    pub amazing_points: u64,
    pub good_points: u64,

    /// Activations before this fraction of the target are forgiven, not fatal
    pub early_fraction: f64,

    // === Presentation ===
    /// How long a feedback popup stays on screen (ms)
    pub feedback_duration_ms: f64,
    /// Particles spawned per burst
    pub burst_particles: usize,
    /// Particle lifetime (ms)
    pub particle_lifetime_ms: f64,

    // === Input ===
    /// Emulated mouse events arriving this soon after a touch are dropped (ms)
    pub coalesce_window_ms: f64,

    /// Rows shown on the leaderboard
    pub leaderboard_limit: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            perfect_pct: 5.0,
            amazing_pct: 10.0,
            good_pct: 20.0,

            perfect_points: 1000,
            amazing_points: 500,
            good_points: 100,

            early_fraction: 0.5,

            feedback_duration_ms: 1000.0,
            burst_particles: 8,
            particle_lifetime_ms: 1000.0,

            coalesce_window_ms: 500.0,

            leaderboard_limit: 10,
        }
    }
}

impl Tuning {
    pub const STORAGE_KEY: &'static str = "rhythm_tap_tuning";

    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        if !tuning.windows_ordered() {
            log::warn!(
                "Judgement windows out of order ({} / {} / {}), first match still wins",
                tuning.perfect_pct,
                tuning.amazing_pct,
                tuning.good_pct
            );
        }
        Ok(tuning)
    }

    /// Load overrides from storage, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        let result = store.get(Self::STORAGE_KEY).and_then(|json| {
            json.map(|j| Self::from_json(&j))
                .transpose()
                .map_err(PersistenceError::from)
        });
        match result {
            Ok(Some(tuning)) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Failed to load tuning, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Windows must widen from perfect to good for every judgement to be reachable
    pub fn windows_ordered(&self) -> bool {
        self.perfect_pct <= self.amazing_pct && self.amazing_pct <= self.good_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults() {
        let t = Tuning::default();
        assert_eq!(t.perfect_pct, 5.0);
        assert_eq!(t.early_fraction, 0.5);
        assert_eq!(t.feedback_duration_ms, 1000.0);
        assert!(t.windows_ordered());
    }

    #[test]
    fn test_partial_override() {
        let t = Tuning::from_json(r#"{ "perfect_pct": 3.0, "good_points": 150 }"#).unwrap();
        assert_eq!(t.perfect_pct, 3.0);
        assert_eq!(t.good_points, 150);
        assert_eq!(t.amazing_pct, 10.0);
        assert_eq!(t.burst_particles, 8);
    }

    #[test]
    fn test_bad_json() {
        assert!(Tuning::from_json("{ perfect_pct: ").is_err());
    }

    #[test]
    fn test_load_from_store() {
        let store = MemoryStore::new();
        assert_eq!(Tuning::load(&store), Tuning::default());

        store
            .set(Tuning::STORAGE_KEY, r#"{ "good_pct": 25.0 }"#)
            .unwrap();
        let t = Tuning::load(&store);
        assert_eq!(t.good_pct, 25.0);
        assert_eq!(t.perfect_pct, 5.0);

        store.set(Tuning::STORAGE_KEY, "not json").unwrap();
        assert_eq!(Tuning::load(&store), Tuning::default());
    }

    #[test]
    fn test_unordered_windows() {
        let t = Tuning::from_json(r#"{ "perfect_pct": 15.0 }"#).unwrap();
        assert!(!t.windows_ordered());
    }
}
