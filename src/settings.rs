//! Game settings and preferences
//!
//! Persisted separately from the high score in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, RemoteConfig};
use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Visual Effects ===
    /// Particle bursts on hits
    pub particles: bool,
    /// Feedback popups
    pub popups: bool,

    // === Accessibility ===
    /// Reduced motion (no particle bursts, static popups)
    pub reduced_motion: bool,

    // === Leaderboard ===
    /// Last name submitted, pre-filled on the game-over screen
    pub player_name: String,
    /// Remote leaderboard; local-only when absent
    pub leaderboard: Option<RemoteConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            particles: true,
            popups: true,

            reduced_motion: false,

            player_name: String::new(),
            leaderboard: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "rhythm_tap_settings";

    /// Effective particle bursts (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Effective sound volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    fn read(store: &impl KeyValueStore) -> Result<Option<Self>, PersistenceError> {
        match store.get(Self::STORAGE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        match Self::read(store) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &impl KeyValueStore) {
        let result = serde_json::to_string(self)
            .map_err(PersistenceError::from)
            .and_then(|json| store.set(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_round_trip_through_store() {
        let store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.player_name = "ana".to_string();
        settings.leaderboard = Some(RemoteConfig::new("https://x.supabase.co", "k"));
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, r#"{"muted":true}"#).unwrap();
        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 0.8);
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_reduced_motion_disables_particles() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_particles());
    }
}
