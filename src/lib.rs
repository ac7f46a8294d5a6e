//! Rhythm Tap - a hypercasual timing game
//!
//! Tap twice to set a rhythm, then keep tapping it. Late taps end the run.
//!
//! Core modules:
//! - `sim`: Deterministic timing engine (state machine, judgement, scoring)
//! - `fx`: Feedback popups and particle bursts
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: High score storage and remote leaderboard
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod fx;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use persistence::ScorePersistence;
pub use settings::Settings;
pub use sim::TimingEngine;
pub use tuning::Tuning;
