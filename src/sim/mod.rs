//! Deterministic timing simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven only by timestamped activations
//! - No clock reads, storage, audio, or DOM access
//! - Side effects leave as `GameEvent`s for the host to route

pub mod engine;
pub mod judge;
pub mod progress;
pub mod state;

pub use engine::{TimingEngine, classification_of, feedback_of, step};
pub use judge::{Classification, classify, deviation_percent};
pub use progress::progress_percent;
pub use state::{Activation, FeedbackEvent, GameEvent, GamePhase, GameState, SoundCue};
