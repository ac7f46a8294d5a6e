//! Game state and core simulation types
//!
//! The engine owns exactly one `GameState`; everything the presentation layer
//! needs to react to leaves the engine as a `GameEvent`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::judge::Classification;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run active, next activation starts one
    #[default]
    Idle,
    /// Run started, the second activation sets the rhythm
    AwaitingSecond,
    /// Player is reproducing the target interval
    Active,
    /// Run ended, activations are ignored until restart
    GameOver,
}

/// One logical press/tap, already de-duplicated by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    /// Monotonic timestamp (ms)
    pub timestamp: f64,
    /// Position relative to the play area
    pub pos: Vec2,
}

impl Activation {
    pub fn new(timestamp: f64, x: f32, y: f32) -> Self {
        Self {
            timestamp,
            pos: Vec2::new(x, y),
        }
    }
}

/// Sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Run start / rhythm set
    Start,
    /// Scored activation that earned nothing
    Click,
    /// Scored activation that earned points
    Perfect,
    /// Run ended
    GameOver,
}

/// Result of a scored activation, displayed by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub classification: Classification,
    pub points: u64,
    pub pos: Vec2,
    /// Activation timestamp (ms); display expiry is counted from here
    pub created_at: f64,
}

/// Notifications emitted by the engine. Nothing here feeds back into state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    Sound { cue: SoundCue },
    /// Particle burst request at a position
    Burst { pos: Vec2 },
    Feedback { feedback: FeedbackEvent },
    GameOver { final_score: u64 },
    /// Final score beat the stored best; host should persist it
    NewHighScore { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Accepted activations in the current run
    pub round: u32,
    pub score: u64,
    pub last_activation_time: Option<f64>,
    /// Interval (ms) the next activation must approximate
    pub target_interval: f64,
    pub high_score: u64,
    /// Consecutive activations that scored points
    pub combo: u32,
}

impl GameState {
    /// Fresh state with a persisted best score
    pub fn new(high_score: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            round: 0,
            score: 0,
            last_activation_time: None,
            target_interval: 0.0,
            high_score,
            combo: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase != GamePhase::Idle
    }

    pub fn first_activation_after_start(&self) -> bool {
        self.phase == GamePhase::AwaitingSecond
    }

    pub fn game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}
