//! Activation-driven timing engine
//!
//! One activation in, a list of events out. The engine never touches storage,
//! audio, or the DOM; the host routes events to those collaborators.

use super::judge::{self, Classification};
use super::progress::progress_percent;
use super::state::{Activation, FeedbackEvent, GameEvent, GamePhase, GameState, SoundCue};
use crate::tuning::Tuning;

/// Advance the game state by one activation.
///
/// Returns the events produced; an empty list means the activation was ignored.
pub fn step(state: &mut GameState, activation: &Activation, tuning: &Tuning) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let now = activation.timestamp;
    // Clock anomalies measure as zero
    let interval = state
        .last_activation_time
        .map_or(0.0, |last| (now - last).max(0.0));

    match state.phase {
        GamePhase::GameOver => {}

        GamePhase::Idle => {
            state.phase = GamePhase::AwaitingSecond;
            state.round = 1;
            state.score = 0;
            state.last_activation_time = Some(now);
            state.target_interval = interval;
            log::debug!("Run started at {:.1}ms", now);
            events.push(GameEvent::Sound {
                cue: SoundCue::Start,
            });
            events.push(GameEvent::Burst {
                pos: activation.pos,
            });
        }

        GamePhase::AwaitingSecond => {
            state.phase = GamePhase::Active;
            state.round += 1;
            state.last_activation_time = Some(now);
            state.target_interval = interval;
            log::debug!("Rhythm set: {:.1}ms", interval);
            events.push(GameEvent::Sound {
                cue: SoundCue::Start,
            });
            events.push(GameEvent::Burst {
                pos: activation.pos,
            });
        }

        GamePhase::Active => {
            let target = state.target_interval;
            let Some(deviation) = judge::deviation_percent(interval, target) else {
                log::warn!("Ignoring activation: target interval is {:.1}ms", target);
                return events;
            };

            if judge::is_late(interval, target, tuning) {
                state.phase = GamePhase::GameOver;
                let final_score = state.score;
                log::info!(
                    "Game over: {:.1}ms against {:.1}ms target, final score {}",
                    interval,
                    target,
                    final_score
                );
                events.push(GameEvent::Sound {
                    cue: SoundCue::GameOver,
                });
                events.push(GameEvent::GameOver { final_score });
                if final_score > state.high_score {
                    events.push(GameEvent::NewHighScore { score: final_score });
                }
                state.high_score = state.high_score.max(final_score);
                return events;
            }

            let classification = judge::classify(deviation, tuning);
            let points = classification.points(tuning);

            state.round += 1;
            state.score += points + u64::from(state.round);
            state.combo = if points > 0 { state.combo + 1 } else { 0 };
            state.last_activation_time = Some(now);
            state.target_interval = interval;

            log::debug!(
                "Round {}: {:.1}ms ({:.2}% off) -> {:?} +{}",
                state.round,
                interval,
                deviation,
                classification,
                points
            );

            events.push(GameEvent::Feedback {
                feedback: FeedbackEvent {
                    classification,
                    points,
                    pos: activation.pos,
                    created_at: now,
                },
            });
            if points > 0 {
                events.push(GameEvent::Sound {
                    cue: SoundCue::Perfect,
                });
                events.push(GameEvent::Burst {
                    pos: activation.pos,
                });
            } else {
                events.push(GameEvent::Sound {
                    cue: SoundCue::Click,
                });
            }
        }
    }

    events
}

/// Owns the game state and applies activations to it
#[derive(Debug, Clone)]
pub struct TimingEngine {
    state: GameState,
    tuning: Tuning,
    /// Bumped on every restart
    run: u64,
}

impl TimingEngine {
    /// Create an idle engine seeded with the persisted high score
    pub fn new(tuning: Tuning, high_score: u64) -> Self {
        Self {
            state: GameState::new(high_score),
            tuning,
            run: 0,
        }
    }

    /// Apply one activation (timestamp in ms, position in play-area pixels)
    pub fn handle_activation(&mut self, timestamp: f64, x: f32, y: f32) -> Vec<GameEvent> {
        self.apply(&Activation::new(timestamp, x, y))
    }

    pub fn apply(&mut self, activation: &Activation) -> Vec<GameEvent> {
        step(&mut self.state, activation, &self.tuning)
    }

    /// Back to `Idle`, keeping the better of the in-memory and stored best.
    ///
    /// The stored value reads as 0 when storage is unavailable, so the
    /// in-memory best must never be replaced by it.
    pub fn restart(&mut self, stored_high_score: u64) {
        let high_score = self.state.high_score.max(stored_high_score);
        log::info!("Restart (high score {})", high_score);
        self.state = GameState::new(high_score);
        self.run += 1;
    }

    /// Identifies the current run; changes on every restart
    pub fn run_id(&self) -> u64 {
        self.run
    }

    /// Active with no usable rhythm: every further activation is ignored
    pub fn stalled(&self) -> bool {
        self.state.phase == GamePhase::Active && self.state.target_interval <= 0.0
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn game_over(&self) -> bool {
        self.state.game_over()
    }

    pub fn target_interval(&self) -> f64 {
        self.state.target_interval
    }

    /// Progress bar fill (0-100) at `now`; zero outside active play
    pub fn progress(&self, now: f64) -> f64 {
        if self.state.phase != GamePhase::Active {
            return 0.0;
        }
        self.state
            .last_activation_time
            .map_or(0.0, |last| {
                progress_percent(now, last, self.state.target_interval)
            })
    }
}

impl Default for TimingEngine {
    fn default() -> Self {
        Self::new(Tuning::default(), 0)
    }
}

/// Feedback events from a batch, in order
pub fn feedback_of(events: &[GameEvent]) -> impl Iterator<Item = &FeedbackEvent> {
    events.iter().filter_map(|e| match e {
        GameEvent::Feedback { feedback } => Some(feedback),
        _ => None,
    })
}

/// Classification of the scored activation in a batch, if any
pub fn classification_of(events: &[GameEvent]) -> Option<Classification> {
    feedback_of(events).next().map(|f| f.classification)
}
