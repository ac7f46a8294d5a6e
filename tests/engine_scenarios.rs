//! End-to-end runs through the engine with persistence and effects wired the
//! way the browser shell wires them.

use rhythm_tap::fx::Effects;
use rhythm_tap::persistence::PersistenceError;
use rhythm_tap::platform::{KeyValueStore, MemoryStore};
use rhythm_tap::sim::{Classification, GameEvent, GamePhase, SoundCue, classification_of};
use rhythm_tap::{ScorePersistence, TimingEngine, Tuning};

/// Storage that refuses every call, like LocalStorage in a locked-down browser
struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        Err(PersistenceError::StorageUnavailable)
    }
    fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::StorageUnavailable)
    }
}

/// Host loop: engine events routed to persistence and effects
struct Host<S: KeyValueStore = MemoryStore> {
    engine: TimingEngine,
    scores: ScorePersistence<S>,
    fx: Effects,
    sounds: Vec<SoundCue>,
}

impl Host {
    fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl<S: KeyValueStore> Host<S> {
    fn with_store(store: S) -> Self {
        let scores = ScorePersistence::new(store, None);
        let tuning = Tuning::default();
        Self {
            engine: TimingEngine::new(tuning.clone(), scores.load_high_score()),
            fx: Effects::new(1, &tuning),
            scores,
            sounds: Vec::new(),
        }
    }

    fn tap(&mut self, t: f64) -> Vec<GameEvent> {
        if self.engine.stalled() {
            self.restart();
        }
        let events = self.engine.handle_activation(t, 100.0, 200.0);
        for event in &events {
            match event {
                GameEvent::Sound { cue } => self.sounds.push(*cue),
                GameEvent::NewHighScore { score } => self.scores.save_high_score(*score, None),
                _ => {}
            }
        }
        self.fx.apply_events(&events, t);
        events
    }

    fn restart(&mut self) {
        self.engine.restart(self.scores.load_high_score());
        self.fx.clear();
    }
}

#[test]
fn test_perfect_then_late_ends_run() {
    let mut host = Host::new();

    host.tap(0.0);
    assert_eq!(host.engine.phase(), GamePhase::AwaitingSecond);

    host.tap(1000.0);
    assert_eq!(host.engine.target_interval(), 1000.0);
    assert_eq!(host.engine.round(), 2);

    let events = host.tap(2000.0);
    assert_eq!(classification_of(&events), Some(Classification::Perfect));
    assert_eq!(host.engine.score(), 1003);
    assert_eq!(host.engine.round(), 3);
    assert_eq!(host.engine.target_interval(), 1000.0);

    host.tap(3300.0);
    assert!(host.engine.game_over());
    assert_eq!(host.engine.score(), 1003);
    assert_eq!(host.scores.load_high_score(), 1003);

    assert_eq!(
        host.sounds,
        vec![
            SoundCue::Start,
            SoundCue::Start,
            SoundCue::Perfect,
            SoundCue::GameOver
        ]
    );
}

#[test]
fn test_early_tap_resets_combo_and_retargets() {
    let mut host = Host::new();
    host.tap(0.0);
    host.tap(1000.0);

    let events = host.tap(1400.0);
    assert!(!host.engine.game_over());
    assert_eq!(classification_of(&events), Some(Classification::TooEarly));
    assert_eq!(host.engine.combo(), 0);
    assert_eq!(host.engine.target_interval(), 400.0);
    assert_eq!(host.sounds.last(), Some(&SoundCue::Click));
}

#[test]
fn test_restart_reloads_best_score() {
    let mut host = Host::new();
    for t in [0.0, 1000.0, 2000.0, 3000.0, 4500.0] {
        host.tap(t);
    }
    assert!(host.engine.game_over());
    let best = host.engine.score();
    assert_eq!(best, 1003 + 1004);

    host.restart();
    assert_eq!(host.engine.phase(), GamePhase::Idle);
    assert_eq!(host.engine.score(), 0);
    assert_eq!(host.engine.round(), 0);
    assert!(!host.engine.game_over());
    assert_eq!(host.engine.high_score(), best);
    assert!(host.fx.is_empty());

    // A worse second run leaves the best alone
    for t in [10_000.0, 11_000.0, 13_000.0] {
        host.tap(t);
    }
    assert!(host.engine.game_over());
    assert_eq!(host.engine.score(), 0);
    host.restart();
    assert_eq!(host.engine.high_score(), best);
}

#[test]
fn test_steady_perfects_sum_with_round_bonus() {
    let mut host = Host::new();
    host.tap(0.0);
    host.tap(750.0);

    let n = 12u64;
    for i in 0..n {
        let events = host.tap(750.0 * (i as f64 + 2.0));
        assert_eq!(classification_of(&events), Some(Classification::Perfect));
    }

    let expected: u64 = (3..=n + 2).map(|r| 1000 + r).sum();
    assert_eq!(host.engine.score(), expected);
    assert_eq!(host.engine.combo() as u64, n);
    assert!(!host.engine.game_over());
}

#[test]
fn test_popups_expire_after_display_time() {
    let mut host = Host::new();
    host.tap(0.0);
    host.tap(1000.0);
    host.tap(2000.0);
    assert_eq!(host.fx.popups.len(), 1);

    host.fx.update(2999.0);
    assert_eq!(host.fx.popups.len(), 1);
    host.fx.update(3000.0);
    assert!(host.fx.popups.is_empty());
}

#[test]
fn test_restart_without_storage_keeps_best() {
    let mut host = Host::with_store(UnavailableStore);
    for t in [0.0, 1000.0, 2000.0, 3300.0] {
        host.tap(t);
    }
    assert!(host.engine.game_over());
    let before = host.engine.high_score();
    assert_eq!(before, 1003);
    assert_eq!(host.scores.load_high_score(), 0);

    host.restart();
    assert_eq!(host.engine.phase(), GamePhase::Idle);
    assert!(host.engine.high_score() >= before);
}

#[test]
fn test_stalled_run_restarts_on_next_tap() {
    let mut host = Host::new();
    host.tap(100.0);
    host.tap(100.0);
    assert!(host.engine.stalled());

    let events = host.tap(400.0);
    assert_eq!(host.engine.phase(), GamePhase::AwaitingSecond);
    assert_eq!(host.engine.round(), 1);
    assert!(events.contains(&GameEvent::Sound {
        cue: SoundCue::Start
    }));

    host.tap(1000.0);
    let events = host.tap(1600.0);
    assert_eq!(classification_of(&events), Some(Classification::Perfect));
}
