//! Rhythm Tap entry point
//!
//! Handles platform-specific initialization and wires the DOM to the engine.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, HtmlInputElement, MouseEvent, TouchEvent};

    use rhythm_tap::audio::AudioManager;
    use rhythm_tap::fx::Effects;
    use rhythm_tap::persistence::LeaderboardClient;
    use rhythm_tap::platform::{InputCoalescer, LocalStorage, PressSource, RawPress};
    use rhythm_tap::sim::{GameEvent, GamePhase};
    use rhythm_tap::{Leaderboard, ScorePersistence, Settings, TimingEngine, Tuning};

    /// Game instance holding all state
    struct Game {
        engine: TimingEngine,
        fx: Effects,
        input: InputCoalescer,
        audio: AudioManager,
        settings: Settings,
        scores: ScorePersistence<LocalStorage>,
        leaderboard: Leaderboard,
        showing_leaderboard: bool,
        submitted_name: Option<String>,
    }

    fn persistence(settings: &Settings) -> ScorePersistence<LocalStorage> {
        ScorePersistence::new(
            LocalStorage,
            settings.leaderboard.clone().map(LeaderboardClient::new),
        )
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let tuning = Tuning::load(&LocalStorage);
            let settings = Settings::load(&LocalStorage);
            let scores = persistence(&settings);
            let engine = TimingEngine::new(tuning.clone(), scores.load_high_score());

            let mut fx = Effects::new(seed, &tuning);
            if !settings.effective_particles() {
                fx.set_burst_size(0);
            }
            let mut audio = AudioManager::new();
            audio.set_volume(settings.effective_volume());

            Self {
                engine,
                fx,
                input: InputCoalescer::new(tuning.coalesce_window_ms),
                audio,
                leaderboard: Leaderboard::with_limit(tuning.leaderboard_limit),
                settings,
                scores,
                showing_leaderboard: false,
                submitted_name: None,
            }
        }

        /// Feed one raw DOM press through the coalescer into the engine
        fn on_press(&mut self, press: RawPress, area_origin: Vec2) {
            let Some(activation) = self.input.accept(press, area_origin) else {
                return;
            };
            // A zero rhythm ignores every press, so the press starts a new run
            if self.engine.stalled() {
                log::warn!("Run stalled with no rhythm, restarting");
                self.restart();
            }
            let events = self.engine.apply(&activation);
            self.route_events(&events, activation.timestamp);
        }

        /// Hand engine events to audio, effects, and persistence
        fn route_events(&mut self, events: &[GameEvent], now: f64) {
            for event in events {
                match event {
                    GameEvent::Sound { cue } => self.audio.play(*cue),
                    GameEvent::NewHighScore { score } => {
                        self.scores.save_high_score(*score, None);
                    }
                    GameEvent::GameOver { final_score } => {
                        log::info!("Run over with {}", final_score);
                    }
                    GameEvent::Burst { .. } | GameEvent::Feedback { .. } => {}
                }
            }
            self.fx.apply_events(events, now);
        }

        fn leaderboard_limit(&self) -> usize {
            self.engine.tuning().leaderboard_limit
        }

        /// Reset for a new run
        fn restart(&mut self) {
            self.engine.restart(self.scores.load_high_score());
            self.fx.clear();
            self.input.reset();
            self.showing_leaderboard = false;
            self.submitted_name = None;
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document, now: f64) {
            let engine = &self.engine;

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&engine.score().to_string()));
            }
            if let Some(el) = document.get_element_by_id("high-score") {
                el.set_text_content(Some(&format!("High Score: {}", engine.high_score())));
            }

            // Combo only shown from 2 up
            if let Some(el) = document.get_element_by_id("combo") {
                if engine.combo() > 1 {
                    el.set_text_content(Some(&format!("{}x Combo!", engine.combo())));
                    set_hidden(&el, false);
                } else {
                    set_hidden(&el, true);
                }
            }

            if let Some(el) = document.get_element_by_id("progress-fill") {
                if let Ok(el) = el.dyn_into::<HtmlElement>() {
                    let width = format!("{:.2}%", engine.progress(now));
                    let _ = el.style().set_property("width", &width);
                }
            }

            if let Some(el) = document.get_element_by_id("start-prompt") {
                set_hidden(&el, engine.phase() != GamePhase::Idle);
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                set_hidden(&el, !engine.game_over());
            }
            if engine.game_over() {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&format!("Final Score: {}", engine.score())));
                }
                if let Some(el) = document.get_element_by_id("potential-rank") {
                    match self.leaderboard.potential_rank(engine.score()) {
                        Some(rank) if self.scores.has_remote() => {
                            el.set_text_content(Some(&format!("Good for #{} on the board", rank)));
                        }
                        _ => el.set_text_content(None),
                    }
                }
                if let Some(el) = document.get_element_by_id("submit-panel") {
                    set_hidden(&el, self.showing_leaderboard);
                }
                if let Some(el) = document.get_element_by_id("leaderboard") {
                    set_hidden(&el, !self.showing_leaderboard);
                }
                if self.showing_leaderboard {
                    self.render_leaderboard(document);
                }
            }
        }

        fn render_leaderboard(&self, document: &Document) {
            let Some(list) = document.get_element_by_id("leaderboard-list") else {
                return;
            };
            let highlight = self
                .submitted_name
                .as_deref()
                .and_then(|name| self.leaderboard.highlight_index(name, self.engine.score()));

            let mut html = String::new();
            for (i, entry) in self.leaderboard.entries.iter().enumerate() {
                let class = if Some(i) == highlight { "row mine" } else { "row" };
                html.push_str(&format!(
                    "<div class=\"{}\"><span>{}. {}</span><span>{}</span></div>",
                    class,
                    i + 1,
                    escape_html(&entry.player_name),
                    entry.score
                ));
            }
            if self.leaderboard.is_empty() {
                html.push_str("<div class=\"row\">No scores yet</div>");
            }
            list.set_inner_html(&html);
        }

        /// Draw popups and particles as absolutely positioned divs
        fn render_effects(&self, document: &Document, now: f64) {
            let Some(layer) = document.get_element_by_id("fx") else {
                return;
            };
            let mut html = String::new();

            for p in &self.fx.particles {
                let pos = p.position(now);
                html.push_str(&format!(
                    "<div class=\"particle\" style=\"left:{:.1}px;top:{:.1}px;opacity:{:.2}\"></div>",
                    pos.x,
                    pos.y,
                    p.opacity(now)
                ));
            }

            if self.settings.popups {
                for popup in &self.fx.popups {
                    let f = &popup.feedback;
                    let age = ((now - f.created_at) / 500.0).clamp(0.0, 1.0);
                    let rise = if self.settings.reduced_motion { 0.0 } else { age * 50.0 };
                    html.push_str(&format!(
                        "<div class=\"popup {}\" style=\"left:{:.1}px;top:{:.1}px\">{}</div>",
                        f.classification.css_class(),
                        f.pos.x,
                        f.pos.y as f64 - rise,
                        f.classification.label()
                    ));
                }
            }

            layer.set_inner_html(&html);
        }
    }

    fn set_hidden(el: &Element, hidden: bool) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }

    fn escape_html(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    /// Fetch the leaderboard in the background and store it on the game
    fn refresh_leaderboard(game: Rc<RefCell<Game>>, show: bool) {
        let (scores, limit, run) = {
            let g = game.borrow();
            (persistence(&g.settings), g.leaderboard_limit(), g.engine.run_id())
        };
        wasm_bindgen_futures::spawn_local(async move {
            let entries = scores.fetch_top_scores(limit).await;
            let mut g = game.borrow_mut();
            log::info!("Leaderboard refreshed ({} rows)", entries.len());
            g.leaderboard = Leaderboard::from_entries(entries, limit);
            // Only reveal it for the run that was submitted
            if show && g.engine.run_id() == run && g.engine.game_over() {
                g.showing_leaderboard = true;
            }
        });
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Rhythm Tap starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, cannot start");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            set_hidden(&loading, true);
        }

        let Some(area) = document.get_element_by_id("play-area") else {
            log::error!("Missing #play-area element");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!(
            "Game initialized (high score {})",
            game.borrow().engine.high_score()
        );

        if let Some(input) = document
            .get_element_by_id("player-name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&game.borrow().settings.player_name);
        }

        setup_input_handlers(&area, game.clone());
        setup_restart_buttons(&document, game.clone());
        setup_submit_button(&document, game.clone());

        refresh_leaderboard(game.clone(), false);

        request_animation_frame(game);

        log::info!("Rhythm Tap running!");
    }

    fn area_origin(area: &Element) -> Vec2 {
        let rect = area.get_bounding_client_rect();
        Vec2::new(rect.left() as f32, rect.top() as f32)
    }

    fn setup_input_handlers(area: &Element, game: Rc<RefCell<Game>>) {
        // Mouse down
        {
            let game = game.clone();
            let area_clone = area.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                let press = RawPress {
                    source: PressSource::Mouse,
                    timestamp: now(),
                    client: Vec2::new(event.client_x() as f32, event.client_y() as f32),
                };
                game.borrow_mut().on_press(press, area_origin(&area_clone));
            });
            let _ = area
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let area_clone = area.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let press = RawPress {
                    source: PressSource::Touch,
                    timestamp: now(),
                    client: Vec2::new(touch.client_x() as f32, touch.client_y() as f32),
                };
                game.borrow_mut().on_press(press, area_origin(&area_clone));
            });
            let _ = area
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let t = now();
            let mut g = game.borrow_mut();
            g.fx.update(t);
            g.update_hud(&document, t);
            g.render_effects(&document, t);
        }

        request_animation_frame(game);
    }

    fn setup_restart_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let Ok(buttons) = document.query_selector_all(".restart-btn") else {
            return;
        };
        for i in 0..buttons.length() {
            let Some(btn) = buttons.get(i) else { continue };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_submit_button(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("submit-btn") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            event.stop_propagation();
            let Some(input) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("player-name"))
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let name = input.value().trim().to_string();

            {
                let mut g = game.borrow_mut();
                let score = g.engine.score();
                if name.is_empty() || score == 0 {
                    return;
                }
                g.settings.player_name = name.clone();
                g.settings.save(&LocalStorage);
                g.scores.save_high_score(score, Some(&name));
                g.submitted_name = Some(name);
            }

            refresh_leaderboard(game.clone(), true);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rhythm Tap (native) starting...");
    log::info!("Native mode plays a scripted run - use `trunk serve` for the web version");

    demo_run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a fixed tap sequence through the engine and print what happens
#[cfg(not(target_arch = "wasm32"))]
fn demo_run() {
    use rhythm_tap::platform::MemoryStore;
    use rhythm_tap::sim::GameEvent;
    use rhythm_tap::{ScorePersistence, TimingEngine, Tuning};

    let scores = ScorePersistence::new(MemoryStore::new(), None);
    let mut engine = TimingEngine::new(Tuning::default(), scores.load_high_score());

    let taps = [0.0, 1000.0, 2000.0, 2960.0, 3880.0, 4300.0, 5600.0];
    for t in taps {
        for event in engine.handle_activation(t, 0.0, 0.0) {
            match event {
                GameEvent::Feedback { feedback } => println!(
                    "{:>7.0}ms  {:<11} +{:<5} score {}",
                    t,
                    feedback.classification.label(),
                    feedback.points,
                    engine.score()
                ),
                GameEvent::GameOver { final_score } => {
                    println!("{:>7.0}ms  GAME OVER   final {}", t, final_score)
                }
                GameEvent::NewHighScore { score } => scores.save_high_score(score, None),
                GameEvent::Sound { .. } | GameEvent::Burst { .. } => {}
            }
        }
        match engine.round() {
            1 => println!("{:>7.0}ms  start", t),
            2 => println!("{:>7.0}ms  rhythm      {:.0}ms", t, engine.target_interval()),
            _ => {}
        }
    }

    println!(
        "\nFinal score {} / best {}",
        engine.score(),
        scores.load_high_score()
    );
}
