//! Audio system using Web Audio API
//!
//! Procedurally generated tones - no external files needed. If the browser
//! refuses an AudioContext every cue is a no-op.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::SoundCue;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, volume: 0.8 }
    }

    /// Effective volume (0.0 - 1.0), already folded with mute
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
    }

    /// Play a cue
    pub fn play(&self, cue: SoundCue) {
        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Start | SoundCue::Click => self.play_click(ctx),
            SoundCue::Perfect => self.play_perfect(ctx),
            SoundCue::GameOver => self.play_game_over(ctx),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short blip with exponential decay
    fn blip(&self, ctx: &AudioContext, freq: f32, duration: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(self.volume * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + duration)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + duration).ok();
    }

    /// Click - neutral tick
    fn play_click(&self, ctx: &AudioContext) {
        self.blip(ctx, 800.0, 0.1);
    }

    /// Perfect - bright ping
    fn play_perfect(&self, ctx: &AudioContext) {
        self.blip(ctx, 1200.0, 0.2);
    }

    /// Game over - descending sweep
    fn play_game_over(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(self.volume * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(400.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(200.0, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }
}
