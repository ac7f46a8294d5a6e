//! Ephemeral visual effects
//!
//! Feedback popups and particle bursts spawned from engine events. Visual only:
//! nothing here is read back by the engine.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{FeedbackEvent, GameEvent};
use crate::tuning::Tuning;

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 256;

/// Distance (px) a particle travels per unit of speed over its lifetime
pub const PARTICLE_TRAVEL: f32 = 100.0;

/// A feedback popup on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: u64,
    pub feedback: FeedbackEvent,
    pub expires_at: f64,
}

/// A particle flying outward from a burst origin
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub origin: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub born_at: f64,
    pub expires_at: f64,
}

impl Particle {
    /// Eased 0-1 progress through the particle's life
    pub fn life_fraction(&self, now: f64) -> f32 {
        let span = self.expires_at - self.born_at;
        if span <= 0.0 {
            return 1.0;
        }
        ((now - self.born_at) / span).clamp(0.0, 1.0) as f32
    }

    /// Ease-out position at `now`
    pub fn position(&self, now: f64) -> Vec2 {
        let t = self.life_fraction(now);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        let dir = Vec2::new(self.angle.cos(), self.angle.sin());
        self.origin + dir * PARTICLE_TRAVEL * self.speed * eased
    }

    /// Fades to transparent over its life
    pub fn opacity(&self, now: f64) -> f32 {
        1.0 - self.life_fraction(now)
    }
}

/// Live popups and particles
#[derive(Debug, Clone)]
pub struct Effects {
    pub popups: Vec<Popup>,
    pub particles: Vec<Particle>,
    rng: Pcg32,
    next_id: u64,
    feedback_duration_ms: f64,
    particle_lifetime_ms: f64,
    burst_size: usize,
}

impl Effects {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            popups: Vec::new(),
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            feedback_duration_ms: tuning.feedback_duration_ms,
            particle_lifetime_ms: tuning.particle_lifetime_ms,
            burst_size: tuning.burst_particles,
        }
    }

    /// Disable or resize bursts (settings toggle)
    pub fn set_burst_size(&mut self, burst_size: usize) {
        self.burst_size = burst_size;
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn whatever visuals a batch of engine events calls for
    pub fn apply_events(&mut self, events: &[GameEvent], now: f64) {
        for event in events {
            match event {
                GameEvent::Feedback { feedback } => self.spawn_popup(*feedback),
                GameEvent::Burst { pos } => self.spawn_burst(*pos, now),
                _ => {}
            }
        }
    }

    pub fn spawn_popup(&mut self, feedback: FeedbackEvent) {
        let id = self.next_id();
        self.popups.push(Popup {
            id,
            feedback,
            expires_at: feedback.created_at + self.feedback_duration_ms,
        });
    }

    /// Evenly spaced ring of particles with random speeds
    pub fn spawn_burst(&mut self, origin: Vec2, now: f64) {
        let count = self.burst_size;
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                // Oldest first out
                self.particles.remove(0);
            }
            let id = self.next_id();
            let angle = i as f32 * std::f32::consts::TAU / count as f32;
            let speed = self.rng.random_range(2.0..4.0);
            self.particles.push(Particle {
                id,
                origin,
                angle,
                speed,
                born_at: now,
                expires_at: now + self.particle_lifetime_ms,
            });
        }
    }

    /// Drop everything that has expired by `now`
    pub fn update(&mut self, now: f64) {
        self.popups.retain(|p| p.expires_at > now);
        self.particles.retain(|p| p.expires_at > now);
    }

    /// Remove every effect (restart)
    pub fn clear(&mut self) {
        self.popups.clear();
        self.particles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty() && self.particles.is_empty()
    }
}
