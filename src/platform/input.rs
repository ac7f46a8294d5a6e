//! Input adaptation
//!
//! Browsers fire both `touchstart` and an emulated `mousedown` for one tap.
//! `InputCoalescer` turns raw presses into at most one `Activation` per
//! physical press so the engine never sees duplicates.

use glam::Vec2;

use crate::sim::Activation;

/// Which DOM event family a raw press came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressSource {
    Mouse,
    Touch,
}

/// A raw press before coalescing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPress {
    pub source: PressSource,
    pub timestamp: f64,
    /// Client coordinates
    pub client: Vec2,
}

/// Collapses mouse/touch duplicates into single activations
#[derive(Debug, Clone)]
pub struct InputCoalescer {
    window_ms: f64,
    last_touch: Option<f64>,
}

impl InputCoalescer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_touch: None,
        }
    }

    /// Accept a press, translating it into play-area coordinates.
    ///
    /// Returns `None` for the emulated mouse press that trails a touch.
    pub fn accept(&mut self, press: RawPress, area_origin: Vec2) -> Option<Activation> {
        match press.source {
            PressSource::Touch => {
                self.last_touch = Some(press.timestamp);
            }
            PressSource::Mouse => {
                if let Some(touched) = self.last_touch {
                    let since = press.timestamp - touched;
                    if (0.0..=self.window_ms).contains(&since) {
                        log::debug!("Dropping emulated mouse press ({:.1}ms after touch)", since);
                        return None;
                    }
                }
            }
        }

        let pos = press.client - area_origin;
        Some(Activation::new(press.timestamp, pos.x, pos.y))
    }

    /// Forget touch history (restart)
    pub fn reset(&mut self) {
        self.last_touch = None;
    }
}

impl Default for InputCoalescer {
    fn default() -> Self {
        Self::new(crate::tuning::Tuning::default().coalesce_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(source: PressSource, timestamp: f64) -> RawPress {
        RawPress {
            source,
            timestamp,
            client: Vec2::new(120.0, 80.0),
        }
    }

    #[test]
    fn test_touch_then_emulated_mouse_is_one_activation() {
        let mut input = InputCoalescer::new(500.0);
        let first = input.accept(press(PressSource::Touch, 1000.0), Vec2::ZERO);
        let second = input.accept(press(PressSource::Mouse, 1030.0), Vec2::ZERO);
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn test_mouse_only_passes_through() {
        let mut input = InputCoalescer::new(500.0);
        assert!(input.accept(press(PressSource::Mouse, 0.0), Vec2::ZERO).is_some());
        assert!(input.accept(press(PressSource::Mouse, 10.0), Vec2::ZERO).is_some());
    }

    #[test]
    fn test_mouse_after_window_passes() {
        let mut input = InputCoalescer::new(500.0);
        input.accept(press(PressSource::Touch, 0.0), Vec2::ZERO);
        assert!(input.accept(press(PressSource::Mouse, 501.0), Vec2::ZERO).is_some());
    }

    #[test]
    fn test_consecutive_touches_all_count() {
        let mut input = InputCoalescer::new(500.0);
        assert!(input.accept(press(PressSource::Touch, 0.0), Vec2::ZERO).is_some());
        assert!(input.accept(press(PressSource::Touch, 100.0), Vec2::ZERO).is_some());
    }

    #[test]
    fn test_position_relative_to_area() {
        let mut input = InputCoalescer::default();
        let activation = input
            .accept(press(PressSource::Mouse, 5.0), Vec2::new(20.0, 30.0))
            .unwrap();
        assert_eq!(activation.pos, Vec2::new(100.0, 50.0));
        assert_eq!(activation.timestamp, 5.0);
    }

    #[test]
    fn test_reset_forgets_touch() {
        let mut input = InputCoalescer::new(500.0);
        input.accept(press(PressSource::Touch, 0.0), Vec2::ZERO);
        input.reset();
        assert!(input.accept(press(PressSource::Mouse, 10.0), Vec2::ZERO).is_some());
    }
}
