//! Progress bar projection
//!
//! Pure function of the clock and the engine's last anchor; the render loop
//! calls it at its own cadence and never writes back.

/// Elapsed share of the target interval, as a percentage clamped to 0-100
#[inline]
pub fn progress_percent(now: f64, last_activation_time: f64, target_interval: f64) -> f64 {
    if target_interval <= 0.0 {
        return 0.0;
    }
    ((now - last_activation_time) / target_interval * 100.0).clamp(0.0, 100.0)
}
