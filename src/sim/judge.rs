//! Timing judgement
//!
//! Converts a measured interval into a deviation percentage and a scored
//! classification. Windows are closed at their upper bound.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Judgement for a scored activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Perfect,
    Amazing,
    Good,
    /// Outside every scoring window
    TooEarly,
}

impl Classification {
    /// Popup text
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Perfect => "PERFECT!",
            Classification::Amazing => "AMAZING!",
            Classification::Good => "GOOD!",
            Classification::TooEarly => "TOO EARLY!",
        }
    }

    /// CSS modifier class for the popup
    pub fn css_class(&self) -> &'static str {
        match self {
            Classification::Perfect => "perfect",
            Classification::Amazing => "amazing",
            Classification::Good => "good",
            Classification::TooEarly => "too-early",
        }
    }

    /// Base points for this judgement
    pub fn points(&self, tuning: &Tuning) -> u64 {
        match self {
            Classification::Perfect => tuning.perfect_points,
            Classification::Amazing => tuning.amazing_points,
            Classification::Good => tuning.good_points,
            Classification::TooEarly => 0,
        }
    }
}

/// Relative deviation of `interval` from `target`, in percent.
///
/// Returns `None` for a non-positive target.
#[inline]
pub fn deviation_percent(interval: f64, target: f64) -> Option<f64> {
    if target <= 0.0 {
        return None;
    }
    // Multiply first so whole-ms inputs hit the window edges exactly
    Some((interval - target).abs() * 100.0 / target)
}

/// Classify a deviation percentage (first window that contains it wins)
pub fn classify(deviation: f64, tuning: &Tuning) -> Classification {
    let windows = [
        (tuning.perfect_pct, Classification::Perfect),
        (tuning.amazing_pct, Classification::Amazing),
        (tuning.good_pct, Classification::Good),
    ];
    windows
        .iter()
        .find(|(max, _)| deviation <= *max)
        .map(|(_, class)| *class)
        .unwrap_or(Classification::TooEarly)
}

/// True when the interval arrived before `early_fraction` of the target
#[inline]
pub fn is_too_early(interval: f64, target: f64, tuning: &Tuning) -> bool {
    interval < target * tuning.early_fraction
}

/// True when the interval overshot the target (and was not too early)
#[inline]
pub fn is_late(interval: f64, target: f64, tuning: &Tuning) -> bool {
    interval > target && !is_too_early(interval, target, tuning)
}
