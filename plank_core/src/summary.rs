//! Post-workout summary computation.

use crate::{Preferences, Session, SessionSummary};

/// Metabolic equivalent used for every plank variation
pub const MET_PLANK: f64 = 3.3;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Reduce a finished session to total time, longest hold and calories
///
/// Calories are `round(MET × weight_kg × hours held)`.
pub fn compute_session_summary(session: &Session, preferences: &Preferences) -> SessionSummary {
    let mut total_plank_ms: u64 = 0;
    let mut longest_hold_ms: u64 = 0;

    for segment in &session.segments {
        total_plank_ms += segment.duration_ms;
        longest_hold_ms = longest_hold_ms.max(segment.duration_ms);
    }

    let total_hours = total_plank_ms as f64 / MS_PER_HOUR;
    let calories = (MET_PLANK * preferences.weight_kg * total_hours).round().max(0.0) as u64;

    SessionSummary {
        total_plank_ms,
        longest_hold_ms,
        calories,
    }
}

/// Format milliseconds as `m:ss`
pub fn format_ms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
