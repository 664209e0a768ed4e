//! Core domain types for PlankFlow.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and the ordered workout plan
//! - Difficulty-derived timing configuration
//! - Phases and the timer state owned by the state machine
//! - Recorded segments, sessions and their summary
//! - User preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// A single timed exercise in the plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    /// Nominal duration in seconds
    pub duration: u32,
    /// Whether the exercise is performed on one side, then the other
    pub can_mirror: bool,
    pub image: Option<String>,
    /// Form cues shown in the exercise guide
    pub description: Vec<String>,
}

/// The ordered, read-only catalog of exercises for one workout
///
/// Index position defines sequence order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub exercises: Vec<Exercise>,
}

impl WorkoutPlan {
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }
}

// ============================================================================
// Timing Types
// ============================================================================

/// Work and rest durations (seconds) derived from a difficulty level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutConfig {
    pub exercise_duration: u32,
    pub short_break: u32,
    pub long_break: u32,
}

/// The workout's top-level mode
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Config,
    Countdown,
    Exercise,
    Break,
    Finished,
}

impl Phase {
    /// Phases during which the countdown runs and workout controls apply
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Countdown | Phase::Exercise | Phase::Break)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Config => "config",
            Phase::Countdown => "countdown",
            Phase::Exercise => "exercise",
            Phase::Break => "break",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Snapshot of the phase machine, read by the presentation layer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    pub exercise_index: usize,
    pub time_left_seconds: u32,
    pub paused: bool,
    pub abort_confirm_pending: bool,
}

// ============================================================================
// Session Types
// ============================================================================

/// Body side held during a segment
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlankSide {
    Front,
    Left,
    Right,
}

/// One completed continuous hold
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlankSegment {
    pub side: PlankSide,
    pub duration_ms: u64,
}

/// The record of all holds for one workout attempt
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub segments: Vec<PlankSegment>,
}

/// Aggregate figures derived from a finished session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub total_plank_ms: u64,
    pub longest_hold_ms: u64,
    pub calories: u64,
}

// ============================================================================
// Preferences
// ============================================================================

/// User feedback toggles and body data
///
/// Serialized with camelCase keys. Missing keys take their default value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub vibration: bool,
    pub sound: bool,
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            vibration: true,
            sound: false,
            weight_kg: 70.0,
            height_cm: 170.0,
        }
    }
}
