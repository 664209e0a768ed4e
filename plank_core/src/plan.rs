//! Default workout plan.
//!
//! Ten plank variations performed in a fixed order.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default plan - built once and reused across all operations
static DEFAULT_PLAN: Lazy<WorkoutPlan> = Lazy::new(build_default_plan);

/// Get a reference to the cached default plan
pub fn default_plan() -> &'static WorkoutPlan {
    &DEFAULT_PLAN
}

fn exercise(id: u32, name: &str, image: &str, can_mirror: bool, cues: &[&str]) -> Exercise {
    Exercise {
        id,
        name: name.into(),
        duration: 45,
        can_mirror,
        image: Some(format!("exercises/{}.png", image)),
        description: cues.iter().map(|c| c.to_string()).collect(),
    }
}

/// Builds the default ten-exercise plan
///
/// Prefer `default_plan()` outside of tests.
pub fn build_default_plan() -> WorkoutPlan {
    WorkoutPlan {
        exercises: vec![
            exercise(
                1,
                "Simple Elbow Plank",
                "elbow-plank",
                false,
                &["Elbows under shoulders", "Keep a straight line from head to heels"],
            ),
            exercise(
                2,
                "Slow Mountain Climber",
                "mountain-climber",
                false,
                &["Drive one knee at a time toward the chest", "Hips stay level"],
            ),
            exercise(
                3,
                "Plank to Dolphin",
                "plank-dolphin",
                false,
                &["Push hips up and back", "Return to a flat plank with control"],
            ),
            exercise(
                4,
                "Single Leg Plank",
                "single-leg-plank",
                true,
                &["Lift one leg a hand's width", "Switch legs at halfway"],
            ),
            exercise(
                5,
                "Plank Hip Dip",
                "hip-dip",
                false,
                &["Rotate hips toward the floor on each side", "Shoulders stay still"],
            ),
            exercise(
                6,
                "Side Plank",
                "side-plank",
                true,
                &["Stack the feet, lift the hips", "Switch sides at halfway"],
            ),
            exercise(
                7,
                "Spiderman Plank",
                "spiderman-plank",
                false,
                &["Bring the knee toward the same-side elbow", "Alternate sides"],
            ),
            exercise(
                8,
                "Single Arm Plank",
                "single-arm-plank",
                true,
                &["Widen the feet for balance", "Switch arms at halfway"],
            ),
            exercise(
                9,
                "Commando Plank",
                "commando-plank",
                false,
                &["Move between elbow and hand plank", "Lead with alternating arms"],
            ),
            exercise(
                10,
                "Plank Jacks",
                "plank-jacks",
                false,
                &["Jump the feet wide and back together", "Keep the core braced"],
            ),
        ],
    }
}

impl WorkoutPlan {
    /// Validate the plan for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.exercises.is_empty() {
            errors.push("Plan has no exercises".to_string());
        }

        let mut seen_ids = HashSet::new();
        for (index, exercise) in self.exercises.iter().enumerate() {
            if !seen_ids.insert(exercise.id) {
                errors.push(format!("Duplicate exercise id {}", exercise.id));
            }
            if exercise.name.trim().is_empty() {
                errors.push(format!("Exercise at index {} has empty name", index));
            }
            if exercise.duration == 0 {
                errors.push(format!("Exercise '{}' has zero duration", exercise.name));
            }
        }

        errors
    }
}
