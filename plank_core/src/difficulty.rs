//! Difficulty levels and their timing tables.
//!
//! Harder levels mean longer holds and shorter rest.

use crate::{Error, Result, WorkoutConfig};

/// Number of selectable levels
pub const LEVEL_COUNT: usize = 5;

/// Intermediate
pub const DEFAULT_LEVEL: u8 = 2;

pub const LEVEL_LABELS: [&str; LEVEL_COUNT] =
    ["Beginner", "Novice", "Intermediate", "Advanced", "Expert"];

const EXERCISE_BY_LEVEL: [u32; LEVEL_COUNT] = [35, 40, 45, 60, 70];
const SHORT_BREAK_BY_LEVEL: [u32; LEVEL_COUNT] = [20, 18, 15, 12, 10];
const LONG_BREAK_BY_LEVEL: [u32; LEVEL_COUNT] = [70, 65, 60, 50, 45];

fn check_level(level: u8) -> Result<usize> {
    let index = usize::from(level);
    if index >= LEVEL_COUNT {
        return Err(Error::InvalidArgument(format!(
            "difficulty level must be between 0 and {}, got {}",
            LEVEL_COUNT - 1,
            level
        )));
    }
    Ok(index)
}

/// Map a difficulty level to its work and rest durations
pub fn config_from_level(level: u8) -> Result<WorkoutConfig> {
    let index = check_level(level)?;
    Ok(WorkoutConfig {
        exercise_duration: EXERCISE_BY_LEVEL[index],
        short_break: SHORT_BREAK_BY_LEVEL[index],
        long_break: LONG_BREAK_BY_LEVEL[index],
    })
}

/// Human-readable name of a level
pub fn level_label(level: u8) -> Result<&'static str> {
    Ok(LEVEL_LABELS[check_level(level)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intermediate_table() {
        let config = config_from_level(2).unwrap();
        assert_eq!(
            config,
            WorkoutConfig {
                exercise_duration: 45,
                short_break: 15,
                long_break: 60,
            }
        );
        assert_eq!(level_label(2).unwrap(), "Intermediate");
    }

    #[test]
    fn test_extremes() {
        assert_eq!(config_from_level(0).unwrap().exercise_duration, 35);
        assert_eq!(config_from_level(4).unwrap().long_break, 45);
        assert_eq!(level_label(4).unwrap(), "Expert");
    }

    #[test]
    fn test_out_of_range_is_invalid_argument() {
        assert!(matches!(config_from_level(5), Err(Error::InvalidArgument(_))));
        assert!(matches!(level_label(255), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_all_durations_positive() {
        for level in 0..LEVEL_COUNT as u8 {
            let config = config_from_level(level).unwrap();
            assert!(config.exercise_duration > 0);
            assert!(config.short_break > 0);
            assert!(config.long_break > 0);
        }
    }

    proptest! {
        #[test]
        fn harder_levels_never_ease_off(lower in 0u8..4, step in 1u8..4) {
            let higher = (lower + step).min(4);
            let easy = config_from_level(lower).unwrap();
            let hard = config_from_level(higher).unwrap();
            prop_assert!(hard.exercise_duration >= easy.exercise_duration);
            prop_assert!(hard.short_break <= easy.short_break);
            prop_assert!(hard.long_break <= easy.long_break);
        }
    }
}
