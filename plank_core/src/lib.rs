#![forbid(unsafe_code)]

//! Core domain model and workout logic for PlankFlow.
//!
//! This crate provides:
//! - Domain types (exercises, phases, timer state, sessions, preferences)
//! - The workout plan catalog and difficulty tables
//! - The phase state machine and its tick source
//! - Session recording and summary computation
//! - Feedback and preferences collaborators

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod plan;
pub mod difficulty;
pub mod machine;
pub mod recorder;
pub mod summary;
pub mod feedback;
pub mod preferences;
pub mod ticker;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use plan::{build_default_plan, default_plan};
pub use difficulty::{config_from_level, level_label, DEFAULT_LEVEL, LEVEL_LABELS};
pub use machine::{PhaseStateMachine, WorkoutEvent};
pub use recorder::{Clock, SessionRecorder, SystemClock};
pub use summary::{compute_session_summary, format_ms, MET_PLANK};
pub use feedback::{FeedbackDispatcher, FeedbackSink, TerminalFeedback};
pub use preferences::{JsonFileStore, MemoryStore, PreferencesStore};
pub use ticker::Ticker;
pub use engine::{Command, UserAction, WorkoutOutcome, WorkoutRunner};
