//! Sound and vibration cues for workout transitions.
//!
//! Feedback is fire-and-forget: sink failures are logged and dropped so they
//! can never hold up or alter a transition.

use crate::machine::WorkoutEvent;
use crate::{Phase, Preferences, Result};
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Play,
    Pause,
    Success,
}

impl Sound {
    pub fn name(&self) -> &'static str {
        match self {
            Sound::Play => "play",
            Sound::Pause => "pause",
            Sound::Success => "success",
        }
    }
}

/// Vibration in milliseconds: a single pulse, or alternating on/off times
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VibrationPattern {
    Pulse(u32),
    Sequence(Vec<u32>),
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Cue {
    pub sound: Option<Sound>,
    pub vibration: Option<VibrationPattern>,
}

/// Output device for cues
pub trait FeedbackSink {
    fn play_sound(&mut self, sound: Sound) -> Result<()>;
    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<()>;
}

/// Cue, if any, announcing an event
pub fn cue_for(event: &WorkoutEvent) -> Option<Cue> {
    match event {
        WorkoutEvent::PhaseChanged {
            from: Phase::Countdown,
            to: Phase::Exercise,
        } => Some(Cue {
            sound: Some(Sound::Play),
            vibration: Some(VibrationPattern::Pulse(100)),
        }),
        WorkoutEvent::PhaseChanged {
            to: Phase::Finished,
            ..
        } => Some(Cue {
            sound: Some(Sound::Success),
            vibration: Some(VibrationPattern::Sequence(vec![100, 50, 100])),
        }),
        WorkoutEvent::PauseToggled { paused: true } => Some(Cue {
            sound: Some(Sound::Pause),
            vibration: Some(VibrationPattern::Pulse(50)),
        }),
        WorkoutEvent::PauseToggled { paused: false } => Some(Cue {
            sound: Some(Sound::Play),
            vibration: Some(VibrationPattern::Pulse(30)),
        }),
        WorkoutEvent::FinalSeconds { .. } => Some(Cue {
            sound: None,
            vibration: Some(VibrationPattern::Pulse(40)),
        }),
        _ => None,
    }
}

/// Routes cues to a sink, honouring the sound and vibration toggles
pub struct FeedbackDispatcher<S: FeedbackSink> {
    sink: S,
    sound_enabled: bool,
    vibration_enabled: bool,
}

impl<S: FeedbackSink> FeedbackDispatcher<S> {
    pub fn new(sink: S, preferences: &Preferences) -> Self {
        Self {
            sink,
            sound_enabled: preferences.sound,
            vibration_enabled: preferences.vibration,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn notify(&mut self, event: &WorkoutEvent) {
        if let Some(cue) = cue_for(event) {
            self.dispatch(&cue);
        }
    }

    pub fn dispatch(&mut self, cue: &Cue) {
        if let (true, Some(sound)) = (self.sound_enabled, cue.sound) {
            if let Err(e) = self.sink.play_sound(sound) {
                tracing::warn!("Failed to play {} sound: {}", sound.name(), e);
            }
        }
        if let (true, Some(pattern)) = (self.vibration_enabled, cue.vibration.as_ref()) {
            if let Err(e) = self.sink.vibrate(pattern) {
                tracing::warn!("Failed to vibrate {:?}: {}", pattern, e);
            }
        }
    }
}

/// Terminal feedback: the bell stands in for sounds
///
/// Terminals cannot vibrate, so vibrations are only logged.
#[derive(Debug, Default)]
pub struct TerminalFeedback;

impl FeedbackSink for TerminalFeedback {
    fn play_sound(&mut self, sound: Sound) -> Result<()> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()?;
        tracing::debug!("Played {} sound", sound.name());
        Ok(())
    }

    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<()> {
        tracing::debug!("Vibration {:?} (not supported on a terminal)", pattern);
        Ok(())
    }
}
