//! Workout phase state machine.
//!
//! The machine owns the single [`TimerState`] value. Every transition is a
//! method that runs to completion and returns the events it produced, in
//! order; requests that are invalid for the current state return no events
//! and leave the state untouched. Rendering pulls [`PhaseStateMachine::state`].
//!
//! ```text
//! Idle --start_setup--> Config --begin--> Countdown --0s--> Exercise
//! Exercise --0s--> Break --0s--> Exercise (next index)
//! Exercise (last index) --0s--> Finished --restart--> Config
//! ```

use crate::{Error, Phase, Result, TimerState, WorkoutConfig};

/// Length of the get-into-position countdown, before scaling
pub const COUNTDOWN_SECONDS: u32 = 10;

/// Value shown while idle
pub const IDLE_TIME_LEFT: u32 = 5;

/// Final stretch of an exercise during which each tick is announced
pub const ENDING_WINDOW_SECONDS: u32 = 5;

/// Something observable that happened during a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkoutEvent {
    PhaseChanged { from: Phase, to: Phase },
    /// The current exercise index moved (break ended or navigation)
    ExerciseChanged { index: usize },
    PauseToggled { paused: bool },
    /// A tick left the running exercise with 1..=5 seconds
    FinalSeconds { time_left: u32 },
    /// A tick crossed the midpoint of the running exercise
    HalfwayReached { index: usize },
    AbortArmed,
    AbortCancelled,
    Aborted,
}

fn idle_state() -> TimerState {
    TimerState {
        phase: Phase::Idle,
        exercise_index: 0,
        time_left_seconds: IDLE_TIME_LEFT,
        paused: false,
        abort_confirm_pending: false,
    }
}

#[derive(Clone, Debug)]
pub struct PhaseStateMachine {
    state: TimerState,
    config: WorkoutConfig,
    plan_len: usize,
    time_scale: f64,
}

impl PhaseStateMachine {
    /// Create an idle machine for a plan of `plan_len` exercises
    ///
    /// `time_scale` multiplies every phase duration; results are rounded up
    /// to whole seconds.
    pub fn new(config: WorkoutConfig, plan_len: usize, time_scale: f64) -> Result<Self> {
        if plan_len == 0 {
            return Err(Error::InvalidArgument("workout plan is empty".into()));
        }
        if !time_scale.is_finite() || time_scale <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "time scale must be positive, got {}",
                time_scale
            )));
        }
        Ok(Self {
            state: idle_state(),
            config,
            plan_len,
            time_scale,
        })
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn config(&self) -> WorkoutConfig {
        self.config
    }

    pub fn plan_len(&self) -> usize {
        self.plan_len
    }

    fn scaled(&self, seconds: u32) -> u32 {
        (f64::from(seconds) * self.time_scale).ceil() as u32
    }

    fn exercise_seconds(&self) -> u32 {
        self.scaled(self.config.exercise_duration)
    }

    /// Rest after the exercise at `index`: long before the final exercise
    fn break_seconds(&self, index: usize) -> u32 {
        let before_last = self.plan_len >= 2 && index == self.plan_len - 2;
        if before_last {
            self.scaled(self.config.long_break)
        } else {
            self.scaled(self.config.short_break)
        }
    }

    fn halfway_mark(&self) -> u32 {
        (f64::from(self.config.exercise_duration) * self.time_scale / 2.0).ceil() as u32
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Index of the exercise to show: the first one during the countdown,
    /// the upcoming one during a break, otherwise the current one
    pub fn display_index(&self) -> usize {
        match self.state.phase {
            Phase::Countdown => 0,
            Phase::Break => (self.state.exercise_index + 1).min(self.plan_len - 1),
            _ => self.state.exercise_index,
        }
    }

    pub fn is_past_halfway(&self) -> bool {
        self.state.phase == Phase::Exercise && self.state.time_left_seconds <= self.halfway_mark()
    }

    pub fn is_ending(&self) -> bool {
        self.state.phase == Phase::Exercise
            && (1..=ENDING_WINDOW_SECONDS).contains(&self.state.time_left_seconds)
    }

    /// Whether a tick source should currently be running
    pub fn wants_ticks(&self) -> bool {
        self.state.phase.is_running() && !self.state.paused
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn enter(&mut self, to: Phase, time_left: u32, events: &mut Vec<WorkoutEvent>) {
        let from = self.state.phase;
        self.state.phase = to;
        self.state.time_left_seconds = time_left;
        tracing::debug!(
            "Phase {} -> {} (exercise {}, {}s)",
            from,
            to,
            self.state.exercise_index,
            time_left
        );
        events.push(WorkoutEvent::PhaseChanged { from, to });
    }

    fn clear_abort(&mut self, events: &mut Vec<WorkoutEvent>) {
        if self.state.abort_confirm_pending {
            self.state.abort_confirm_pending = false;
            events.push(WorkoutEvent::AbortCancelled);
        }
    }

    /// Replace the timing configuration while no workout is running
    ///
    /// Returns false (and changes nothing) mid-workout.
    pub fn configure(&mut self, config: WorkoutConfig) -> bool {
        if self.state.phase.is_running() {
            return false;
        }
        self.config = config;
        true
    }

    pub fn start_setup(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if self.state.phase == Phase::Idle {
            let time_left = self.state.time_left_seconds;
            self.enter(Phase::Config, time_left, &mut events);
        }
        events
    }

    pub fn begin(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if self.state.phase != Phase::Config {
            return events;
        }
        self.state.exercise_index = 0;
        self.state.paused = false;
        self.state.abort_confirm_pending = false;
        let countdown = self.scaled(COUNTDOWN_SECONDS);
        self.enter(Phase::Countdown, countdown, &mut events);
        events
    }

    pub fn restart(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if self.state.phase == Phase::Finished {
            let time_left = self.state.time_left_seconds;
            self.enter(Phase::Config, time_left, &mut events);
        }
        events
    }

    /// Advance one second
    ///
    /// Ignored while paused or outside Countdown/Exercise/Break.
    pub fn tick(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if !self.wants_ticks() {
            return events;
        }

        let before = self.state.time_left_seconds;
        self.state.time_left_seconds = before.saturating_sub(1);
        let now = self.state.time_left_seconds;

        if now > 0 {
            if self.state.phase == Phase::Exercise {
                let half = self.halfway_mark();
                if before > half && now <= half {
                    events.push(WorkoutEvent::HalfwayReached {
                        index: self.state.exercise_index,
                    });
                }
                if now <= ENDING_WINDOW_SECONDS {
                    events.push(WorkoutEvent::FinalSeconds { time_left: now });
                }
            }
            return events;
        }

        match self.state.phase {
            Phase::Countdown => {
                let seconds = self.exercise_seconds();
                self.enter(Phase::Exercise, seconds, &mut events);
            }
            Phase::Exercise => {
                let index = self.state.exercise_index;
                if index + 1 >= self.plan_len {
                    self.enter(Phase::Finished, 0, &mut events);
                } else {
                    let seconds = self.break_seconds(index);
                    self.enter(Phase::Break, seconds, &mut events);
                }
            }
            Phase::Break => {
                self.state.exercise_index += 1;
                let seconds = self.exercise_seconds();
                self.enter(Phase::Exercise, seconds, &mut events);
                events.push(WorkoutEvent::ExerciseChanged {
                    index: self.state.exercise_index,
                });
            }
            Phase::Idle | Phase::Config | Phase::Finished => {}
        }
        events
    }

    fn jump_to(&mut self, index: usize, events: &mut Vec<WorkoutEvent>) {
        self.state.exercise_index = index;
        let seconds = self.exercise_seconds();
        if self.state.phase == Phase::Exercise {
            self.state.time_left_seconds = seconds;
        } else {
            self.enter(Phase::Exercise, seconds, events);
        }
        self.clear_abort(events);
        events.push(WorkoutEvent::ExerciseChanged { index });
    }

    /// Jump to the next exercise, skipping any remaining hold or rest
    pub fn skip_next(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        let phase_ok = matches!(self.state.phase, Phase::Exercise | Phase::Break);
        if phase_ok && self.state.exercise_index + 1 < self.plan_len {
            let index = self.state.exercise_index + 1;
            self.jump_to(index, &mut events);
        }
        events
    }

    /// Go back to the previous exercise and restart its hold
    pub fn skip_previous(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if self.state.phase.is_running() && self.state.exercise_index > 0 {
            let index = self.state.exercise_index - 1;
            self.jump_to(index, &mut events);
        }
        events
    }

    pub fn toggle_pause(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if !self.state.phase.is_running() {
            return events;
        }
        self.state.paused = !self.state.paused;
        self.clear_abort(&mut events);
        events.push(WorkoutEvent::PauseToggled {
            paused: self.state.paused,
        });
        events
    }

    /// Two-step abort: the first call arms, the second resets to Idle
    pub fn request_abort(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        if !self.state.phase.is_running() {
            return events;
        }
        if !self.state.abort_confirm_pending {
            self.state.abort_confirm_pending = true;
            events.push(WorkoutEvent::AbortArmed);
            return events;
        }

        let from = self.state.phase;
        self.state = idle_state();
        tracing::debug!("Workout aborted during {}", from);
        events.push(WorkoutEvent::Aborted);
        events.push(WorkoutEvent::PhaseChanged {
            from,
            to: Phase::Idle,
        });
        events
    }

    pub fn cancel_abort(&mut self) -> Vec<WorkoutEvent> {
        let mut events = Vec::new();
        self.clear_abort(&mut events);
        events
    }
}
