//! Workout engine joining the phase machine, recorder and feedback.
//!
//! The engine is the single owner of workout state. Ticks and user actions
//! arrive as [`Command`]s and each one runs to completion:
//! machine transition → feedback cues → hold bookkeeping → summary.
//!
//! A hold is open exactly while an exercise is running unpaused. Mirrorable
//! exercises are recorded as the left side until the halfway point and the
//! right side after it; all others are recorded as front holds.

use crate::config::WorkoutSettings;
use crate::feedback::{FeedbackDispatcher, FeedbackSink};
use crate::machine::{PhaseStateMachine, WorkoutEvent};
use crate::recorder::{Clock, SessionRecorder, SystemClock};
use crate::ticker::Ticker;
use crate::{
    compute_session_summary, config_from_level, Phase, PlankSide, Preferences, Result, Session,
    SessionSummary, TimerState, WorkoutPlan,
};
use chrono::Utc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;
use uuid::Uuid;

/// Requests a user can make from the control surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserAction {
    StartSetup,
    Begin,
    TogglePause,
    SkipNext,
    SkipPrevious,
    RequestAbort,
    CancelAbort,
    Restart,
}

/// Everything the engine's event queue carries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Tick { generation: u64 },
    Action(UserAction),
    Shutdown,
}

/// How a call to [`WorkoutRunner::run`] ended
#[derive(Clone, Debug, PartialEq)]
pub enum WorkoutOutcome {
    Completed {
        session: Session,
        summary: SessionSummary,
    },
    Aborted,
    /// Every sender went away, or `Command::Shutdown` arrived
    Disconnected,
}

pub struct WorkoutRunner<S: FeedbackSink, C: Clock = SystemClock> {
    machine: PhaseStateMachine,
    recorder: SessionRecorder<C>,
    feedback: FeedbackDispatcher<S>,
    plan: WorkoutPlan,
    preferences: Preferences,
    hold: Option<(usize, PlankSide)>,
    ticker: Ticker,
    tick_interval: Duration,
    completed: Option<(Session, SessionSummary)>,
}

impl<S: FeedbackSink> WorkoutRunner<S, SystemClock> {
    pub fn new(
        plan: WorkoutPlan,
        settings: &WorkoutSettings,
        preferences: Preferences,
        sink: S,
    ) -> Result<Self> {
        Self::with_clock(plan, settings, preferences, sink, SystemClock)
    }
}

impl<S: FeedbackSink, C: Clock> WorkoutRunner<S, C> {
    pub fn with_clock(
        plan: WorkoutPlan,
        settings: &WorkoutSettings,
        preferences: Preferences,
        sink: S,
        clock: C,
    ) -> Result<Self> {
        let config = config_from_level(settings.level)?;
        let machine = PhaseStateMachine::new(config, plan.len(), settings.time_scale)?;
        let feedback = FeedbackDispatcher::new(sink, &preferences);

        Ok(Self {
            machine,
            recorder: SessionRecorder::with_clock(clock),
            feedback,
            plan,
            preferences,
            hold: None,
            ticker: Ticker::new(),
            tick_interval: Duration::from_millis(settings.tick_interval_ms.max(1)),
            completed: None,
        })
    }

    pub fn machine(&self) -> &PhaseStateMachine {
        &self.machine
    }

    pub fn state(&self) -> TimerState {
        self.machine.state()
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn recorder(&self) -> &SessionRecorder<C> {
        &self.recorder
    }

    pub fn feedback(&self) -> &FeedbackDispatcher<S> {
        &self.feedback
    }

    /// Session and summary of the most recently finished workout
    pub fn completed(&self) -> Option<&(Session, SessionSummary)> {
        self.completed.as_ref()
    }

    /// Change difficulty between workouts
    ///
    /// Returns Ok(false) if a workout is running.
    pub fn select_level(&mut self, level: u8) -> Result<bool> {
        let config = config_from_level(level)?;
        Ok(self.machine.configure(config))
    }

    /// Execute one queued command
    ///
    /// Ticks from a cancelled source are dropped.
    pub fn handle(&mut self, command: Command) -> Vec<WorkoutEvent> {
        match command {
            Command::Tick { generation } if self.ticker.is_current(generation) => self.tick(),
            Command::Tick { generation } => {
                tracing::debug!("Dropping stale tick from source {}", generation);
                Vec::new()
            }
            Command::Action(action) => self.act(action),
            Command::Shutdown => Vec::new(),
        }
    }

    /// Advance the workout by one second
    pub fn tick(&mut self) -> Vec<WorkoutEvent> {
        let events = self.machine.tick();
        self.settle(events)
    }

    pub fn act(&mut self, action: UserAction) -> Vec<WorkoutEvent> {
        tracing::debug!("User action {:?}", action);
        let events = match action {
            UserAction::StartSetup => self.machine.start_setup(),
            UserAction::Begin => self.machine.begin(),
            UserAction::TogglePause => self.machine.toggle_pause(),
            UserAction::SkipNext => self.machine.skip_next(),
            UserAction::SkipPrevious => self.machine.skip_previous(),
            UserAction::RequestAbort => self.machine.request_abort(),
            UserAction::CancelAbort => self.machine.cancel_abort(),
            UserAction::Restart => self.machine.restart(),
        };
        self.settle(events)
    }

    fn settle(&mut self, events: Vec<WorkoutEvent>) -> Vec<WorkoutEvent> {
        for event in &events {
            self.feedback.notify(event);
            if let WorkoutEvent::PhaseChanged {
                to: Phase::Countdown,
                ..
            } = event
            {
                self.completed = None;
                self.recorder.start_session();
            }
        }

        self.sync_hold();

        for event in &events {
            match event {
                WorkoutEvent::PhaseChanged {
                    to: Phase::Finished,
                    ..
                } => self.finish(),
                WorkoutEvent::Aborted => {
                    if let Some(session) = self.recorder.end_session() {
                        tracing::info!(
                            "Discarded session {} after abort ({} segments)",
                            session.id,
                            session.segments.len()
                        );
                    }
                }
                _ => {}
            }
        }
        events
    }

    fn desired_hold(&self) -> Option<(usize, PlankSide)> {
        let state = self.machine.state();
        if state.phase != Phase::Exercise || state.paused {
            return None;
        }
        let index = state.exercise_index;
        let mirrored = self.plan.get(index).is_some_and(|e| e.can_mirror);
        let side = match (mirrored, self.machine.is_past_halfway()) {
            (false, _) => PlankSide::Front,
            (true, false) => PlankSide::Left,
            (true, true) => PlankSide::Right,
        };
        Some((index, side))
    }

    /// Open or close holds so the recorder matches the machine
    fn sync_hold(&mut self) {
        let desired = self.desired_hold();
        if desired == self.hold {
            return;
        }
        if self.hold.is_some() {
            self.recorder.end_segment();
        }
        if let Some((_, side)) = desired {
            self.recorder.start_segment(side);
        }
        self.hold = desired;
    }

    fn finish(&mut self) {
        let session = self.recorder.end_session().unwrap_or_else(|| {
            tracing::warn!("Workout finished without a recorded session");
            Session {
                id: Uuid::new_v4(),
                started_at: Utc::now(),
                segments: Vec::new(),
            }
        });
        let summary = compute_session_summary(&session, &self.preferences);
        tracing::info!(
            "Workout finished: {}ms held, longest {}ms, {} kcal",
            summary.total_plank_ms,
            summary.longest_hold_ms,
            summary.calories
        );
        self.completed = Some((session, summary));
    }

    fn sync_ticker(&mut self, tx: &Sender<Command>) {
        match (self.machine.wants_ticks(), self.ticker.is_running()) {
            (true, false) => {
                self.ticker.start(self.tick_interval, tx.clone());
            }
            (false, true) => self.ticker.stop(),
            _ => {}
        }
    }

    /// Run the scheduling loop until the workout finishes or is aborted
    ///
    /// `tx` must feed `commands`; the tick source sends through it. After
    /// every command `on_update` sees the engine and the events produced.
    pub fn run<F>(
        &mut self,
        commands: &Receiver<Command>,
        tx: &Sender<Command>,
        mut on_update: F,
    ) -> WorkoutOutcome
    where
        F: FnMut(&Self, &[WorkoutEvent]),
    {
        self.sync_ticker(tx);
        loop {
            let command = match commands.recv() {
                Ok(Command::Shutdown) | Err(_) => {
                    self.ticker.stop();
                    return WorkoutOutcome::Disconnected;
                }
                Ok(command) => command,
            };

            let events = self.handle(command);
            self.sync_ticker(tx);
            if !events.is_empty() || matches!(command, Command::Tick { .. }) {
                on_update(&*self, &events);
            }

            if events.contains(&WorkoutEvent::Aborted) {
                self.ticker.stop();
                return WorkoutOutcome::Aborted;
            }
            if self.machine.phase() == Phase::Finished {
                if let Some((session, summary)) = self.completed.clone() {
                    self.ticker.stop();
                    return WorkoutOutcome::Completed { session, summary };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_default_plan;
    use crate::feedback::tests::{Played, RecordingSink};
    use crate::feedback::{Sound, VibrationPattern};
    use crate::recorder::tests::ManualClock;
    use crate::PlankSegment;
    use std::sync::mpsc::channel;

    type TestRunner = WorkoutRunner<RecordingSink, ManualClock>;

    fn settings(level: u8, time_scale: f64) -> WorkoutSettings {
        WorkoutSettings {
            level,
            time_scale,
            tick_interval_ms: 1,
        }
    }

    fn all_feedback() -> Preferences {
        Preferences {
            sound: true,
            vibration: true,
            ..Preferences::default()
        }
    }

    fn runner() -> (TestRunner, ManualClock) {
        crate::logging::init_test();
        let clock = ManualClock::new();
        let runner = WorkoutRunner::with_clock(
            build_default_plan(),
            &settings(2, 1.0),
            all_feedback(),
            RecordingSink::default(),
            clock.clone(),
        )
        .unwrap();
        (runner, clock)
    }

    fn started() -> (TestRunner, ManualClock) {
        let (mut r, clock) = runner();
        r.act(UserAction::StartSetup);
        r.act(UserAction::Begin);
        (r, clock)
    }

    /// One real second passes per tick
    fn seconds(r: &mut TestRunner, clock: &ManualClock, n: u32) {
        for _ in 0..n {
            clock.advance_ms(1_000);
            r.tick();
        }
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let result = WorkoutRunner::new(
            build_default_plan(),
            &settings(7, 1.0),
            Preferences::default(),
            RecordingSink::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_full_workout_records_sides() {
        let (mut r, clock) = started();
        assert!(r.recorder().has_session());

        let mut guard = 0;
        while r.state().phase != Phase::Finished {
            seconds(&mut r, &clock, 1);
            guard += 1;
            assert!(guard < 1_000);
        }

        let (session, summary) = r.completed().cloned().unwrap();
        assert_eq!(session.segments.len(), 13);

        let front = PlankSegment {
            side: PlankSide::Front,
            duration_ms: 45_000,
        };
        assert_eq!(session.segments[0], front);
        // Single Leg Plank is the fourth exercise
        assert_eq!(
            &session.segments[3..5],
            &[
                PlankSegment {
                    side: PlankSide::Left,
                    duration_ms: 22_000
                },
                PlankSegment {
                    side: PlankSide::Right,
                    duration_ms: 23_000
                },
            ]
        );

        assert_eq!(summary.total_plank_ms, 450_000);
        assert_eq!(summary.longest_hold_ms, 45_000);
        assert_eq!(summary.calories, 29);
        assert!(!r.recorder().has_session());
    }

    #[test]
    fn test_feedback_sequence() {
        let (mut r, clock) = started();
        while r.state().phase != Phase::Finished {
            seconds(&mut r, &clock, 1);
        }

        let played = &r.feedback().sink().played;
        assert_eq!(played[0], Played::Sound(Sound::Play));
        assert_eq!(played[1], Played::Vibration(VibrationPattern::Pulse(100)));

        let final_pulses = played
            .iter()
            .filter(|p| **p == Played::Vibration(VibrationPattern::Pulse(40)))
            .count();
        assert_eq!(final_pulses, 50);

        let n = played.len();
        assert_eq!(played[n - 2], Played::Sound(Sound::Success));
        assert_eq!(
            played[n - 1],
            Played::Vibration(VibrationPattern::Sequence(vec![100, 50, 100]))
        );
    }

    #[test]
    fn test_pause_splits_hold_and_excludes_paused_time() {
        let (mut r, clock) = started();
        seconds(&mut r, &clock, 10 + 5);

        r.act(UserAction::TogglePause);
        assert_eq!(r.recorder().open_side(), None);
        assert_eq!(r.recorder().segments()[0].duration_ms, 5_000);

        // Ticks while paused change nothing
        seconds(&mut r, &clock, 30);
        assert_eq!(r.state().time_left_seconds, 40);

        r.act(UserAction::TogglePause);
        assert_eq!(r.recorder().open_side(), Some(PlankSide::Front));
        seconds(&mut r, &clock, 3);
        r.act(UserAction::SkipNext);

        let segments = r.recorder().segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].duration_ms, 3_000);
    }

    #[test]
    fn test_no_hold_during_countdown_or_break() {
        let (mut r, clock) = started();
        seconds(&mut r, &clock, 5);
        assert_eq!(r.recorder().open_side(), None);

        seconds(&mut r, &clock, 5 + 45);
        assert_eq!(r.state().phase, Phase::Break);
        assert_eq!(r.recorder().open_side(), None);
        assert_eq!(r.recorder().segments().len(), 1);
    }

    #[test]
    fn test_skip_mid_hold_records_partial_segment() {
        let (mut r, clock) = started();
        seconds(&mut r, &clock, 10 + 12);
        r.act(UserAction::SkipNext);
        assert_eq!(r.recorder().segments()[0].duration_ms, 12_000);
        assert_eq!(r.recorder().open_side(), Some(PlankSide::Front));
        assert_eq!(r.state().exercise_index, 1);
    }

    #[test]
    fn test_abort_discards_session() {
        let (mut r, clock) = started();
        seconds(&mut r, &clock, 20);

        let events = r.act(UserAction::RequestAbort);
        assert_eq!(events, vec![WorkoutEvent::AbortArmed]);
        assert!(r.recorder().has_session());

        let events = r.act(UserAction::RequestAbort);
        assert!(events.contains(&WorkoutEvent::Aborted));
        assert_eq!(r.state().phase, Phase::Idle);
        assert!(!r.recorder().has_session());
        assert!(r.completed().is_none());
    }

    #[test]
    fn test_stale_ticks_are_dropped() {
        let (mut r, _clock) = started();
        let before = r.state();
        assert!(r.handle(Command::Tick { generation: 42 }).is_empty());
        assert_eq!(r.state(), before);
    }

    #[test]
    fn test_select_level_between_workouts() {
        let (mut r, _clock) = runner();
        assert!(r.select_level(4).unwrap());
        assert!(r.select_level(9).is_err());
        r.act(UserAction::StartSetup);
        r.act(UserAction::Begin);
        assert!(!r.select_level(0).unwrap());
        assert_eq!(r.machine().config().exercise_duration, 70);
    }

    #[test]
    fn test_run_completes_with_real_ticks() {
        let mut r = WorkoutRunner::new(
            build_default_plan(),
            &settings(0, 0.1),
            Preferences::default(),
            RecordingSink::default(),
        )
        .unwrap();

        let (tx, rx) = channel();
        tx.send(Command::Action(UserAction::StartSetup)).unwrap();
        tx.send(Command::Action(UserAction::Begin)).unwrap();

        let mut updates = 0;
        let outcome = r.run(&rx, &tx, |_, _| updates += 1);

        match outcome {
            WorkoutOutcome::Completed { session, summary } => {
                assert_eq!(session.segments.len(), 13);
                assert_eq!(
                    summary.total_plank_ms,
                    session.segments.iter().map(|s| s.duration_ms).sum::<u64>()
                );
            }
            other => panic!("expected completion, got {:?}", other),
        }
        // 1s countdown, ten 4s holds, eight 2s breaks and one 7s break
        assert!(updates >= 64);
        assert_eq!(r.state().phase, Phase::Finished);
    }

    #[test]
    fn test_run_returns_on_abort() {
        let mut r = WorkoutRunner::new(
            build_default_plan(),
            &settings(2, 1.0),
            Preferences::default(),
            RecordingSink::default(),
        )
        .unwrap();

        let (tx, rx) = channel();
        for action in [
            UserAction::StartSetup,
            UserAction::Begin,
            UserAction::RequestAbort,
            UserAction::RequestAbort,
        ] {
            tx.send(Command::Action(action)).unwrap();
        }

        assert_eq!(r.run(&rx, &tx, |_, _| {}), WorkoutOutcome::Aborted);
        assert_eq!(r.state().phase, Phase::Idle);
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let (mut r, _clock) = runner();
        let (tx, rx) = channel();
        tx.send(Command::Action(UserAction::StartSetup)).unwrap();
        tx.send(Command::Shutdown).unwrap();
        assert_eq!(r.run(&rx, &tx, |_, _| {}), WorkoutOutcome::Disconnected);
        assert_eq!(r.state().phase, Phase::Config);
    }
}
