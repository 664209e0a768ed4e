//! Wall-clock recording of plank holds.
//!
//! The recorder is independent of the countdown display: it measures real
//! elapsed time per hold, split by body side.

use crate::{PlankSegment, PlankSide, Session};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
struct OpenSegment {
    side: PlankSide,
    started_at: DateTime<Utc>,
}

pub struct SessionRecorder<C: Clock = SystemClock> {
    clock: C,
    session: Option<Session>,
    open: Option<OpenSegment>,
}

impl SessionRecorder<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SessionRecorder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionRecorder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            session: None,
            open: None,
        }
    }

    /// Begin a new session, discarding any unfinished one
    pub fn start_session(&mut self) {
        if let Some(previous) = self.session.take() {
            tracing::warn!(
                "Discarding unfinished session {} ({} segments)",
                previous.id,
                previous.segments.len()
            );
        }
        self.open = None;

        let session = Session {
            id: Uuid::new_v4(),
            started_at: self.clock.now(),
            segments: Vec::new(),
        };
        tracing::info!("Started session {}", session.id);
        self.session = Some(session);
    }

    /// Mark the start of a hold
    ///
    /// An already open hold is replaced without being recorded.
    pub fn start_segment(&mut self, side: PlankSide) {
        self.open = Some(OpenSegment {
            side,
            started_at: self.clock.now(),
        });
    }

    /// Close the open hold and append it to the session
    ///
    /// Does nothing without a session and an open hold.
    pub fn end_segment(&mut self) {
        let (Some(session), Some(open)) = (self.session.as_mut(), self.open) else {
            return;
        };

        let elapsed = self.clock.now() - open.started_at;
        let duration_ms = u64::try_from(elapsed.num_milliseconds()).unwrap_or(0);
        session.segments.push(PlankSegment {
            side: open.side,
            duration_ms,
        });
        self.open = None;
        tracing::debug!("Recorded {:?} hold of {}ms", open.side, duration_ms);
    }

    /// Close any open hold and hand over the finished session
    ///
    /// Returns None if no session was started. The recorder is empty
    /// afterwards.
    pub fn end_session(&mut self) -> Option<Session> {
        self.end_segment();
        self.open = None;
        let session = self.session.take()?;
        tracing::info!(
            "Ended session {} with {} segments",
            session.id,
            session.segments.len()
        );
        Some(session)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Side of the hold in progress, if any
    pub fn open_side(&self) -> Option<PlankSide> {
        self.session.as_ref().and(self.open).map(|o| o.side)
    }

    /// Segments recorded so far in the current session
    pub fn segments(&self) -> &[PlankSegment] {
        self.session
            .as_ref()
            .map(|s| s.segments.as_slice())
            .unwrap_or(&[])
    }
}
