//! Periodic tick source for a running workout.
//!
//! A [`Ticker`] owns at most one background thread. Each started source gets
//! a new generation number that is stamped on its ticks, so the consumer can
//! drop any tick that was already in flight when its source was cancelled.

use crate::engine::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct TickSource {
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
pub struct Ticker {
    active: Option<TickSource>,
    generation: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sending `Command::Tick` every `interval`
    ///
    /// Any previous source is cancelled first. Returns the new generation.
    pub fn start(&mut self, interval: Duration, tx: Sender<Command>) -> u64 {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let cancelled = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&cancelled);
        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(Command::Tick { generation }).is_err() {
                break;
            }
        });

        tracing::debug!("Started tick source {} ({:?})", generation, interval);
        self.active = Some(TickSource {
            generation,
            cancelled,
        });
        generation
    }

    /// Cancel the running source, if any
    ///
    /// Does not wait for the thread; it exits at its next wake-up.
    pub fn stop(&mut self) {
        if let Some(source) = self.active.take() {
            source.cancelled.store(true, Ordering::SeqCst);
            tracing::debug!("Stopped tick source {}", source.generation);
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a tick stamped with `generation` comes from the live source
    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|source| source.generation == generation)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
