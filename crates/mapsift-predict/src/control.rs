//! Cooperative pause/resume/cancel token shared by long-running builds.
//!
//! A single [`WorkControl`] is polled at fine granularity (between individual
//! work steps) by both execution styles: cooperative drivers check
//! [`WorkControl::checkpoint`] and return to the host, dedicated threads block
//! in [`WorkControl::wait_if_paused`] until resumed or cancelled.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStep {
    /// Keep going.
    Continue,
    /// Paused — cooperative drivers should yield without consuming work.
    Paused,
    /// Cancelled — abandon the run.
    Cancelled,
}

#[derive(Debug, Default)]
pub struct WorkControl {
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl WorkControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        *self.paused.lock() = true;
    }

    pub fn resume(&self) {
        *self.paused.lock() = false;
        self.resumed.notify_all();
    }

    /// Cancellation is sticky; it also wakes any thread parked in
    /// [`WorkControl::wait_if_paused`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock()
    }

    /// Non-blocking check for cooperative drivers.
    pub fn checkpoint(&self) -> WorkStep {
        if self.is_cancelled() {
            WorkStep::Cancelled
        } else if self.is_paused() {
            WorkStep::Paused
        } else {
            WorkStep::Continue
        }
    }

    /// Blocking check for dedicated worker threads. Parks while paused;
    /// returns `false` once the run is cancelled.
    pub fn wait_if_paused(&self) -> bool {
        let mut paused = self.paused.lock();
        while *paused && !self.is_cancelled() {
            self.resumed.wait(&mut paused);
        }
        !self.is_cancelled()
    }
}
