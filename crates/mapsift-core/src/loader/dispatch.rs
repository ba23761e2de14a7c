//! Main-thread callback hop for the thread-backed engines.
//!
//! Callbacks that touch host-owned state must not run on a worker thread.
//! Workers enqueue closures through a [`DispatchHandle`]; the host drains the
//! queue from its own tick via [`MainThreadDispatcher::drain`]. A bounded-
//! latency hop, never a blocking call.

use std::sync::mpsc::{Receiver, Sender, channel};

type Job = Box<dyn FnOnce() + Send>;

pub struct MainThreadDispatcher {
    tx: Sender<Job>,
    rx: Receiver<Job>,
}

/// Cloneable producer side, handed to worker threads.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: Sender<Job>,
}

impl DispatchHandle {
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        // A closed queue means the host is tearing down; dropping the
        // callback is the correct behaviour then.
        let _ = self.tx.send(Box::new(job));
    }
}

impl MainThreadDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run every queued callback on the calling thread. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

impl Default for MainThreadDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn jobs_run_only_on_drain() {
        let dispatcher = MainThreadDispatcher::new();
        let handle = dispatcher.handle();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            handle.dispatch(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.drain(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(dispatcher.drain(), 0);
    }

    #[test]
    fn dispatch_from_worker_thread() {
        let dispatcher = MainThreadDispatcher::new();
        let handle = dispatcher.handle();
        let counter = Arc::new(AtomicUsize::new(0));

        let worker = {
            let counter = Arc::clone(&counter);
            std::thread::spawn(move || {
                handle.dispatch(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            })
        };
        worker.join().unwrap();

        assert_eq!(dispatcher.drain(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
