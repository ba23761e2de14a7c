//! Dedicated-background-thread engines.
//!
//! Work runs on its own thread with an explicit pause gate and a cooperative
//! cancellation flag, both polled at the same chunk granularity as the
//! cooperative engines. Any callback that must not run off the host's
//! primary thread is queued through the [`DispatchHandle`] instead of being
//! invoked in place.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mapsift_predict::WorkControl;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::level_source::LevelHandle;
use crate::loader::batch::{LoaderDeps, ResolveBatch};
use crate::loader::dispatch::DispatchHandle;
use crate::loader::{Cacher, CompleteCallback, Loader, ProgressCallback, persist_details};

/// How long a worker parks waiting for slow-path completions before
/// re-checking its control flags.
const WORKER_PARK: Duration = Duration::from_millis(25);

struct ThreadLoadRun {
    cancelled: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

pub struct ThreadLoader {
    deps: LoaderDeps,
    work_chunk: usize,
    query_chunk: usize,
    dispatch: DispatchHandle,
    current: Option<ThreadLoadRun>,
}

impl ThreadLoader {
    pub fn new(deps: LoaderDeps, config: &Config, dispatch: DispatchHandle) -> Self {
        Self {
            deps,
            work_chunk: config.work_chunk_size,
            query_chunk: config.work_query_chunk_size,
            dispatch,
            current: None,
        }
    }
}

impl Loader for ThreadLoader {
    fn load_beatmaps(
        &mut self,
        levels: Vec<LevelHandle>,
        on_progress: Option<ProgressCallback>,
        on_complete: CompleteCallback,
    ) {
        // Last request wins: flag the previous worker down. It exits at its
        // next chunk boundary without dispatching its completion callback.
        self.cancel();

        info!(levels = levels.len(), "starting threaded beatmap load");
        let cancelled = Arc::new(AtomicBool::new(false));
        let running = Arc::new(AtomicBool::new(true));
        self.current = Some(ThreadLoadRun {
            cancelled: Arc::clone(&cancelled),
            running: Arc::clone(&running),
        });

        let deps = self.deps.clone();
        let dispatch = self.dispatch.clone();
        let work_chunk = self.work_chunk;
        let query_chunk = self.query_chunk;
        let on_progress = Arc::new(Mutex::new(on_progress));

        std::thread::spawn(move || {
            let mut batch = ResolveBatch::new(levels, true);
            let mut last_reported = 0;

            loop {
                if cancelled.load(Ordering::Acquire) {
                    debug!("threaded load cancelled");
                    running.store(false, Ordering::Release);
                    return;
                }

                let done = batch.pump(&deps, work_chunk, query_chunk);

                let processed = batch.processed();
                if processed != last_reported {
                    last_reported = processed;
                    let total = batch.total();
                    let on_progress = Arc::clone(&on_progress);
                    dispatch.dispatch(move || {
                        if let Some(cb) = on_progress.lock().as_mut() {
                            cb(processed, total);
                        }
                    });
                }

                if done {
                    batch.tally.log_summary("load");
                    let results = batch.into_ordered_results();
                    info!(resolved = results.len(), "threaded beatmap load complete");
                    if !cancelled.load(Ordering::Acquire) {
                        dispatch.dispatch(move || on_complete(results));
                    }
                    running.store(false, Ordering::Release);
                    return;
                }

                if batch.is_drained() {
                    batch.wait_for_progress(WORKER_PARK);
                }
            }
        });
    }

    fn cancel(&mut self) {
        if let Some(run) = self.current.take() {
            run.cancelled.store(true, Ordering::Release);
        }
    }

    fn is_loading(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|run| run.running.load(Ordering::Acquire))
    }

    fn drive(&mut self) {
        // Work advances on the dedicated thread; nothing to do here. The
        // host still drains the dispatcher from its tick.
    }
}

pub struct ThreadCacher {
    deps: LoaderDeps,
    cache_path: PathBuf,
    work_chunk: usize,
    query_chunk: usize,
    control: Arc<WorkControl>,
    running: Arc<AtomicBool>,
}

impl ThreadCacher {
    pub fn new(deps: LoaderDeps, config: &Config) -> Self {
        Self {
            deps,
            cache_path: config.cache_path.clone(),
            work_chunk: config.work_chunk_size,
            query_chunk: config.work_query_chunk_size,
            control: Arc::new(WorkControl::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Cacher for ThreadCacher {
    fn start(&mut self) {
        if self.running.load(Ordering::Acquire) && !self.control.is_cancelled() {
            // Idempotent re-entry: resume the live worker.
            self.control.resume();
            return;
        }

        let control = Arc::new(WorkControl::new());
        self.control = Arc::clone(&control);
        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);

        let deps = self.deps.clone();
        let cache_path = self.cache_path.clone();
        let work_chunk = self.work_chunk;
        let query_chunk = self.query_chunk;

        std::thread::spawn(move || {
            let levels = deps.source.custom_levels();
            info!(levels = levels.len(), "starting threaded cache population");
            let mut batch = ResolveBatch::new(levels, false);

            loop {
                // Parks while paused; false means cancelled. A cancelled run
                // never touches the disk cache.
                if !control.wait_if_paused() {
                    debug!("threaded cache population cancelled");
                    running.store(false, Ordering::Release);
                    return;
                }

                if batch.pump(&deps, work_chunk, query_chunk) {
                    batch.tally.log_summary("cache");
                    info!(processed = batch.processed(), "threaded cache population complete");
                    persist_details(&deps, &cache_path);
                    running.store(false, Ordering::Release);
                    return;
                }

                if batch.is_drained() {
                    batch.wait_for_progress(WORKER_PARK);
                }
            }
        });
    }

    fn pause(&mut self) {
        self.control.pause();
    }

    fn cancel(&mut self) {
        self.control.cancel();
    }

    fn is_caching(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && !self.control.is_paused()
            && !self.control.is_cancelled()
    }

    fn drive(&mut self) {
        // Work advances on the dedicated thread.
    }
}
