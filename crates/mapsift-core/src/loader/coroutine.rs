//! Cooperative engines for single-threaded host event loops.
//!
//! The host calls `drive()` once per tick; each call advances the current
//! batch by at most one pump (bounded by the configured chunk sizes) and runs
//! callbacks in place, on the host's own thread.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::loader::batch::{LoaderDeps, ResolveBatch};
use crate::loader::{Cacher, CompleteCallback, Loader, ProgressCallback, persist_details};

struct LoadRun {
    batch: ResolveBatch,
    on_progress: Option<ProgressCallback>,
    on_complete: Option<CompleteCallback>,
    last_reported: usize,
}

pub struct CoroutineLoader {
    deps: LoaderDeps,
    work_chunk: usize,
    query_chunk: usize,
    current: Option<LoadRun>,
}

impl CoroutineLoader {
    pub fn new(deps: LoaderDeps, config: &Config) -> Self {
        Self {
            deps,
            work_chunk: config.work_chunk_size,
            query_chunk: config.work_query_chunk_size,
            current: None,
        }
    }
}

impl Loader for CoroutineLoader {
    fn load_beatmaps(
        &mut self,
        levels: Vec<crate::level_source::LevelHandle>,
        on_progress: Option<ProgressCallback>,
        on_complete: CompleteCallback,
    ) {
        if self.current.is_some() {
            // Last request wins; the superseded run's callbacks never fire.
            debug!("superseding in-flight load");
        }
        info!(levels = levels.len(), "starting beatmap load");
        self.current = Some(LoadRun {
            batch: ResolveBatch::new(levels, true),
            on_progress,
            on_complete: Some(on_complete),
            last_reported: 0,
        });
    }

    fn cancel(&mut self) {
        if self.current.take().is_some() {
            info!("load cancelled");
        }
    }

    fn is_loading(&self) -> bool {
        self.current.is_some()
    }

    fn drive(&mut self) {
        let Some(run) = self.current.as_mut() else {
            return;
        };

        let done = run.batch.pump(&self.deps, self.work_chunk, self.query_chunk);

        let processed = run.batch.processed();
        if processed != run.last_reported {
            run.last_reported = processed;
            let total = run.batch.total();
            if let Some(cb) = run.on_progress.as_mut() {
                cb(processed, total);
            }
        }

        if done {
            let mut run = self.current.take().expect("current run present");
            run.batch.tally.log_summary("load");
            let results = run.batch.into_ordered_results();
            info!(resolved = results.len(), "beatmap load complete");
            if let Some(on_complete) = run.on_complete.take() {
                on_complete(results);
            }
        }
    }
}

pub struct CoroutineCacher {
    deps: LoaderDeps,
    cache_path: PathBuf,
    work_chunk: usize,
    query_chunk: usize,
    batch: Option<ResolveBatch>,
    paused: bool,
}

impl CoroutineCacher {
    pub fn new(deps: LoaderDeps, config: &Config) -> Self {
        Self {
            deps,
            cache_path: config.cache_path.clone(),
            work_chunk: config.work_chunk_size,
            query_chunk: config.work_query_chunk_size,
            batch: None,
            paused: false,
        }
    }
}

impl Cacher for CoroutineCacher {
    fn start(&mut self) {
        if self.batch.is_some() {
            // Idempotent re-entry: an existing run resumes.
            self.paused = false;
            return;
        }
        let levels = self.deps.source.custom_levels();
        info!(levels = levels.len(), "starting cache population");
        self.batch = Some(ResolveBatch::new(levels, false));
        self.paused = false;
    }

    fn pause(&mut self) {
        if self.batch.is_some() {
            self.paused = true;
        }
    }

    fn cancel(&mut self) {
        // No disk write on cancellation; the cache file only ever sees a
        // fully-resolved batch.
        if self.batch.take().is_some() {
            info!("cache population cancelled");
        }
    }

    fn is_caching(&self) -> bool {
        self.batch.is_some() && !self.paused
    }

    fn drive(&mut self) {
        if self.paused {
            return;
        }
        let Some(batch) = self.batch.as_mut() else {
            return;
        };

        if batch.pump(&self.deps, self.work_chunk, self.query_chunk) {
            let batch = self.batch.take().expect("current batch present");
            batch.tally.log_summary("cache");
            info!(processed = batch.processed(), "cache population complete");
            persist_details(&self.deps, &self.cache_path);
        }
    }
}
