//! Shared chunked-resolution state machine.
//!
//! Both execution engines drive the same [`ResolveBatch`]: the cooperative
//! engine pumps it once per host tick, the thread engine pumps it in a loop
//! with pause/cancel checks in between. Each pump is bounded twice — by how
//! many slow-path resolutions it may start and by how many items it may
//! examine — so a single tick is never dominated by either starting too much
//! work or scanning too far ahead of outstanding slow tasks.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;

use tracing::{debug, warn};

use crate::details_cache::DetailsCache;
use crate::level_source::{LevelHandle, LevelSource};
use crate::provider::{MetadataProvider, ProviderTally};
use crate::scan::scan_level;
use crate::types::BeatmapDetails;

/// Everything a resolution needs, cheaply cloneable into worker closures.
pub struct LoaderDeps {
    pub cache: Arc<DetailsCache>,
    pub provider: Arc<dyn MetadataProvider>,
    pub source: Arc<dyn LevelSource>,
    pub slow: Arc<dyn SlowResolver>,
}

impl Clone for LoaderDeps {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            provider: Arc::clone(&self.provider),
            source: Arc::clone(&self.source),
            slow: Arc::clone(&self.slow),
        }
    }
}

/// The expensive resolution path. Runs on a worker thread and may block.
/// Pluggable so tests can simulate variable-latency resolutions.
pub trait SlowResolver: Send + Sync {
    fn resolve(&self, handle: &LevelHandle) -> Option<BeatmapDetails>;
}

/// Production slow path: scan the level's files, asking the host for the
/// audio duration.
pub struct ScanResolver {
    source: Arc<dyn LevelSource>,
}

impl ScanResolver {
    pub fn new(source: Arc<dyn LevelSource>) -> Self {
        Self { source }
    }
}

impl SlowResolver for ScanResolver {
    fn resolve(&self, handle: &LevelHandle) -> Option<BeatmapDetails> {
        let LevelHandle::Custom { level_id, path, .. } = handle else {
            return None;
        };
        let duration = self.source.song_duration_for(level_id).unwrap_or(0.0);
        match scan_level(level_id, path, duration) {
            Ok(details) => Some(details),
            Err(e) => {
                warn!(level_id, error = %e, "slow-path scan failed");
                None
            }
        }
    }
}

enum FastResolution {
    Ready(BeatmapDetails),
    NeedsSlow,
    Skip,
}

/// Resolution precedence shared by loading and caching: native construction,
/// then complete cache hit, then external provider (gated on the NJS
/// completeness heuristic), and only then the slow path.
fn resolve_fast(handle: &LevelHandle, deps: &LoaderDeps, tally: &ProviderTally) -> FastResolution {
    match handle {
        LevelHandle::Native(data) => FastResolution::Ready(data.into()),
        LevelHandle::Unresolvable { level_id, reason } => {
            debug!(level_id, reason, "skipping unresolvable level");
            FastResolution::Skip
        }
        LevelHandle::Custom { level_id, .. } => {
            if let Some(details) = deps.cache.get_complete(level_id) {
                return FastResolution::Ready(details);
            }

            match deps.provider.fetch(handle) {
                Ok(details) if !details.has_incomplete_njs() => {
                    deps.cache.insert(details.clone());
                    FastResolution::Ready(details)
                }
                Ok(_) => {
                    tally.record_incomplete();
                    FastResolution::NeedsSlow
                }
                Err(status) => {
                    tally.record_error(status);
                    FastResolution::NeedsSlow
                }
            }
        }
    }
}

pub(crate) struct ResolveBatch {
    queue: VecDeque<(usize, LevelHandle)>,
    pending: usize,
    processed: usize,
    total: usize,
    results: Vec<(usize, BeatmapDetails)>,
    collect_results: bool,
    tx: Sender<(usize, Option<BeatmapDetails>)>,
    rx: Receiver<(usize, Option<BeatmapDetails>)>,
    pub(crate) tally: Arc<ProviderTally>,
}

impl ResolveBatch {
    /// `collect_results` is false for caching runs, which only care about the
    /// shared cache side effect.
    pub(crate) fn new(levels: Vec<LevelHandle>, collect_results: bool) -> Self {
        let (tx, rx) = channel();
        let total = levels.len();
        Self {
            queue: levels.into_iter().enumerate().collect(),
            pending: 0,
            processed: 0,
            total,
            results: Vec::new(),
            collect_results,
            tx,
            rx,
            tally: Arc::new(ProviderTally::new()),
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed
    }

    pub(crate) fn is_done(&self) -> bool {
        self.queue.is_empty() && self.pending == 0
    }

    /// True once every queued item has been examined; remaining work is
    /// outstanding slow-path resolutions.
    pub(crate) fn is_drained(&self) -> bool {
        self.queue.is_empty()
    }

    /// One bounded unit of work: harvest finished slow resolutions, then
    /// examine up to `query_chunk` items, starting at most `work_chunk`
    /// slow-path resolutions. Returns true when the batch is complete.
    pub(crate) fn pump(&mut self, deps: &LoaderDeps, work_chunk: usize, query_chunk: usize) -> bool {
        self.harvest();

        let mut examined = 0;
        let mut started = 0;
        while examined < query_chunk && started < work_chunk {
            let Some((index, handle)) = self.queue.pop_front() else {
                break;
            };
            examined += 1;

            match resolve_fast(&handle, deps, &self.tally) {
                FastResolution::Ready(details) => {
                    self.processed += 1;
                    if self.collect_results {
                        self.results.push((index, details));
                    }
                }
                FastResolution::Skip => {
                    self.processed += 1;
                }
                FastResolution::NeedsSlow => {
                    started += 1;
                    self.pending += 1;
                    let tx = self.tx.clone();
                    let slow = Arc::clone(&deps.slow);
                    let cache = Arc::clone(&deps.cache);
                    rayon::spawn(move || {
                        let resolved = slow.resolve(&handle);
                        if let Some(details) = &resolved {
                            // Publish immediately so concurrent and later
                            // loads observe the resolution (read-your-writes).
                            cache.insert(details.clone());
                        }
                        // The batch may be gone (superseded load) — fine.
                        let _ = tx.send((index, resolved));
                    });
                }
            }
        }

        self.harvest();
        self.is_done()
    }

    /// Thread engines park here instead of busy-polling when all items have
    /// been examined but slow resolutions are still in flight.
    pub(crate) fn wait_for_progress(&mut self, timeout: Duration) {
        if self.pending == 0 {
            return;
        }
        if let Ok(message) = self.rx.recv_timeout(timeout) {
            self.accept(message);
            self.harvest();
        }
    }

    fn harvest(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.accept(message);
        }
    }

    fn accept(&mut self, (index, resolved): (usize, Option<BeatmapDetails>)) {
        self.pending -= 1;
        self.processed += 1;
        if let Some(details) = resolved
            && self.collect_results
        {
            self.results.push((index, details));
        }
    }

    /// Results in the caller's original submission order, regardless of
    /// completion order.
    pub(crate) fn into_ordered_results(mut self) -> Vec<BeatmapDetails> {
        self.results.sort_by_key(|(index, _)| *index);
        self.results.into_iter().map(|(_, details)| details).collect()
    }
}
