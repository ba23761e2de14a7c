//! Chunked, cancellable beatmap resolution.
//!
//! Two public long-running operations — populating the details cache for the
//! whole custom library, and loading a caller-supplied subset — run behind
//! the [`Cacher`] and [`Loader`] traits. Each trait has two interchangeable
//! implementations honoring identical chunking, precedence, cancellation and
//! ordering contracts: a cooperative one driven from the host tick and a
//! dedicated-background-thread one with an explicit pause gate.

mod batch;
mod coroutine;
mod dispatch;
mod thread;

use std::path::Path;

use tracing::error;

use crate::details_cache::save_cache_file;
use crate::level_source::LevelHandle;
use crate::types::BeatmapDetails;

pub use batch::{LoaderDeps, ScanResolver, SlowResolver};
pub use coroutine::{CoroutineCacher, CoroutineLoader};
pub use dispatch::{DispatchHandle, MainThreadDispatcher};
pub use thread::{ThreadCacher, ThreadLoader};

/// `(processed, total)` — invoked on the host thread as a batch advances.
pub type ProgressCallback = Box<dyn FnMut(usize, usize) + Send>;

/// Receives the resolved records in the caller's original submission order.
/// Never invoked for a cancelled or superseded load.
pub type CompleteCallback = Box<dyn FnOnce(Vec<BeatmapDetails>) + Send>;

/// Walks the whole custom-content library, resolving and caching every
/// level, and persists the result on completion.
pub trait Cacher: Send {
    /// Starts a run, or resumes one that is paused. Idempotent.
    fn start(&mut self);
    fn pause(&mut self);
    /// Abandons the run without writing to disk.
    fn cancel(&mut self);
    fn is_caching(&self) -> bool;
    /// Cooperative implementations advance one chunk here; thread-backed
    /// ones no-op.
    fn drive(&mut self);
}

/// Resolves a caller-supplied subset of levels (e.g. the displayed list).
pub trait Loader: Send {
    /// Starts a load, superseding (cancelling) any in-flight one.
    fn load_beatmaps(
        &mut self,
        levels: Vec<LevelHandle>,
        on_progress: Option<ProgressCallback>,
        on_complete: CompleteCallback,
    );
    /// Cancels the in-flight load; its completion callback never fires.
    fn cancel(&mut self);
    fn is_loading(&self) -> bool;
    /// Cooperative implementations advance one chunk here; thread-backed
    /// ones no-op.
    fn drive(&mut self);
}

/// Synchronous fallback: cached and native results only, `None` for anything
/// that would need provider or slow-path work.
pub fn load_beatmaps_instant(
    levels: &[LevelHandle],
    cache: &crate::details_cache::DetailsCache,
) -> Vec<Option<BeatmapDetails>> {
    levels
        .iter()
        .map(|handle| match handle {
            LevelHandle::Native(data) => Some(data.into()),
            LevelHandle::Custom { level_id, .. } => cache.get_complete(level_id),
            LevelHandle::Unresolvable { .. } => None,
        })
        .collect()
}

/// Prune entries for content no longer on disk, then persist the remainder.
/// I/O failures are logged at this outermost boundary, never propagated into
/// the host.
pub fn persist_details(deps: &LoaderDeps, cache_path: &Path) {
    deps.cache.prune_missing(deps.source.as_ref());
    if let Err(e) = save_cache_file(cache_path, &deps.cache.snapshot()) {
        error!(error = %e, "failed to persist details cache");
    }
}
