//! Process-wide ownership of the mapsift subsystems.
//!
//! One [`LibraryContext`] is constructed at host startup and passed to
//! consumers — there are no global singletons. Teardown is explicit and tied
//! to host lifecycle events: it cancels background work and persists the
//! details cache.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::Config;
use crate::details_cache::{DetailsCache, load_cache_file};
use crate::filter::{FilterList, QuickFiltersManager, SlotStore};
use crate::level_source::{LevelHandle, LevelSource};
use crate::loader::{
    Cacher, CompleteCallback, CoroutineCacher, CoroutineLoader, Loader, LoaderDeps,
    MainThreadDispatcher, ProgressCallback, ScanResolver, ThreadCacher, ThreadLoader,
    load_beatmaps_instant, persist_details,
};
use crate::provider::MetadataProvider;
use crate::search::SearchCoordinator;
use crate::sources::FilterCollaborators;
use crate::types::BeatmapDetails;

/// Which execution strategy backs the loader, cacher and index builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Chunked work driven from the host tick; suited to a single-threaded
    /// host event loop.
    Coroutine,
    /// Dedicated background threads with a main-thread callback hop.
    Thread,
}

pub struct LibraryContext {
    config: Config,
    details: Arc<DetailsCache>,
    deps: LoaderDeps,
    dispatcher: MainThreadDispatcher,
    loader: Box<dyn Loader>,
    cacher: Arc<Mutex<Box<dyn Cacher>>>,
    pub filters: FilterList,
    pub quick_filters: QuickFiltersManager,
    pub search: SearchCoordinator,
}

impl LibraryContext {
    pub fn new(
        config: Config,
        source: Arc<dyn LevelSource>,
        provider: Arc<dyn MetadataProvider>,
        collaborators: FilterCollaborators,
        slot_store: Box<dyn SlotStore>,
        kind: EngineKind,
    ) -> Self {
        let details = DetailsCache::new(config.incomplete_duration_epsilon);
        details.replace_all(load_cache_file(&config.cache_path));

        let deps = LoaderDeps {
            cache: Arc::clone(&details),
            provider,
            source: Arc::clone(&source),
            slow: Arc::new(ScanResolver::new(source)),
        };

        let dispatcher = MainThreadDispatcher::new();
        let (loader, cacher): (Box<dyn Loader>, Box<dyn Cacher>) = match kind {
            EngineKind::Coroutine => (
                Box::new(CoroutineLoader::new(deps.clone(), &config)),
                Box::new(CoroutineCacher::new(deps.clone(), &config)),
            ),
            EngineKind::Thread => (
                Box::new(ThreadLoader::new(deps.clone(), &config, dispatcher.handle())),
                Box::new(ThreadCacher::new(deps.clone(), &config)),
            ),
        };

        info!(?kind, cached = details.len(), "library context initialized");

        Self {
            filters: FilterList::with_defaults(&collaborators),
            quick_filters: QuickFiltersManager::new(slot_store, config.quick_filter_slots),
            search: SearchCoordinator::new(&config, kind),
            details,
            deps,
            dispatcher,
            loader,
            cacher: Arc::new(Mutex::new(cacher)),
            config,
        }
    }

    /// One host tick: advance cooperative work and run queued callbacks.
    pub fn tick(&mut self) {
        self.loader.drive();
        self.cacher.lock().drive();
        self.search.drive();
        self.dispatcher.drain();
    }

    pub fn details_cache(&self) -> &Arc<DetailsCache> {
        &self.details
    }

    pub fn start_populating_cache(&self) {
        self.cacher.lock().start();
    }

    pub fn pause_caching(&self) {
        self.cacher.lock().pause();
    }

    pub fn cancel_caching(&self) {
        self.cacher.lock().cancel();
    }

    pub fn is_caching(&self) -> bool {
        self.cacher.lock().is_caching()
    }

    /// Resolve the given levels, superseding any in-flight load. The caching
    /// run is paused for the duration and started (or resumed) again once the
    /// load completes or is cancelled.
    pub fn load_beatmaps(
        &mut self,
        levels: Vec<LevelHandle>,
        on_progress: Option<ProgressCallback>,
        on_complete: CompleteCallback,
    ) {
        self.cacher.lock().pause();

        let cacher = Arc::clone(&self.cacher);
        let wrapped: CompleteCallback = Box::new(move |details| {
            on_complete(details);
            cacher.lock().start();
        });

        self.loader.load_beatmaps(levels, on_progress, wrapped);
    }

    pub fn cancel_loading(&mut self) {
        self.loader.cancel();
        self.cacher.lock().start();
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Cache/native results only; never blocks on provider or slow-path
    /// work.
    pub fn load_beatmaps_instant(&self, levels: &[LevelHandle]) -> Vec<Option<BeatmapDetails>> {
        load_beatmaps_instant(levels, &self.details)
    }

    /// Run the applied filter set over a song list, in place.
    pub fn apply_filters(&self, songs: &mut Vec<BeatmapDetails>) {
        self.filters.apply_filters(songs);
    }

    /// Snapshot the currently applied filters into a named quick filter.
    pub fn save_quick_filter(&mut self, name: &str) -> crate::error::Result<usize> {
        let snapshot = self.filters.applied_snapshot();
        self.quick_filters.save(name, snapshot)
    }

    /// Stage and apply the quick filter in `slot`, if present.
    pub fn apply_quick_filter(&mut self, slot: usize) -> bool {
        let Some(Some(quick_filter)) = self.quick_filters.slots().get(slot).cloned() else {
            return false;
        };
        self.filters.load_quick_filter(&quick_filter);
        true
    }

    /// Host shutdown: cancel background work, run remaining callbacks and
    /// persist the details cache (graceful pause-then-quit persistence).
    pub fn teardown(&mut self) {
        info!("tearing down library context");
        self.loader.cancel();
        self.cacher.lock().cancel();
        self.search.cancel_indexing();
        self.dispatcher.drain();
        persist_details(&self.deps, &self.config.cache_path);
    }
}
