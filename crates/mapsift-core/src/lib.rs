//! mapsift-core - song library filtering and background metadata caching
//!
//! This crate augments a host-managed song library browser with the pieces
//! the host cannot do cheaply itself:
//!
//! - a background loader that reconciles an on-disk JSON cache, an in-memory
//!   concurrent cache and an external metadata provider, streaming work in
//!   small chunks so the host stays responsive — with interchangeable
//!   cooperative and dedicated-thread execution engines
//! - a filter engine applying a dozen heterogeneous predicates through one
//!   shared staged/applied state machine, plus named quick-filter snapshots
//! - search glue over the `mapsift-predict` word prediction engine
//!
//! Everything host-specific (rendering, input, level data internals, audio)
//! stays behind the collaborator traits in [`level_source`], [`provider`]
//! and [`sources`].

pub mod config;
pub mod context;
pub mod details_cache;
pub mod error;
pub mod filter;
pub mod level_source;
pub mod loader;
pub mod provider;
pub mod scan;
pub mod search;
pub mod sources;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::Config;
pub use context::{EngineKind, LibraryContext};
pub use details_cache::{CACHE_VERSION, DetailsCache, load_cache_file, save_cache_file};
pub use error::{Error, Result};
pub use filter::{
    DifficultySelection, Filter, FilterList, FilterPolicy, FilterSettings, FilterStatus,
    FilterValues, QuickFilter, QuickFiltersManager, SongFilter,
};
pub use level_source::{LevelHandle, LevelPreview, LevelSource, NativeLevelData};
pub use loader::{
    Cacher, CompleteCallback, Loader, LoaderDeps, MainThreadDispatcher, ProgressCallback,
    load_beatmaps_instant,
};
pub use provider::{MetadataProvider, NoProvider, ProviderError, ProviderTally};
pub use search::SearchCoordinator;
pub use sources::{
    FilterCollaborators, ModInfoSource, ModRequirements, PlayHistorySource, RankedSource,
    VoteSource, VoteStatus,
};
pub use types::{
    BeatmapDetails, BeatmapDifficulty, CUSTOM_LEVEL_PREFIX, DifficultyBeatmap,
    DifficultyBeatmapSet, simplified_level_id,
};
