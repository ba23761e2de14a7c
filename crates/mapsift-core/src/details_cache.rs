//! Volatile and persistent caches for resolved beatmap details.
//!
//! The in-memory cache is the single piece of truly shared mutable state in
//! the loader subsystem: one process-wide map from simplified level id to
//! details, written by slow-path workers and read by everyone. The on-disk
//! cache is a versioned JSON snapshot of the same records.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::level_source::LevelSource;
use crate::types::{BeatmapDetails, simplified_level_id};

/// Bumped whenever the persisted schema changes; older files force a rebuild.
pub const CACHE_VERSION: u32 = 2;

/// Process-wide concurrent map `simplified level id -> BeatmapDetails`.
/// Insert-or-update is last-write-wins per key; readers never observe torn
/// records (whole-value replacement under the write lock).
pub struct DetailsCache {
    entries: RwLock<AHashMap<String, BeatmapDetails>>,
    /// Entries with a duration below this are incomplete and eligible for
    /// overwrite; complete reads skip them.
    epsilon: f32,
}

impl DetailsCache {
    pub fn new(epsilon: f32) -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(AHashMap::new()),
            epsilon,
        })
    }

    /// Cached details regardless of completeness.
    pub fn get(&self, level_id: &str) -> Option<BeatmapDetails> {
        self.entries
            .read()
            .get(simplified_level_id(level_id))
            .cloned()
    }

    /// Cached details only when the record passed the completeness bar.
    pub fn get_complete(&self, level_id: &str) -> Option<BeatmapDetails> {
        self.entries
            .read()
            .get(simplified_level_id(level_id))
            .filter(|d| d.song_duration >= self.epsilon)
            .cloned()
    }

    pub fn insert(&self, details: BeatmapDetails) {
        let key = details.simplified_level_id().to_string();
        self.entries.write().insert(key, details);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Replace the whole map with records loaded from disk.
    pub fn replace_all(&self, records: Vec<BeatmapDetails>) {
        let mut entries = self.entries.write();
        entries.clear();
        for details in records {
            let key = details.simplified_level_id().to_string();
            entries.insert(key, details);
        }
    }

    /// Drop entries whose content is no longer present on disk. The existence
    /// checks run in parallel outside the write lock.
    pub fn prune_missing(&self, source: &dyn LevelSource) -> usize {
        let keys: Vec<String> = self.entries.read().keys().cloned().collect();
        let stale: Vec<String> = keys
            .into_par_iter()
            .filter(|key| !source.level_exists(key))
            .collect();

        if stale.is_empty() {
            return 0;
        }

        let mut entries = self.entries.write();
        for key in &stale {
            entries.remove(key);
        }
        debug!(pruned = stale.len(), "removed stale cache entries");
        stale.len()
    }

    /// Snapshot of every cached record, for persistence.
    pub fn snapshot(&self) -> Vec<BeatmapDetails> {
        self.entries.read().values().cloned().collect()
    }
}

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    cache: Vec<BeatmapDetails>,
}

/// Load the persisted cache. Missing file, outdated version and malformed
/// content are all recoverable: the result is simply an empty cache and the
/// caching run rebuilds from scratch.
pub fn load_cache_file(path: &Path) -> Vec<BeatmapDetails> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no details cache on disk");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read details cache");
            return Vec::new();
        }
    };

    let file: CacheFile = match serde_json::from_str(&raw) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "details cache is malformed, rebuilding");
            return Vec::new();
        }
    };

    if file.version < CACHE_VERSION {
        info!(
            found = file.version,
            expected = CACHE_VERSION,
            "details cache version is outdated, rebuilding"
        );
        return Vec::new();
    }

    info!(entries = file.cache.len(), "loaded details cache");
    file.cache
}

/// Persist a snapshot. The write is atomic from the caller's perspective:
/// a temp file in the same directory is renamed over the target, so a
/// cancelled run can never leave a torn cache behind.
pub fn save_cache_file(path: &Path, entries: &[BeatmapDetails]) -> Result<()> {
    let file = CacheFile {
        version: CACHE_VERSION,
        cache: entries.to_vec(),
    };
    let json = serde_json::to_string(&file).map_err(Error::CacheSerialize)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| Error::CacheWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|source| Error::CacheWrite {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| Error::CacheWrite {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), entries = entries.len(), "persisted details cache");
    Ok(())
}
