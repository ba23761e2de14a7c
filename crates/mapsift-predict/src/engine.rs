//! Per-collection suggestion cache and ranked suggestion merging.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::control::WorkControl;
use crate::metrics::jaro_winkler;
use crate::word_counts::{SongText, WordCountStorage};

/// Suggestions returned per query, across all stages.
pub const SUGGESTION_LIMIT: usize = 10;

/// Minimum Jaro-Winkler similarity for the last-resort suggestion stage.
pub const JARO_WINKLER_FLOOR: f32 = 0.7;

/// Pseudo-collection ids whose storages are never cached: their contents
/// change with every filter edit or favorite toggle.
pub const FILTERED_COLLECTION: &str = "filtered";
pub const FAVORITES_COLLECTION: &str = "favorites";

/// Which stage produced a suggestion. Stages are listed in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Prefix,
    FollowUp,
    Fuzzy,
    Similarity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedWord {
    pub word: String,
    pub count: u32,
    pub source: SuggestionSource,
}

pub type SharedStorage = Arc<Mutex<WordCountStorage>>;

/// A storage plus its control token. The control is carried separately so
/// pause/resume/cancel never have to contend for the storage lock — a
/// dedicated build thread holds that lock for the whole build.
#[derive(Clone)]
pub struct StorageHandle {
    pub storage: SharedStorage,
    pub control: Arc<WorkControl>,
}

/// Strips the transient view suffix (`"!sorted"`, `"!reversed"`, ...) so that
/// re-sorted views of one underlying collection share a storage.
fn cache_key(collection_id: &str) -> &str {
    collection_id
        .split_once('!')
        .map_or(collection_id, |(key, _)| key)
}

fn is_volatile(collection_id: &str) -> bool {
    matches!(cache_key(collection_id), FILTERED_COLLECTION | FAVORITES_COLLECTION)
}

/// Maintains one active [`WordCountStorage`] plus a cache of storages keyed by
/// collection identity, and merges the suggestion stages for a typed query.
#[derive(Default)]
pub struct WordPredictionEngine {
    storages: AHashMap<String, StorageHandle>,
    active: Option<StorageHandle>,
}

impl WordPredictionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects (building if necessary) the storage for `collection_id` and
    /// returns its handle so the caller can drive the build. Storages for
    /// volatile pseudo-collections are never retained in the cache.
    pub fn set_active_collection(
        &mut self,
        collection_id: &str,
        songs: &[SongText],
    ) -> StorageHandle {
        let key = cache_key(collection_id);

        if let Some(existing) = self.storages.get(key) {
            debug!(collection = key, "reusing cached word count storage");
            let handle = existing.clone();
            self.active = Some(handle.clone());
            return handle;
        }

        info!(
            collection = key,
            songs = songs.len(),
            volatile = is_volatile(collection_id),
            "building word count storage"
        );
        let storage = WordCountStorage::new(songs.to_vec());
        let handle = StorageHandle {
            control: Arc::clone(storage.control()),
            storage: Arc::new(Mutex::new(storage)),
        };
        if !is_volatile(collection_id) {
            self.storages.insert(key.to_string(), handle.clone());
        }
        self.active = Some(handle.clone());
        handle
    }

    pub fn active_storage(&self) -> Option<StorageHandle> {
        self.active.clone()
    }

    /// De-prioritize all background builds (host entering a latency-sensitive
    /// state). Fans out to every cached storage plus the active one.
    pub fn pause_all(&self) {
        self.for_each_control(WorkControl::pause);
    }

    pub fn resume_all(&self) {
        self.for_each_control(WorkControl::resume);
    }

    pub fn cancel_all(&self) {
        self.for_each_control(WorkControl::cancel);
    }

    fn for_each_control(&self, f: impl Fn(&WorkControl)) {
        for handle in self.storages.values() {
            f(&handle.control);
        }
        if let Some(active) = &self.active {
            // The active storage may be an uncached volatile one.
            let cached = self
                .storages
                .values()
                .any(|h| Arc::ptr_eq(&h.storage, &active.storage));
            if !cached {
                f(&active.control);
            }
        }
    }

    /// Ranked suggestions for the word currently being typed, merged from the
    /// four stages in strict priority order up to [`SUGGESTION_LIMIT`]. Later
    /// stages only contribute words no earlier stage already produced.
    pub fn suggest(&self, query: &str) -> Vec<SuggestedWord> {
        let Some(active) = &self.active else {
            return Vec::new();
        };
        // A held lock means a dedicated thread is mid-build; the storage
        // would not be ready anyway.
        let Some(storage) = active.storage.try_lock() else {
            return Vec::new();
        };
        if !storage.is_ready() {
            return Vec::new();
        }

        let (partial, preceding) = split_query(query);
        if partial.is_empty() && preceding.is_none() {
            return Vec::new();
        }

        let mut suggestions: Vec<SuggestedWord> = Vec::new();
        fn push_stage(
            suggestions: &mut Vec<SuggestedWord>,
            ranked: Vec<(String, u32)>,
            source: SuggestionSource,
        ) {
            for (word, count) in ranked {
                if suggestions.len() >= SUGGESTION_LIMIT {
                    return;
                }
                if suggestions.iter().any(|s| s.word == word) {
                    continue;
                }
                suggestions.push(SuggestedWord { word, count, source });
            }
        }

        if !partial.is_empty() {
            push_stage(
                &mut suggestions,
                storage.words_with_prefix(&partial),
                SuggestionSource::Prefix,
            );
        }

        if let Some(prev) = &preceding {
            let continuations = storage
                .follow_ups_of(prev)
                .into_iter()
                .filter(|(word, _)| word.starts_with(&partial))
                .collect();
            push_stage(&mut suggestions, continuations, SuggestionSource::FollowUp);
        }

        if !partial.is_empty() {
            let tolerance = fuzzy_tolerance(partial.len());
            push_stage(
                &mut suggestions,
                storage.fuzzy_matches(&partial, tolerance),
                SuggestionSource::Fuzzy,
            );
        }

        if !partial.is_empty() && suggestions.len() < SUGGESTION_LIMIT {
            push_stage(
                &mut suggestions,
                similarity_ranked(&storage, &partial),
                SuggestionSource::Similarity,
            );
        }

        suggestions
    }
}

/// Tolerance grows with the typed fragment but is capped at 2 edits.
fn fuzzy_tolerance(len: usize) -> usize {
    ((0.7 * len as f32).round() as usize).min(2)
}

/// Splits a raw query into the partial last token and the completed word
/// preceding it. A trailing space means the last token is itself complete, so
/// it becomes the preceding word and the partial fragment is empty.
fn split_query(query: &str) -> (String, Option<String>) {
    let mut cleaned = String::with_capacity(query.len());
    for ch in query.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == ' ' || ch == '\'' {
            cleaned.push(ch);
        }
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.is_empty() {
        return (String::new(), None);
    }

    if cleaned.ends_with(' ') {
        (String::new(), Some(tokens[tokens.len() - 1].to_string()))
    } else {
        let partial = tokens[tokens.len() - 1].to_string();
        let preceding = (tokens.len() >= 2).then(|| tokens[tokens.len() - 2].to_string());
        (partial, preceding)
    }
}

/// Last-resort stage: rank the whole vocabulary by Jaro-Winkler similarity to
/// the typed fragment, keeping everything above [`JARO_WINKLER_FLOOR`].
fn similarity_ranked(storage: &WordCountStorage, partial: &str) -> Vec<(String, u32)> {
    let mut scored: Vec<(String, u32, f32)> = storage
        .vocabulary()
        .filter_map(|(word, count)| {
            let similarity = jaro_winkler(partial, word);
            (similarity >= JARO_WINKLER_FLOOR).then(|| (word.to_string(), count, similarity))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.cmp(&a.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    scored.into_iter().map(|(w, c, _)| (w, c)).collect()
}
