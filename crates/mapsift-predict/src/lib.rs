//! Word prediction engine for song library search
//!
//! Builds a frequency-ranked vocabulary from a song collection's text fields
//! and serves typed-query suggestions from four stages in priority order:
//! prefix matches (trie), bigram continuations, bounded-edit-distance fuzzy
//! matches (BK-tree) and a Jaro-Winkler similarity fallback.
//!
//! Index construction is incremental and cancellable: builds are driven a few
//! words at a time from the host tick, or to completion from a dedicated
//! thread, and both styles share one pause/resume/cancel token.
//!
//! # Examples
//!
//! ```
//! use mapsift_predict::{SongText, WordPredictionEngine};
//!
//! let songs = vec![
//!     SongText { song_name: "Counting Stars".into(), ..SongText::default() },
//!     SongText { song_name: "Starlight".into(), ..SongText::default() },
//! ];
//!
//! let mut engine = WordPredictionEngine::new();
//! let handle = engine.set_active_collection("all", &songs);
//! handle.storage.lock().advance(usize::MAX);
//!
//! let suggestions = engine.suggest("sta");
//! assert_eq!(suggestions[0].word, "starlight");
//! ```

pub mod bktree;
pub mod control;
pub mod metrics;
pub mod trie;
pub mod word_counts;

mod engine;

pub use bktree::{BkTree, DEFAULT_TOLERANCE};
pub use control::{WorkControl, WorkStep};
pub use engine::{
    FAVORITES_COLLECTION, FILTERED_COLLECTION, JARO_WINKLER_FLOOR, SUGGESTION_LIMIT, SharedStorage,
    StorageHandle, SuggestedWord, SuggestionSource, WordPredictionEngine,
};
pub use metrics::{jaro_winkler, levenshtein_distance};
pub use trie::Trie;
pub use word_counts::{SongText, WordCountStorage, normalize_tokens};
