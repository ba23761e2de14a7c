//! Glue between the song collections and the word prediction engine.
//!
//! Owns the engine, converts [`BeatmapDetails`] into the text records the
//! index consumes and drives index builds in whichever style the host runs:
//! a bounded number of words per tick, or a dedicated build thread.

use mapsift_predict::{SongText, SuggestedWord, WordPredictionEngine};
use tracing::debug;

use crate::config::Config;
use crate::context::EngineKind;
use crate::types::BeatmapDetails;

pub struct SearchCoordinator {
    engine: WordPredictionEngine,
    word_chunk: usize,
    kind: EngineKind,
}

impl SearchCoordinator {
    pub fn new(config: &Config, kind: EngineKind) -> Self {
        Self {
            engine: WordPredictionEngine::new(),
            word_chunk: config.word_index_chunk_size,
            kind,
        }
    }

    /// Select the collection the user is browsing, reusing a cached index
    /// when one exists. Under the thread engine the build runs to completion
    /// on its own thread; under the cooperative engine it advances via
    /// [`SearchCoordinator::drive`].
    pub fn set_collection(&mut self, collection_id: &str, songs: &[BeatmapDetails]) {
        let texts: Vec<SongText> = songs.iter().map(BeatmapDetails::song_text).collect();
        let handle = self.engine.set_active_collection(collection_id, &texts);

        if self.kind == EngineKind::Thread && !handle.storage.lock().is_ready() {
            let storage = handle.storage;
            std::thread::spawn(move || {
                let ready = storage.lock().run();
                debug!(ready, "word index build thread finished");
            });
        }
    }

    /// Cooperative drive: advance the active build by the configured word
    /// budget. No-op under the thread engine.
    pub fn drive(&mut self) {
        if self.kind != EngineKind::Coroutine {
            return;
        }
        if let Some(handle) = self.engine.active_storage()
            && !handle.control.is_cancelled()
            && let Some(mut storage) = handle.storage.try_lock()
        {
            storage.advance(self.word_chunk);
        }
    }

    pub fn suggest(&self, query: &str) -> Vec<SuggestedWord> {
        self.engine.suggest(query)
    }

    /// De-prioritize indexing while the host is latency-sensitive (song
    /// playing, scene transition). Fans out to every cached storage.
    pub fn pause_indexing(&self) {
        self.engine.pause_all();
    }

    pub fn resume_indexing(&self) {
        self.engine.resume_all();
    }

    pub fn cancel_indexing(&self) {
        self.engine.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::named_song;

    fn songs() -> Vec<BeatmapDetails> {
        vec![
            named_song("a", "Counting Stars", "OneRepublic", "mapperone"),
            named_song("b", "Starlight", "Muse", "mapperone"),
            named_song("c", "Star Wars Theme", "John Williams", "mapptwo"),
        ]
    }

    #[test]
    fn cooperative_drive_builds_the_index() {
        let mut coordinator =
            SearchCoordinator::new(&Config::default(), EngineKind::Coroutine);
        coordinator.set_collection("all", &songs());

        assert!(coordinator.suggest("sta").is_empty(), "not built yet");

        // A handful of ticks is plenty for three songs.
        for _ in 0..50 {
            coordinator.drive();
        }

        let suggestions = coordinator.suggest("sta");
        assert!(!suggestions.is_empty());
        assert_eq!(suggestions[0].word, "star");
    }

    #[test]
    fn threaded_build_completes_on_its_own() {
        let mut coordinator = SearchCoordinator::new(&Config::default(), EngineKind::Thread);
        coordinator.set_collection("all", &songs());

        // Poll until the build thread finishes.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let suggestions = coordinator.suggest("sta");
            if !suggestions.is_empty() {
                assert_eq!(suggestions[0].word, "star");
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "index build did not finish in time"
            );
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }

    #[test]
    fn paused_indexing_makes_no_progress() {
        let mut coordinator =
            SearchCoordinator::new(&Config::default(), EngineKind::Coroutine);
        coordinator.set_collection("all", &songs());
        coordinator.pause_indexing();

        for _ in 0..50 {
            coordinator.drive();
        }
        assert!(coordinator.suggest("sta").is_empty());

        coordinator.resume_indexing();
        for _ in 0..50 {
            coordinator.drive();
        }
        assert!(!coordinator.suggest("sta").is_empty());
    }
}
