//! Frequency-ranked word store built incrementally from a song collection.
//!
//! The build is a cancellable unit of long-running work: it is driven either
//! cooperatively ([`WordCountStorage::advance`], a bounded number of steps per
//! host tick) or by a dedicated thread ([`WordCountStorage::run`]). Both
//! styles check the shared [`WorkControl`] between individual steps, so
//! cancellation latency is bounded by a single word-processing step.

use std::collections::VecDeque;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::bktree::BkTree;
use crate::control::{WorkControl, WorkStep};
use crate::trie::Trie;

/// Tokens at or below this length carry no search signal and are discarded.
const MIN_TOKEN_LEN: usize = 3;

/// ASCII keep-table for normalization: `[a-zA-Z0-9 ']`.
static KEEP_TABLE: Lazy<[bool; 128]> = Lazy::new(|| {
    let mut table = [false; 128];
    for b in 0u8..128 {
        table[b as usize] = b.is_ascii_alphanumeric() || b == b' ' || b == b'\'';
    }
    table
});

/// The text fields of one song that feed the word index.
#[derive(Debug, Clone, Default)]
pub struct SongText {
    pub song_name: String,
    pub song_sub_name: String,
    pub song_author_name: String,
    pub level_author_name: String,
}

/// Lowercase, strip characters outside `[a-zA-Z0-9 ']`, split on spaces and
/// drop short tokens.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars() {
        let ch = ch.to_ascii_lowercase();
        if (ch as u32) < 128 && KEEP_TABLE[ch as usize] {
            cleaned.push(ch);
        }
    }

    cleaned
        .split(' ')
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

#[derive(Debug)]
enum BuildPhase {
    /// Consuming songs one at a time, collecting occurrences and bigrams.
    Tokenize(VecDeque<SongText>),
    /// Order the occurrence list by descending length so prefix seeding sees
    /// every longer extension first.
    Sort,
    /// Inserting occurrences into the trie/BK-tree, one word per step.
    Insert(VecDeque<String>),
    Done,
}

pub struct WordCountStorage {
    trie: Trie,
    bktree: BkTree,
    counts: AHashMap<String, u32>,
    follow_ups: AHashMap<String, AHashMap<String, u32>>,
    occurrences: Vec<String>,
    seen_mappers: AHashSet<String>,
    phase: BuildPhase,
    control: Arc<WorkControl>,
    ready: bool,
}

impl WordCountStorage {
    pub fn new(songs: Vec<SongText>) -> Self {
        Self {
            trie: Trie::new(),
            bktree: BkTree::new(),
            counts: AHashMap::new(),
            follow_ups: AHashMap::new(),
            occurrences: Vec::new(),
            seen_mappers: AHashSet::new(),
            phase: BuildPhase::Tokenize(songs.into()),
            control: Arc::new(WorkControl::new()),
            ready: false,
        }
    }

    /// Shared pause/resume/cancel token for this build.
    pub fn control(&self) -> &Arc<WorkControl> {
        &self.control
    }

    /// True only after the whole corpus has been consumed without
    /// cancellation.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Cooperative drive: perform up to `budget` build steps, yielding early
    /// when paused or cancelled. Returns true once the build is complete.
    pub fn advance(&mut self, budget: usize) -> bool {
        for _ in 0..budget {
            match self.control.checkpoint() {
                WorkStep::Continue => {}
                WorkStep::Paused | WorkStep::Cancelled => return false,
            }
            if self.step() {
                return true;
            }
        }
        self.ready
    }

    /// Blocking drive for a dedicated worker thread: parks while paused,
    /// returns false when cancelled mid-build.
    pub fn run(&mut self) -> bool {
        loop {
            if !self.control.wait_if_paused() {
                return false;
            }
            if self.step() {
                return true;
            }
        }
    }

    /// One build step. Returns true when the build has finished.
    fn step(&mut self) -> bool {
        match &mut self.phase {
            BuildPhase::Tokenize(songs) => {
                let next = songs.pop_front();
                match next {
                    Some(song) => self.consume_song(&song),
                    None => self.phase = BuildPhase::Sort,
                }
                false
            }
            BuildPhase::Sort => {
                // Stable sort keeps corpus order within a length class.
                self.occurrences.sort_by_key(|w| std::cmp::Reverse(w.len()));
                let queue: VecDeque<String> = std::mem::take(&mut self.occurrences).into();
                debug!(words = queue.len(), "word occurrence list sorted");
                self.phase = BuildPhase::Insert(queue);
                false
            }
            BuildPhase::Insert(queue) => {
                let next = queue.pop_front();
                match next {
                    Some(word) => {
                        self.insert_word(word);
                        false
                    }
                    None => {
                        self.phase = BuildPhase::Done;
                        self.ready = true;
                        debug!(vocabulary = self.counts.len(), "word count storage ready");
                        true
                    }
                }
            }
            BuildPhase::Done => true,
        }
    }

    fn consume_song(&mut self, song: &SongText) {
        for field in [&song.song_name, &song.song_sub_name, &song.song_author_name] {
            let tokens = normalize_tokens(field);
            self.record_follow_ups(&tokens);
            self.occurrences.extend(tokens);
        }

        // A prolific mapper would otherwise dominate the frequency ranking,
        // so each mapper token is only counted the first time it appears.
        let mapper_tokens = normalize_tokens(&song.level_author_name);
        self.record_follow_ups(&mapper_tokens);
        for token in mapper_tokens {
            if self.seen_mappers.insert(token.clone()) {
                self.occurrences.push(token);
            }
        }
    }

    fn record_follow_ups(&mut self, tokens: &[String]) {
        for pair in tokens.windows(2) {
            *self
                .follow_ups
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_default() += 1;
        }
    }

    /// Insert one occurrence. A first-seen word seeds its count from the
    /// summed counts of all longer stored words that extend it, so a generic
    /// root word inherits the popularity of its extensions; repeats just
    /// increment.
    fn insert_word(&mut self, word: String) {
        if let Some(count) = self.counts.get_mut(&word) {
            *count += 1;
            return;
        }

        let seed: u32 = self
            .trie
            .starts_with(&word)
            .iter()
            .map(|longer| self.counts.get(longer).copied().unwrap_or(0))
            .sum();

        self.trie.add_word(&word);
        self.bktree.add_word(&word);
        self.counts.insert(word, seed + 1);
    }

    /// Stored words extending `prefix`, best count first.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<(String, u32)> {
        let mut matches: Vec<(String, u32)> = self
            .trie
            .starts_with(prefix)
            .into_iter()
            .map(|word| {
                let count = self.counts.get(&word).copied().unwrap_or(0);
                (word, count)
            })
            .collect();
        sort_ranked(&mut matches);
        matches
    }

    /// Bigram continuations of `word`, best count first.
    pub fn follow_ups_of(&self, word: &str) -> Vec<(String, u32)> {
        let Some(continuations) = self.follow_ups.get(word) else {
            return Vec::new();
        };
        let mut matches: Vec<(String, u32)> = continuations
            .iter()
            .map(|(w, c)| (w.clone(), *c))
            .collect();
        sort_ranked(&mut matches);
        matches
    }

    /// Stored words within `tolerance` edits of `word`, best count first.
    pub fn fuzzy_matches(&self, word: &str, tolerance: usize) -> Vec<(String, u32)> {
        let mut matches: Vec<(String, u32)> = self
            .bktree
            .search(word, tolerance)
            .into_iter()
            .map(|w| {
                let count = self.counts.get(&w).copied().unwrap_or(0);
                (w, count)
            })
            .collect();
        sort_ranked(&mut matches);
        matches
    }

    pub fn count_of(&self, word: &str) -> u32 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Full vocabulary with counts, in arbitrary order.
    pub fn vocabulary(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

fn sort_ranked(matches: &mut [(String, u32)]) {
    matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(name: &str, mapper: &str) -> SongText {
        SongText {
            song_name: name.to_string(),
            level_author_name: mapper.to_string(),
            ..SongText::default()
        }
    }

    fn build(songs: Vec<SongText>) -> WordCountStorage {
        let mut storage = WordCountStorage::new(songs);
        assert!(storage.advance(usize::MAX));
        assert!(storage.is_ready());
        storage
    }

    #[test]
    fn normalization_strips_and_splits() {
        assert_eq!(
            normalize_tokens("Counting Stars (feat. X)!"),
            ["counting", "stars", "feat"]
        );
        // Length-2 tokens are discarded, apostrophes survive.
        assert_eq!(normalize_tokens("it's on my way"), ["it's", "way"]);
    }

    #[test]
    fn prefix_seeding_inherits_longer_word_counts() {
        let storage = build(vec![
            song("Starlight", ""),
            song("Stars", ""),
            song("Star", ""),
        ]);

        // Insertion order is starlight, stars, star. "starlight" and "stars"
        // seed at 1; "star" inherits both and adds its own occurrence.
        assert_eq!(storage.count_of("starlight"), 1);
        assert_eq!(storage.count_of("stars"), 1);
        assert_eq!(storage.count_of("star"), 3);
    }

    #[test]
    fn repeated_occurrences_increment_directly() {
        let storage = build(vec![song("Stars", ""), song("Stars Align", "")]);
        assert_eq!(storage.count_of("stars"), 2);
        assert_eq!(storage.count_of("align"), 1);
    }

    #[test]
    fn mapper_names_are_counted_once() {
        let storage = build(vec![
            song("First Song", "greatmapper"),
            song("Second Song", "greatmapper"),
        ]);
        assert_eq!(storage.count_of("greatmapper"), 1);
        // Ordinary fields are not deduplicated.
        assert_eq!(storage.count_of("song"), 2);
    }

    #[test]
    fn follow_ups_capture_adjacent_tokens() {
        let storage = build(vec![song("Counting Stars", ""), song("Counting Sheep", "")]);

        let continuations = storage.follow_ups_of("counting");
        assert_eq!(continuations.len(), 2);
        assert!(continuations.contains(&("stars".to_string(), 1)));
        assert!(continuations.contains(&("sheep".to_string(), 1)));
        assert!(storage.follow_ups_of("stars").is_empty());
    }

    #[test]
    fn pause_stops_cooperative_progress() {
        let mut storage = WordCountStorage::new(vec![song("Counting Stars", "")]);
        storage.control().pause();
        assert!(!storage.advance(usize::MAX));
        assert!(!storage.is_ready());

        storage.control().resume();
        assert!(storage.advance(usize::MAX));
        assert!(storage.is_ready());
    }

    #[test]
    fn cancelled_build_never_becomes_ready() {
        let mut storage = WordCountStorage::new(vec![song("Counting Stars", "")]);
        storage.control().cancel();
        assert!(!storage.advance(usize::MAX));
        assert!(!storage.is_ready());
    }

    #[test]
    fn blocking_run_completes() {
        let mut storage = WordCountStorage::new(vec![song("Counting Stars", "")]);
        assert!(storage.run());
        assert!(storage.is_ready());
        assert_eq!(storage.count_of("counting"), 1);
    }

    #[test]
    fn prefix_lookup_ranks_by_count() {
        let storage = build(vec![
            song("Starlight", ""),
            song("Stars", ""),
            song("Star", ""),
        ]);

        let ranked = storage.words_with_prefix("sta");
        let words: Vec<&str> = ranked.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, ["star", "starlight", "stars"]);
    }
}
