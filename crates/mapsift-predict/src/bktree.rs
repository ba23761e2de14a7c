//! Metric tree for bounded fuzzy lookup.
//!
//! Every child edge is keyed by the Levenshtein distance between the child's
//! word and its parent's word, and every descendant along edge `d` sits at
//! exactly distance `d` from the parent. That invariant is what lets
//! [`BkTree::search`] prune whole subtrees with the triangle inequality.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::metrics::levenshtein_distance;

/// Default search tolerance when callers have no better bound.
pub const DEFAULT_TOLERANCE: usize = 2;

#[derive(Debug)]
struct BkNode {
    word: String,
    children: AHashMap<usize, BkNode>,
}

impl BkNode {
    fn new(word: &str) -> Self {
        Self {
            word: word.to_string(),
            children: AHashMap::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BkTree {
    root: Option<BkNode>,
}

impl BkTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_word(&mut self, word: &str) {
        let Some(root) = self.root.as_mut() else {
            self.root = Some(BkNode::new(word));
            return;
        };

        let mut node = root;
        loop {
            let distance = levenshtein_distance(&node.word, word);
            if distance == 0 {
                // Exact duplicate.
                return;
            }
            match node.children.entry(distance) {
                std::collections::hash_map::Entry::Occupied(entry) => {
                    node = entry.into_mut();
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(BkNode::new(word));
                    return;
                }
            }
        }
    }

    /// All stored words within `tolerance` edits of `word`, breadth-first.
    ///
    /// Children are only visited along edges in `[d - tolerance, d + tolerance]`
    /// where `d` is the distance from the queried word to the current node.
    pub fn search(&self, word: &str, tolerance: usize) -> Vec<String> {
        let Some(root) = self.root.as_ref() else {
            return Vec::new();
        };

        let mut results = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(root);

        while let Some(node) = queue.pop_front() {
            let distance = levenshtein_distance(&node.word, word);
            if distance <= tolerance {
                results.push(node.word.clone());
            }

            let lo = distance.saturating_sub(tolerance);
            let hi = distance + tolerance;
            for (edge, child) in &node.children {
                if (lo..=hi).contains(edge) {
                    queue.push_back(child);
                }
            }
        }

        results
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: &[&str] = &[
        "star", "stars", "start", "smart", "wars", "ward", "word", "sword", "theme", "them",
        "counting", "mountain",
    ];

    fn build() -> BkTree {
        let mut tree = BkTree::new();
        for word in WORDS {
            tree.add_word(word);
        }
        tree
    }

    /// The pruned search must return exactly the brute-force result set.
    #[test]
    fn search_matches_brute_force() {
        let tree = build();

        for query in ["star", "wrd", "theme", "count", "xyz"] {
            for tolerance in 0..=3 {
                let mut found = tree.search(query, tolerance);
                found.sort();

                let mut expected: Vec<String> = WORDS
                    .iter()
                    .filter(|w| levenshtein_distance(w, query) <= tolerance)
                    .map(|w| w.to_string())
                    .collect();
                expected.sort();

                assert_eq!(found, expected, "query {query:?} tolerance {tolerance}");
            }
        }
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let tree = BkTree::new();
        assert!(tree.search("star", 2).is_empty());
    }

    #[test]
    fn duplicate_words_are_ignored() {
        let mut tree = BkTree::new();
        tree.add_word("star");
        tree.add_word("star");
        let found = tree.search("star", 0);
        assert_eq!(found, ["star"]);
    }
}
