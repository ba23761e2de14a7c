//! Optional collaborators the filter predicates consult.
//!
//! Each of these is typically backed by another mod or a host service. A
//! filter whose collaborator is absent reports itself unavailable and passes
//! songs through unchanged; the rest of the filter set still applies.

use std::sync::Arc;

use crate::types::BeatmapDifficulty;

/// Ranked-play data (PP values and star ratings).
pub trait RankedSource: Send + Sync {
    /// Highest PP awarded across the level's ranked difficulties, or `None`
    /// when the level is unranked.
    fn max_pp(&self, level_id: &str) -> Option<f32>;

    /// Star ratings of the level's rated difficulties; empty when unrated.
    fn star_ratings(&self, level_id: &str) -> Vec<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStatus {
    Upvoted,
    Downvoted,
    NoVote,
}

pub trait VoteSource: Send + Sync {
    fn vote_for(&self, level_id: &str) -> VoteStatus;
}

/// Which gameplay-altering mods a level declares as requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModRequirements {
    pub mapping_extensions: bool,
    pub noodle_extensions: bool,
    pub chroma: bool,
}

pub trait ModInfoSource: Send + Sync {
    /// `None` when nothing is known about the level.
    fn requirements(&self, level_id: &str) -> Option<ModRequirements>;
}

/// The player's local play history.
pub trait PlayHistorySource: Send + Sync {
    fn has_completed(&self, level_id: &str, difficulty: BeatmapDifficulty) -> bool;
    fn has_full_combo(&self, level_id: &str, difficulty: BeatmapDifficulty) -> bool;
}

/// Bundle of optional collaborators, injected once at context construction.
#[derive(Clone, Default)]
pub struct FilterCollaborators {
    pub ranked: Option<Arc<dyn RankedSource>>,
    pub votes: Option<Arc<dyn VoteSource>>,
    pub mod_info: Option<Arc<dyn ModInfoSource>>,
    pub play_history: Option<Arc<dyn PlayHistorySource>>,
}
