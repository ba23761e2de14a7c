//! Read-only view of the host's level collections.
//!
//! The host exposes "preview" handles that are either fully resolved native
//! objects (built-in content), custom levels that still need resolution, or
//! unresolvable entries (e.g. unpurchased content). The loader never reaches
//! into host internals — everything it needs crosses this boundary.

use std::path::PathBuf;

use crate::types::{BeatmapDetails, DifficultyBeatmapSet, simplified_level_id};

/// Preview metadata the host shows before a level is resolved. Enough to
/// feed the search index and to label progress, nothing more.
#[derive(Debug, Clone, Default)]
pub struct LevelPreview {
    pub song_name: String,
    pub song_sub_name: String,
    pub song_author_name: String,
    pub level_author_name: String,
}

/// A fully resolved host-native level: carries everything needed to build
/// [`BeatmapDetails`] synchronously.
#[derive(Debug, Clone)]
pub struct NativeLevelData {
    pub level_id: String,
    pub song_name: String,
    pub song_sub_name: String,
    pub song_author_name: String,
    pub level_author_name: String,
    pub beats_per_minute: f32,
    pub song_duration: f32,
    pub difficulty_sets: Vec<DifficultyBeatmapSet>,
}

#[derive(Debug, Clone)]
pub enum LevelHandle {
    /// Host-resolved level; constructing details is cheap and synchronous.
    Native(NativeLevelData),
    /// Custom content that may need cache/provider/scan resolution.
    Custom {
        level_id: String,
        /// Directory containing the level's info and difficulty files.
        path: PathBuf,
        preview: LevelPreview,
    },
    /// Known to the host but not resolvable (e.g. unpurchased DLC).
    Unresolvable { level_id: String, reason: String },
}

impl LevelHandle {
    pub fn level_id(&self) -> &str {
        match self {
            LevelHandle::Native(data) => &data.level_id,
            LevelHandle::Custom { level_id, .. } => level_id,
            LevelHandle::Unresolvable { level_id, .. } => level_id,
        }
    }

    pub fn simplified_level_id(&self) -> &str {
        simplified_level_id(self.level_id())
    }
}

impl From<&NativeLevelData> for BeatmapDetails {
    fn from(data: &NativeLevelData) -> Self {
        BeatmapDetails {
            level_id: data.level_id.clone(),
            song_name: data.song_name.clone(),
            song_sub_name: data.song_sub_name.clone(),
            song_author_name: data.song_author_name.clone(),
            level_author_name: data.level_author_name.clone(),
            beats_per_minute: data.beats_per_minute,
            song_duration: data.song_duration,
            difficulty_sets: data.difficulty_sets.clone(),
        }
    }
}

/// Host collaborator supplying level handles and audio durations.
pub trait LevelSource: Send + Sync {
    /// Every custom level currently installed, as preview handles.
    fn custom_levels(&self) -> Vec<LevelHandle>;

    /// Duration of the level's audio clip in seconds, when the host has it.
    /// Audio decoding is host territory; the slow path only asks.
    fn song_duration_for(&self, level_id: &str) -> Option<f32>;

    /// Whether content for this (simplified) level id is still present on
    /// disk. Used to prune stale cache entries before persisting.
    fn level_exists(&self, simplified_id: &str) -> bool;
}
