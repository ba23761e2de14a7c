//! Canonical beatmap metadata records.
//!
//! A [`BeatmapDetails`] is constructed once per distinct level — from host
//! level data, from the cache, from the external metadata provider or by
//! scanning the level's files — and never mutated afterwards. Re-caching
//! supersedes the record instead of editing it.

use std::fmt;
use std::str::FromStr;

use mapsift_predict::SongText;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Level ids with this prefix denote user-provided content; anything else is
/// built-in.
pub const CUSTOM_LEVEL_PREFIX: &str = "custom_level_";

/// Length of the content hash embedded in a custom level id.
const CUSTOM_LEVEL_HASH_LEN: usize = 40;

/// The fixed difficulty ladder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BeatmapDifficulty {
    Easy,
    Normal,
    Hard,
    Expert,
    ExpertPlus,
}

impl BeatmapDifficulty {
    pub const ALL: [BeatmapDifficulty; 5] = [
        BeatmapDifficulty::Easy,
        BeatmapDifficulty::Normal,
        BeatmapDifficulty::Hard,
        BeatmapDifficulty::Expert,
        BeatmapDifficulty::ExpertPlus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BeatmapDifficulty::Easy => "Easy",
            BeatmapDifficulty::Normal => "Normal",
            BeatmapDifficulty::Hard => "Hard",
            BeatmapDifficulty::Expert => "Expert",
            BeatmapDifficulty::ExpertPlus => "ExpertPlus",
        }
    }
}

impl fmt::Display for BeatmapDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeatmapDifficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(BeatmapDifficulty::Easy),
            "Normal" => Ok(BeatmapDifficulty::Normal),
            "Hard" => Ok(BeatmapDifficulty::Hard),
            "Expert" => Ok(BeatmapDifficulty::Expert),
            "ExpertPlus" => Ok(BeatmapDifficulty::ExpertPlus),
            other => Err(Error::UnknownDifficulty(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBeatmap {
    pub difficulty: BeatmapDifficulty,
    /// 0 signals unknown/incomplete data, not an actual speed.
    pub note_jump_speed: f32,
    pub notes_count: u32,
    pub bombs_count: u32,
    pub obstacles_count: u32,
    pub spawn_rotation_events_count: u32,
}

impl DifficultyBeatmap {
    /// A difficulty with zero notes exists purely for visual effect and must
    /// be invisible to difficulty-based filters.
    pub fn is_lightshow(&self) -> bool {
        self.notes_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBeatmapSet {
    pub characteristic_name: String,
    pub beatmaps: Vec<DifficultyBeatmap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatmapDetails {
    pub level_id: String,
    pub song_name: String,
    #[serde(default)]
    pub song_sub_name: String,
    #[serde(default)]
    pub song_author_name: String,
    #[serde(default)]
    pub level_author_name: String,
    pub beats_per_minute: f32,
    /// Seconds. Near-zero means the record is incomplete.
    pub song_duration: f32,
    pub difficulty_sets: Vec<DifficultyBeatmapSet>,
}

impl BeatmapDetails {
    pub fn is_custom_level(&self) -> bool {
        self.level_id.starts_with(CUSTOM_LEVEL_PREFIX)
    }

    /// Cache key: custom level ids sometimes carry a directory suffix after
    /// the embedded hash (duplicate installs); the suffix is stripped so both
    /// copies share one cache entry.
    pub fn simplified_level_id(&self) -> &str {
        simplified_level_id(&self.level_id)
    }

    /// All difficulty beatmaps across every characteristic, paired with the
    /// characteristic name.
    pub fn beatmaps(&self) -> impl Iterator<Item = (&str, &DifficultyBeatmap)> {
        self.difficulty_sets.iter().flat_map(|set| {
            set.beatmaps
                .iter()
                .map(move |b| (set.characteristic_name.as_str(), b))
        })
    }

    /// Beatmaps that count for difficulty-based filtering (lightshow
    /// difficulties excluded).
    pub fn playable_beatmaps(&self) -> impl Iterator<Item = (&str, &DifficultyBeatmap)> {
        self.beatmaps().filter(|(_, b)| !b.is_lightshow())
    }

    pub fn has_characteristic(&self, name: &str) -> bool {
        self.difficulty_sets
            .iter()
            .any(|set| set.characteristic_name.eq_ignore_ascii_case(name))
    }

    pub fn max_notes_count(&self) -> u32 {
        self.beatmaps().map(|(_, b)| b.notes_count).max().unwrap_or(0)
    }

    /// Notes per second for one beatmap; zero-duration records yield 0.
    pub fn note_density(&self, beatmap: &DifficultyBeatmap) -> f32 {
        if self.song_duration <= 0.0 {
            0.0
        } else {
            beatmap.notes_count as f32 / self.song_duration
        }
    }

    /// External-provider completeness heuristic: any difficulty reporting a
    /// note jump speed of 0 means the record was built from partial data.
    pub fn has_incomplete_njs(&self) -> bool {
        self.beatmaps().any(|(_, b)| b.note_jump_speed == 0.0)
    }

    /// The text fields that feed the word prediction index.
    pub fn song_text(&self) -> SongText {
        SongText {
            song_name: self.song_name.clone(),
            song_sub_name: self.song_sub_name.clone(),
            song_author_name: self.song_author_name.clone(),
            level_author_name: self.level_author_name.clone(),
        }
    }
}

/// See [`BeatmapDetails::simplified_level_id`].
pub fn simplified_level_id(level_id: &str) -> &str {
    let Some(rest) = level_id.strip_prefix(CUSTOM_LEVEL_PREFIX) else {
        return level_id;
    };
    let bytes = rest.as_bytes();
    if bytes.len() <= CUSTOM_LEVEL_HASH_LEN {
        return level_id;
    }
    // Hex digits are ASCII, so the byte check doubles as a char-boundary
    // guarantee for the slice below.
    if bytes[..CUSTOM_LEVEL_HASH_LEN].iter().all(u8::is_ascii_hexdigit) {
        &level_id[..CUSTOM_LEVEL_PREFIX.len() + CUSTOM_LEVEL_HASH_LEN]
    } else {
        level_id
    }
}
