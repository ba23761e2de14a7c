//! Shared fixtures for unit tests.

use crate::sources::RankedSource;
use crate::types::{
    BeatmapDetails, BeatmapDifficulty, DifficultyBeatmap, DifficultyBeatmapSet,
};

pub(crate) fn set(
    characteristic: &str,
    beatmaps: &[(BeatmapDifficulty, f32, u32)],
) -> DifficultyBeatmapSet {
    DifficultyBeatmapSet {
        characteristic_name: characteristic.to_string(),
        beatmaps: beatmaps
            .iter()
            .map(|&(difficulty, njs, notes)| DifficultyBeatmap {
                difficulty,
                note_jump_speed: njs,
                notes_count: notes,
                bombs_count: 0,
                obstacles_count: 0,
                spawn_rotation_events_count: 0,
            })
            .collect(),
    }
}

pub(crate) fn standard_set(
    beatmaps: &[(BeatmapDifficulty, f32, u32)],
) -> Vec<DifficultyBeatmapSet> {
    vec![set("Standard", beatmaps)]
}

pub(crate) fn song_with_beatmaps_and_duration(
    level_id: &str,
    difficulty_sets: Vec<DifficultyBeatmapSet>,
    duration: f32,
) -> BeatmapDetails {
    BeatmapDetails {
        level_id: level_id.to_string(),
        song_name: level_id.to_string(),
        song_sub_name: String::new(),
        song_author_name: String::new(),
        level_author_name: String::new(),
        beats_per_minute: 120.0,
        song_duration: duration,
        difficulty_sets,
    }
}

pub(crate) fn song_with_beatmaps(
    level_id: &str,
    difficulty_sets: Vec<DifficultyBeatmapSet>,
) -> BeatmapDetails {
    song_with_beatmaps_and_duration(level_id, difficulty_sets, 100.0)
}

pub(crate) fn song(level_id: &str, duration: f32) -> BeatmapDetails {
    song_with_beatmaps_and_duration(
        level_id,
        standard_set(&[(BeatmapDifficulty::Expert, 16.0, 400)]),
        duration,
    )
}

pub(crate) fn named_song(
    level_id: &str,
    name: &str,
    author: &str,
    mapper: &str,
) -> BeatmapDetails {
    let mut details = song(level_id, 100.0);
    details.song_name = name.to_string();
    details.song_author_name = author.to_string();
    details.level_author_name = mapper.to_string();
    details
}

/// Ranked data for a fixed set of levels; everything else reads unranked.
pub(crate) struct StubRankedSource {
    levels: Vec<(String, f32, Vec<f32>)>,
}

impl StubRankedSource {
    pub(crate) fn new(levels: &[(&str, f32, &[f32])]) -> Self {
        Self {
            levels: levels
                .iter()
                .map(|&(id, pp, stars)| (id.to_string(), pp, stars.to_vec()))
                .collect(),
        }
    }
}

impl RankedSource for StubRankedSource {
    fn max_pp(&self, level_id: &str) -> Option<f32> {
        self.levels
            .iter()
            .find(|(id, _, _)| id == level_id)
            .map(|(_, pp, _)| *pp)
    }

    fn star_ratings(&self, level_id: &str) -> Vec<f32> {
        self.levels
            .iter()
            .find(|(id, _, _)| id == level_id)
            .map(|(_, _, stars)| stars.clone())
            .unwrap_or_default()
    }
}
