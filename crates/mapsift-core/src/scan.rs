//! Slow-path resolution: build [`BeatmapDetails`] from a level's files.
//!
//! Custom levels ship as a directory holding `info.json` plus one JSON file
//! per difficulty. Scanning reads the info file for names, BPM and the
//! difficulty set layout, then counts objects in each difficulty file. It is
//! the most expensive resolution path and only runs when the cache misses
//! and the metadata provider could not supply a complete record.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{
    BeatmapDetails, BeatmapDifficulty, DifficultyBeatmap, DifficultyBeatmapSet,
};

const INFO_FILE: &str = "info.json";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelInfo {
    song_name: String,
    #[serde(default)]
    song_sub_name: String,
    #[serde(default)]
    song_author_name: String,
    #[serde(default)]
    level_author_name: String,
    beats_per_minute: f32,
    #[serde(default)]
    difficulty_beatmap_sets: Vec<InfoSet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfoSet {
    beatmap_characteristic_name: String,
    #[serde(default)]
    difficulty_beatmaps: Vec<InfoBeatmap>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfoBeatmap {
    difficulty: String,
    beatmap_filename: String,
    #[serde(default)]
    note_jump_movement_speed: f32,
}

/// Object arrays of one difficulty file. Only the counts matter here, so the
/// element type stays opaque.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BeatmapFile {
    #[serde(default)]
    color_notes: Vec<serde_json::Value>,
    #[serde(default)]
    bomb_notes: Vec<serde_json::Value>,
    #[serde(default)]
    obstacles: Vec<serde_json::Value>,
    #[serde(default)]
    rotation_events: Vec<serde_json::Value>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::LevelRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::LevelParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Scan one custom level directory. `song_duration` comes from the host's
/// audio collaborator; pass 0.0 when it is unavailable so the record stays
/// marked incomplete and eligible for a later overwrite.
pub fn scan_level(level_id: &str, dir: &Path, song_duration: f32) -> Result<BeatmapDetails> {
    let info: LevelInfo = read_json(&dir.join(INFO_FILE))?;

    let mut difficulty_sets = Vec::with_capacity(info.difficulty_beatmap_sets.len());
    for set in &info.difficulty_beatmap_sets {
        let mut beatmaps = Vec::with_capacity(set.difficulty_beatmaps.len());
        for entry in &set.difficulty_beatmaps {
            let difficulty: BeatmapDifficulty = match entry.difficulty.parse() {
                Ok(d) => d,
                Err(e) => {
                    warn!(
                        level_id,
                        difficulty = %entry.difficulty,
                        error = %e,
                        "skipping beatmap with unknown difficulty"
                    );
                    continue;
                }
            };

            let file: BeatmapFile = match read_json(&dir.join(&entry.beatmap_filename)) {
                Ok(file) => file,
                Err(e) => {
                    warn!(level_id, file = %entry.beatmap_filename, error = %e,
                        "skipping unreadable difficulty file");
                    continue;
                }
            };

            beatmaps.push(DifficultyBeatmap {
                difficulty,
                note_jump_speed: entry.note_jump_movement_speed,
                notes_count: file.color_notes.len() as u32,
                bombs_count: file.bomb_notes.len() as u32,
                obstacles_count: file.obstacles.len() as u32,
                spawn_rotation_events_count: file.rotation_events.len() as u32,
            });
        }

        if !beatmaps.is_empty() {
            difficulty_sets.push(DifficultyBeatmapSet {
                characteristic_name: set.beatmap_characteristic_name.clone(),
                beatmaps,
            });
        }
    }

    debug!(level_id, sets = difficulty_sets.len(), "scanned level files");

    Ok(BeatmapDetails {
        level_id: level_id.to_string(),
        song_name: info.song_name,
        song_sub_name: info.song_sub_name,
        song_author_name: info.song_author_name,
        level_author_name: info.level_author_name,
        beats_per_minute: info.beats_per_minute,
        song_duration,
        difficulty_sets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_level(dir: &Path) {
        let info = serde_json::json!({
            "songName": "Scanned Song",
            "songAuthorName": "Artist",
            "levelAuthorName": "Mapper",
            "beatsPerMinute": 174.0,
            "difficultyBeatmapSets": [{
                "beatmapCharacteristicName": "Standard",
                "difficultyBeatmaps": [
                    {
                        "difficulty": "Hard",
                        "beatmapFilename": "hard.json",
                        "noteJumpMovementSpeed": 14.0
                    },
                    {
                        "difficulty": "ExpertPlus",
                        "beatmapFilename": "expert_plus.json",
                        "noteJumpMovementSpeed": 19.0
                    },
                    {
                        "difficulty": "SuperUltra",
                        "beatmapFilename": "bogus.json"
                    }
                ]
            }]
        });
        std::fs::write(dir.join("info.json"), info.to_string()).unwrap();

        let hard = serde_json::json!({
            "colorNotes": [{}, {}, {}],
            "bombNotes": [{}],
            "obstacles": [{}, {}],
            "rotationEvents": []
        });
        std::fs::write(dir.join("hard.json"), hard.to_string()).unwrap();

        let expert_plus = serde_json::json!({
            "colorNotes": [{}, {}, {}, {}, {}],
        });
        std::fs::write(dir.join("expert_plus.json"), expert_plus.to_string()).unwrap();
    }

    #[test]
    fn scans_counts_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path());

        let details = scan_level("custom_level_abc", dir.path(), 123.0).unwrap();
        assert_eq!(details.song_name, "Scanned Song");
        assert_eq!(details.beats_per_minute, 174.0);
        assert_eq!(details.song_duration, 123.0);
        assert_eq!(details.difficulty_sets.len(), 1);

        // The unknown difficulty was skipped, not fatal.
        let beatmaps = &details.difficulty_sets[0].beatmaps;
        assert_eq!(beatmaps.len(), 2);
        assert_eq!(beatmaps[0].difficulty, BeatmapDifficulty::Hard);
        assert_eq!(beatmaps[0].notes_count, 3);
        assert_eq!(beatmaps[0].bombs_count, 1);
        assert_eq!(beatmaps[0].obstacles_count, 2);
        assert_eq!(beatmaps[1].difficulty, BeatmapDifficulty::ExpertPlus);
        assert_eq!(beatmaps[1].note_jump_speed, 19.0);
    }

    #[test]
    fn missing_info_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_level("custom_level_abc", dir.path(), 0.0).is_err());
    }
}
