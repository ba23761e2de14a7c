//! Completion / full-combo filter over the player's local history.
//! Requires the play-history collaborator.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::{
    DifficultySelection, FilterPolicy, FilterValues, SettingsReader, SongFilter,
};
use crate::sources::PlayHistorySource;
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    #[default]
    Off,
    HasCompleted,
    NeverCompleted,
}

const COMPLETION_STATES: &[(&str, CompletionState)] = &[
    ("Off", CompletionState::Off),
    ("HasCompleted", CompletionState::HasCompleted),
    ("NeverCompleted", CompletionState::NeverCompleted),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullComboState {
    #[default]
    Off,
    HasFullCombo,
    NeverFullCombo,
}

const FULL_COMBO_STATES: &[(&str, FullComboState)] = &[
    ("Off", FullComboState::Off),
    ("HasFullCombo", FullComboState::HasFullCombo),
    ("NeverFullCombo", FullComboState::NeverFullCombo),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerStatsFilterValues {
    pub completed: CompletionState,
    pub full_combo: FullComboState,
    pub difficulties: DifficultySelection,
}

impl FilterValues for PlayerStatsFilterValues {
    fn is_filtering(&self) -> bool {
        self.completed != CompletionState::Off || self.full_combo != FullComboState::Off
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        let completed = match self.completed {
            CompletionState::Off => "Off",
            CompletionState::HasCompleted => "HasCompleted",
            CompletionState::NeverCompleted => "NeverCompleted",
        };
        let full_combo = match self.full_combo {
            FullComboState::Off => "Off",
            FullComboState::HasFullCombo => "HasFullCombo",
            FullComboState::NeverFullCombo => "NeverFullCombo",
        };
        let mut out = vec![
            ("completed".into(), completed.to_string()),
            ("fullCombo".into(), full_combo.to_string()),
        ];
        self.difficulties.write_settings(&mut out);
        out
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("playerStats", pairs);
        Ok(Self {
            completed: reader.enumerated("completed", COMPLETION_STATES, CompletionState::Off)?,
            full_combo: reader.enumerated("fullCombo", FULL_COMBO_STATES, FullComboState::Off)?,
            difficulties: DifficultySelection::read_settings(&reader)?,
        })
    }
}

pub(crate) struct PlayerStatsFilterPolicy {
    history: Option<Arc<dyn PlayHistorySource>>,
}

impl FilterPolicy for PlayerStatsFilterPolicy {
    type Values = PlayerStatsFilterValues;

    fn name(&self) -> &'static str {
        "playerStats"
    }

    fn is_available(&self) -> bool {
        self.history.is_some()
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let Some(history) = &self.history else {
            return true;
        };

        let candidates: Vec<_> = details
            .playable_beatmaps()
            .filter(|(_, b)| values.difficulties.admits(b.difficulty))
            .map(|(_, b)| b.difficulty)
            .collect();
        if candidates.is_empty() {
            return false;
        }

        let completed_ok = match values.completed {
            CompletionState::Off => true,
            CompletionState::HasCompleted => candidates
                .iter()
                .any(|&d| history.has_completed(&details.level_id, d)),
            CompletionState::NeverCompleted => !candidates
                .iter()
                .any(|&d| history.has_completed(&details.level_id, d)),
        };
        if !completed_ok {
            return false;
        }

        match values.full_combo {
            FullComboState::Off => true,
            FullComboState::HasFullCombo => candidates
                .iter()
                .any(|&d| history.has_full_combo(&details.level_id, d)),
            FullComboState::NeverFullCombo => !candidates
                .iter()
                .any(|&d| history.has_full_combo(&details.level_id, d)),
        }
    }
}

pub(crate) fn player_stats_filter(
    history: Option<Arc<dyn PlayHistorySource>>,
) -> SongFilter<PlayerStatsFilterPolicy> {
    SongFilter::new(PlayerStatsFilterPolicy { history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::{song_with_beatmaps, standard_set};
    use crate::types::BeatmapDifficulty;

    struct StubHistory;

    impl PlayHistorySource for StubHistory {
        fn has_completed(&self, level_id: &str, difficulty: BeatmapDifficulty) -> bool {
            level_id == "cleared" && difficulty == BeatmapDifficulty::Expert
        }

        fn has_full_combo(&self, level_id: &str, _difficulty: BeatmapDifficulty) -> bool {
            level_id == "perfect"
        }
    }

    fn expert_song(level_id: &str) -> BeatmapDetails {
        song_with_beatmaps(
            level_id,
            standard_set(&[(BeatmapDifficulty::Expert, 16.0, 400)]),
        )
    }

    #[test]
    fn completion_tri_state() {
        let mut filter = player_stats_filter(Some(Arc::new(StubHistory)));
        filter
            .set_staging_from_settings(&[("completed".into(), "HasCompleted".into())])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![expert_song("cleared"), expert_song("untouched")];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "cleared");

        filter
            .set_staging_from_settings(&[("completed".into(), "NeverCompleted".into())])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![expert_song("cleared"), expert_song("untouched")];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "untouched");
    }

    #[test]
    fn difficulty_subset_limits_the_check() {
        let mut filter = player_stats_filter(Some(Arc::new(StubHistory)));
        // Only inspect Easy; "cleared" completed Expert, so it reads as
        // never-completed here — and it has no playable Easy, so it drops.
        filter
            .set_staging_from_settings(&[
                ("completed".into(), "HasCompleted".into()),
                ("easy".into(), "true".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![expert_song("cleared")];
        filter.filter_song_list(&mut songs);
        assert!(songs.is_empty());
    }
}
