//! Difficulty membership filter.

use crate::error::Result;
use crate::filter::{
    DifficultySelection, FilterPolicy, FilterValues, SettingsReader, SongFilter,
};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultyFilterValues {
    pub selection: DifficultySelection,
}

impl FilterValues for DifficultyFilterValues {
    fn is_filtering(&self) -> bool {
        self.selection.any_selected()
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(5);
        self.selection.write_settings(&mut out);
        out
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("difficulty", pairs);
        Ok(Self {
            selection: DifficultySelection::read_settings(&reader)?,
        })
    }
}

pub(crate) struct DifficultyFilterPolicy;

impl FilterPolicy for DifficultyFilterPolicy {
    type Values = DifficultyFilterValues;

    fn name(&self) -> &'static str {
        "difficulty"
    }

    /// Lightshow variants never satisfy a difficulty selection.
    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        details
            .playable_beatmaps()
            .any(|(_, beatmap)| values.selection.admits(beatmap.difficulty))
    }
}

pub(crate) fn difficulty_filter() -> SongFilter<DifficultyFilterPolicy> {
    SongFilter::new(DifficultyFilterPolicy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::{song_with_beatmaps, standard_set};
    use crate::types::BeatmapDifficulty;

    #[test]
    fn keeps_songs_with_a_selected_playable_difficulty() {
        let mut filter = difficulty_filter();
        filter
            .set_staging_from_settings(&[("expertPlus".into(), "true".into())])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![
            song_with_beatmaps(
                "has_ep",
                standard_set(&[(BeatmapDifficulty::ExpertPlus, 18.0, 500)]),
            ),
            song_with_beatmaps(
                "only_hard",
                standard_set(&[(BeatmapDifficulty::Hard, 12.0, 300)]),
            ),
        ];
        filter.filter_song_list(&mut songs);

        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "has_ep");
    }

    #[test]
    fn lightshow_difficulties_do_not_count() {
        let mut filter = difficulty_filter();
        filter
            .set_staging_from_settings(&[("easy".into(), "true".into())])
            .unwrap();
        filter.apply_staging();

        // Easy exists but carries zero notes.
        let mut songs = vec![song_with_beatmaps(
            "lightshow_easy",
            standard_set(&[
                (BeatmapDifficulty::Easy, 10.0, 0),
                (BeatmapDifficulty::Expert, 16.0, 400),
            ]),
        )];
        filter.filter_song_list(&mut songs);
        assert!(songs.is_empty());
    }
}
