//! Note density (notes per second) range filter.

use crate::error::Result;
use crate::filter::{
    FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool, tenths_to_f32,
};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteDensityFilterValues {
    pub min_enabled: bool,
    /// Tenths of notes-per-second.
    pub min_tenths: u32,
    pub max_enabled: bool,
    pub max_tenths: u32,
}

impl FilterValues for NoteDensityFilterValues {
    fn is_filtering(&self) -> bool {
        self.min_enabled || self.max_enabled
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("minEnabled".into(), encode_bool(self.min_enabled)),
            ("minTenths".into(), self.min_tenths.to_string()),
            ("maxEnabled".into(), encode_bool(self.max_enabled)),
            ("maxTenths".into(), self.max_tenths.to_string()),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("noteDensity", pairs);
        Ok(Self {
            min_enabled: reader.bool("minEnabled")?,
            min_tenths: reader.u32("minTenths")?,
            max_enabled: reader.bool("maxEnabled")?,
            max_tenths: reader.u32("maxTenths")?,
        })
    }
}

pub(crate) struct NoteDensityFilterPolicy;

impl FilterPolicy for NoteDensityFilterPolicy {
    type Values = NoteDensityFilterValues;

    fn name(&self) -> &'static str {
        "noteDensity"
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        details.playable_beatmaps().any(|(_, beatmap)| {
            let density = details.note_density(beatmap);
            (!values.min_enabled || density >= tenths_to_f32(values.min_tenths))
                && (!values.max_enabled || density <= tenths_to_f32(values.max_tenths))
        })
    }
}

pub(crate) fn note_density_filter() -> SongFilter<NoteDensityFilterPolicy> {
    SongFilter::new(NoteDensityFilterPolicy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::{song_with_beatmaps_and_duration, standard_set};
    use crate::types::BeatmapDifficulty;

    #[test]
    fn density_is_notes_over_duration() {
        let mut filter = note_density_filter();
        filter
            .set_staging_from_settings(&[
                ("minEnabled".into(), "true".into()),
                ("minTenths".into(), "50".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![
            // 600 notes / 100 s = 6 nps — passes.
            song_with_beatmaps_and_duration(
                "dense",
                standard_set(&[(BeatmapDifficulty::ExpertPlus, 18.0, 600)]),
                100.0,
            ),
            // 200 notes / 100 s = 2 nps — removed.
            song_with_beatmaps_and_duration(
                "sparse",
                standard_set(&[(BeatmapDifficulty::Expert, 16.0, 200)]),
                100.0,
            ),
        ];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "dense");
    }
}
