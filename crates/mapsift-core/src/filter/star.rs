//! Star difficulty range filter with an "include unrated" escape hatch.
//! Requires the ranked-data collaborator.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::{
    FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool, tenths_to_f32,
};
use crate::sources::RankedSource;
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarFilterValues {
    pub min_enabled: bool,
    /// Tenths of a star, so "9.5" persists losslessly as "95".
    pub min_tenths: u32,
    pub max_enabled: bool,
    pub max_tenths: u32,
    pub include_unrated: bool,
}

impl FilterValues for StarFilterValues {
    fn is_filtering(&self) -> bool {
        self.min_enabled || self.max_enabled
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("minEnabled".into(), encode_bool(self.min_enabled)),
            ("minTenths".into(), self.min_tenths.to_string()),
            ("maxEnabled".into(), encode_bool(self.max_enabled)),
            ("maxTenths".into(), self.max_tenths.to_string()),
            ("includeUnrated".into(), encode_bool(self.include_unrated)),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("starDifficulty", pairs);
        Ok(Self {
            min_enabled: reader.bool("minEnabled")?,
            min_tenths: reader.u32("minTenths")?,
            max_enabled: reader.bool("maxEnabled")?,
            max_tenths: reader.u32("maxTenths")?,
            include_unrated: reader.bool("includeUnrated")?,
        })
    }
}

pub(crate) struct StarFilterPolicy {
    ranked: Option<Arc<dyn RankedSource>>,
}

impl FilterPolicy for StarFilterPolicy {
    type Values = StarFilterValues;

    fn name(&self) -> &'static str {
        "starDifficulty"
    }

    fn is_available(&self) -> bool {
        self.ranked.is_some()
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let Some(ranked) = &self.ranked else {
            return true;
        };

        let stars = ranked.star_ratings(&details.level_id);
        if stars.is_empty() {
            return values.include_unrated;
        }

        stars.iter().any(|&star| {
            (!values.min_enabled || star >= tenths_to_f32(values.min_tenths))
                && (!values.max_enabled || star <= tenths_to_f32(values.max_tenths))
        })
    }
}

pub(crate) fn star_filter(ranked: Option<Arc<dyn RankedSource>>) -> SongFilter<StarFilterPolicy> {
    SongFilter::new(StarFilterPolicy { ranked })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::{StubRankedSource, song};

    fn ranked_source() -> Arc<dyn RankedSource> {
        Arc::new(StubRankedSource::new(&[
            ("easy_rated", 80.0, &[3.0]),
            ("hard_rated", 400.0, &[9.5, 7.0]),
        ]))
    }

    #[test]
    fn star_range_with_unrated_escape_hatch() {
        let mut filter = star_filter(Some(ranked_source()));
        filter
            .set_staging_from_settings(&[
                ("minEnabled".into(), "true".into()),
                ("minTenths".into(), "90".into()),
                ("includeUnrated".into(), "true".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![
            song("easy_rated", 100.0),
            song("hard_rated", 100.0),
            song("unrated", 100.0),
        ];
        filter.filter_song_list(&mut songs);

        let ids: Vec<&str> = songs.iter().map(|s| s.level_id.as_str()).collect();
        assert_eq!(ids, ["hard_rated", "unrated"]);
    }

    #[test]
    fn unrated_songs_drop_without_escape_hatch() {
        let mut filter = star_filter(Some(ranked_source()));
        filter
            .set_staging_from_settings(&[
                ("minEnabled".into(), "true".into()),
                ("minTenths".into(), "10".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![song("unrated", 100.0)];
        filter.filter_song_list(&mut songs);
        assert!(songs.is_empty());
    }
}
