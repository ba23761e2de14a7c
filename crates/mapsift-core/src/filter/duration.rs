//! Song duration range filter.

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationFilterValues {
    pub min_enabled: bool,
    pub min_seconds: u32,
    pub max_enabled: bool,
    pub max_seconds: u32,
}

impl FilterValues for DurationFilterValues {
    fn is_filtering(&self) -> bool {
        self.min_enabled || self.max_enabled
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("minEnabled".into(), encode_bool(self.min_enabled)),
            ("minSeconds".into(), self.min_seconds.to_string()),
            ("maxEnabled".into(), encode_bool(self.max_enabled)),
            ("maxSeconds".into(), self.max_seconds.to_string()),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("duration", pairs);
        Ok(Self {
            min_enabled: reader.bool("minEnabled")?,
            min_seconds: reader.u32("minSeconds")?,
            max_enabled: reader.bool("maxEnabled")?,
            max_seconds: reader.u32("maxSeconds")?,
        })
    }
}

pub(crate) struct DurationFilterPolicy;

impl FilterPolicy for DurationFilterPolicy {
    type Values = DurationFilterValues;

    fn name(&self) -> &'static str {
        "duration"
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let duration = details.song_duration;
        if values.min_enabled && duration < values.min_seconds as f32 {
            return false;
        }
        if values.max_enabled && duration > values.max_seconds as f32 {
            return false;
        }
        true
    }
}

pub(crate) fn duration_filter() -> SongFilter<DurationFilterPolicy> {
    SongFilter::new(DurationFilterPolicy)
}
