//! Note jump speed range filter, optionally restricted to a difficulty
//! subset.

use crate::error::Result;
use crate::filter::{
    DifficultySelection, FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool,
    tenths_to_f32,
};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NjsFilterValues {
    pub min_enabled: bool,
    /// Tenths of NJS, so "18.5" persists losslessly as "185".
    pub min_tenths: u32,
    pub max_enabled: bool,
    pub max_tenths: u32,
    pub difficulties: DifficultySelection,
}

impl FilterValues for NjsFilterValues {
    fn is_filtering(&self) -> bool {
        self.min_enabled || self.max_enabled
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("minEnabled".into(), encode_bool(self.min_enabled)),
            ("minTenths".into(), self.min_tenths.to_string()),
            ("maxEnabled".into(), encode_bool(self.max_enabled)),
            ("maxTenths".into(), self.max_tenths.to_string()),
        ];
        self.difficulties.write_settings(&mut out);
        out
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("njs", pairs);
        Ok(Self {
            min_enabled: reader.bool("minEnabled")?,
            min_tenths: reader.u32("minTenths")?,
            max_enabled: reader.bool("maxEnabled")?,
            max_tenths: reader.u32("maxTenths")?,
            difficulties: DifficultySelection::read_settings(&reader)?,
        })
    }
}

pub(crate) struct NjsFilterPolicy;

impl FilterPolicy for NjsFilterPolicy {
    type Values = NjsFilterValues;

    fn name(&self) -> &'static str {
        "njs"
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        details
            .playable_beatmaps()
            .filter(|(_, b)| values.difficulties.admits(b.difficulty))
            // NJS 0 means unknown, which can never satisfy a range.
            .filter(|(_, b)| b.note_jump_speed > 0.0)
            .any(|(_, b)| {
                let njs = b.note_jump_speed;
                (!values.min_enabled || njs >= tenths_to_f32(values.min_tenths))
                    && (!values.max_enabled || njs <= tenths_to_f32(values.max_tenths))
            })
    }
}

pub(crate) fn njs_filter() -> SongFilter<NjsFilterPolicy> {
    SongFilter::new(NjsFilterPolicy)
}
