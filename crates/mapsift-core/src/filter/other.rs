//! Catch-all filter for options that fit nowhere else.

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OtherFilterValues {
    /// Hide built-in (OST/DLC) content, keeping only custom levels.
    pub custom_only: bool,
    /// Hide songs whose every difficulty is a lightshow.
    pub hide_lightshow_only: bool,
}

impl FilterValues for OtherFilterValues {
    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("customOnly".into(), encode_bool(self.custom_only)),
            (
                "hideLightshowOnly".into(),
                encode_bool(self.hide_lightshow_only),
            ),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("other", pairs);
        Ok(Self {
            custom_only: reader.bool("customOnly")?,
            hide_lightshow_only: reader.bool("hideLightshowOnly")?,
        })
    }
}

pub(crate) struct OtherFilterPolicy;

impl FilterPolicy for OtherFilterPolicy {
    type Values = OtherFilterValues;

    fn name(&self) -> &'static str {
        "other"
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        if values.custom_only && !details.is_custom_level() {
            return false;
        }
        if values.hide_lightshow_only && details.playable_beatmaps().next().is_none() {
            return false;
        }
        true
    }
}

pub(crate) fn other_filter() -> SongFilter<OtherFilterPolicy> {
    SongFilter::new(OtherFilterPolicy)
}
