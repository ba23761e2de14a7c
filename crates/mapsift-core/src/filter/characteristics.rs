//! Characteristic membership filter (gameplay mode variants).

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharacteristicsFilterValues {
    pub standard: bool,
    pub one_saber: bool,
    pub no_arrows: bool,
    pub ninety_degree: bool,
    pub three_sixty_degree: bool,
    pub lightshow: bool,
    pub lawless: bool,
}

impl CharacteristicsFilterValues {
    /// Canonical characteristic names for the selected flags.
    fn selected_names(&self) -> Vec<&'static str> {
        let table: [(bool, &'static str); 7] = [
            (self.standard, "Standard"),
            (self.one_saber, "OneSaber"),
            (self.no_arrows, "NoArrows"),
            (self.ninety_degree, "90Degree"),
            (self.three_sixty_degree, "360Degree"),
            (self.lightshow, "Lightshow"),
            (self.lawless, "Lawless"),
        ];
        table
            .into_iter()
            .filter_map(|(selected, name)| selected.then_some(name))
            .collect()
    }
}

impl FilterValues for CharacteristicsFilterValues {
    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("standard".into(), encode_bool(self.standard)),
            ("oneSaber".into(), encode_bool(self.one_saber)),
            ("noArrows".into(), encode_bool(self.no_arrows)),
            ("ninetyDegree".into(), encode_bool(self.ninety_degree)),
            ("threeSixtyDegree".into(), encode_bool(self.three_sixty_degree)),
            ("lightshow".into(), encode_bool(self.lightshow)),
            ("lawless".into(), encode_bool(self.lawless)),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("characteristics", pairs);
        Ok(Self {
            standard: reader.bool("standard")?,
            one_saber: reader.bool("oneSaber")?,
            no_arrows: reader.bool("noArrows")?,
            ninety_degree: reader.bool("ninetyDegree")?,
            three_sixty_degree: reader.bool("threeSixtyDegree")?,
            lightshow: reader.bool("lightshow")?,
            lawless: reader.bool("lawless")?,
        })
    }
}

pub(crate) struct CharacteristicsFilterPolicy;

impl FilterPolicy for CharacteristicsFilterPolicy {
    type Values = CharacteristicsFilterValues;

    fn name(&self) -> &'static str {
        "characteristics"
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        values
            .selected_names()
            .iter()
            .any(|name| details.has_characteristic(name))
    }
}

pub(crate) fn characteristics_filter() -> SongFilter<CharacteristicsFilterPolicy> {
    SongFilter::new(CharacteristicsFilterPolicy)
}
