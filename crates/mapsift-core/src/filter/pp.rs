//! Ranked-status and PP range filter. Requires the ranked-data collaborator.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool};
use crate::sources::RankedSource;
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankGate {
    #[default]
    Off,
    Ranked,
    Unranked,
}

const RANK_GATES: &[(&str, RankGate)] = &[
    ("Off", RankGate::Off),
    ("Ranked", RankGate::Ranked),
    ("Unranked", RankGate::Unranked),
];

impl RankGate {
    fn as_str(self) -> &'static str {
        match self {
            RankGate::Off => "Off",
            RankGate::Ranked => "Ranked",
            RankGate::Unranked => "Unranked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpFilterValues {
    pub gate: RankGate,
    pub min_enabled: bool,
    pub min_pp: u32,
    pub max_enabled: bool,
    pub max_pp: u32,
}

impl FilterValues for PpFilterValues {
    fn is_filtering(&self) -> bool {
        self.gate != RankGate::Off
    }

    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("gate".into(), self.gate.as_str().to_string()),
            ("minEnabled".into(), encode_bool(self.min_enabled)),
            ("minPp".into(), self.min_pp.to_string()),
            ("maxEnabled".into(), encode_bool(self.max_enabled)),
            ("maxPp".into(), self.max_pp.to_string()),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("pp", pairs);
        Ok(Self {
            gate: reader.enumerated("gate", RANK_GATES, RankGate::Off)?,
            min_enabled: reader.bool("minEnabled")?,
            min_pp: reader.u32("minPp")?,
            max_enabled: reader.bool("maxEnabled")?,
            max_pp: reader.u32("maxPp")?,
        })
    }
}

pub(crate) struct PpFilterPolicy {
    ranked: Option<Arc<dyn RankedSource>>,
}

impl FilterPolicy for PpFilterPolicy {
    type Values = PpFilterValues;

    fn name(&self) -> &'static str {
        "pp"
    }

    fn is_available(&self) -> bool {
        self.ranked.is_some()
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let Some(ranked) = &self.ranked else {
            return true;
        };
        let max_pp = ranked.max_pp(&details.level_id);

        match values.gate {
            RankGate::Off => true,
            RankGate::Unranked => max_pp.is_none(),
            RankGate::Ranked => {
                let Some(pp) = max_pp else {
                    return false;
                };
                (!values.min_enabled || pp >= values.min_pp as f32)
                    && (!values.max_enabled || pp <= values.max_pp as f32)
            }
        }
    }
}

pub(crate) fn pp_filter(ranked: Option<Arc<dyn RankedSource>>) -> SongFilter<PpFilterPolicy> {
    SongFilter::new(PpFilterPolicy { ranked })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::{StubRankedSource, song};

    fn ranked_source() -> Arc<dyn RankedSource> {
        Arc::new(StubRankedSource::new(&[("ranked_song", 250.0, &[6.5])]))
    }

    #[test]
    fn unavailable_without_collaborator() {
        let mut filter = pp_filter(None);
        filter
            .set_staging_from_settings(&[("gate".into(), "Ranked".into())])
            .unwrap();
        filter.apply_staging();

        assert!(!filter.is_available());
        assert!(!filter.is_applied());

        let mut songs = vec![song("anything", 100.0)];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1, "unavailable filter must pass songs through");
    }

    #[test]
    fn ranked_gate_with_pp_bounds() {
        let mut filter = pp_filter(Some(ranked_source()));
        filter
            .set_staging_from_settings(&[
                ("gate".into(), "Ranked".into()),
                ("minEnabled".into(), "true".into()),
                ("minPp".into(), "200".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![song("ranked_song", 100.0), song("unranked_song", 100.0)];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "ranked_song");
    }

    #[test]
    fn unranked_gate_inverts() {
        let mut filter = pp_filter(Some(ranked_source()));
        filter
            .set_staging_from_settings(&[("gate".into(), "Unranked".into())])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![song("ranked_song", 100.0), song("unranked_song", 100.0)];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "unranked_song");
    }
}
