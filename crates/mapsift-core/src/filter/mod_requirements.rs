//! Mod requirement tri-state filter. Requires the mod-info collaborator.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SettingsReader, SongFilter};
use crate::sources::{ModInfoSource, ModRequirements};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequirementState {
    #[default]
    Off,
    Required,
    NotRequired,
}

const REQUIREMENT_STATES: &[(&str, RequirementState)] = &[
    ("Off", RequirementState::Off),
    ("Required", RequirementState::Required),
    ("NotRequired", RequirementState::NotRequired),
];

impl RequirementState {
    fn as_str(self) -> &'static str {
        match self {
            RequirementState::Off => "Off",
            RequirementState::Required => "Required",
            RequirementState::NotRequired => "NotRequired",
        }
    }

    fn admits(self, declared: bool) -> bool {
        match self {
            RequirementState::Off => true,
            RequirementState::Required => declared,
            RequirementState::NotRequired => !declared,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModRequirementsFilterValues {
    pub mapping_extensions: RequirementState,
    pub noodle_extensions: RequirementState,
    pub chroma: RequirementState,
}

impl FilterValues for ModRequirementsFilterValues {
    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            (
                "mappingExtensions".into(),
                self.mapping_extensions.as_str().to_string(),
            ),
            (
                "noodleExtensions".into(),
                self.noodle_extensions.as_str().to_string(),
            ),
            ("chroma".into(), self.chroma.as_str().to_string()),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("modRequirements", pairs);
        Ok(Self {
            mapping_extensions: reader.enumerated(
                "mappingExtensions",
                REQUIREMENT_STATES,
                RequirementState::Off,
            )?,
            noodle_extensions: reader.enumerated(
                "noodleExtensions",
                REQUIREMENT_STATES,
                RequirementState::Off,
            )?,
            chroma: reader.enumerated("chroma", REQUIREMENT_STATES, RequirementState::Off)?,
        })
    }
}

pub(crate) struct ModRequirementsFilterPolicy {
    mod_info: Option<Arc<dyn ModInfoSource>>,
}

impl FilterPolicy for ModRequirementsFilterPolicy {
    type Values = ModRequirementsFilterValues;

    fn name(&self) -> &'static str {
        "modRequirements"
    }

    fn is_available(&self) -> bool {
        self.mod_info.is_some()
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let Some(mod_info) = &self.mod_info else {
            return true;
        };
        // A level the source knows nothing about declares no requirements.
        let reqs = mod_info
            .requirements(&details.level_id)
            .unwrap_or(ModRequirements::default());

        values.mapping_extensions.admits(reqs.mapping_extensions)
            && values.noodle_extensions.admits(reqs.noodle_extensions)
            && values.chroma.admits(reqs.chroma)
    }
}

pub(crate) fn mod_requirements_filter(
    mod_info: Option<Arc<dyn ModInfoSource>>,
) -> SongFilter<ModRequirementsFilterPolicy> {
    SongFilter::new(ModRequirementsFilterPolicy { mod_info })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::song;

    struct StubModInfo;

    impl ModInfoSource for StubModInfo {
        fn requirements(&self, level_id: &str) -> Option<ModRequirements> {
            match level_id {
                "noodle_map" => Some(ModRequirements {
                    noodle_extensions: true,
                    ..ModRequirements::default()
                }),
                "plain_map" => Some(ModRequirements::default()),
                _ => None,
            }
        }
    }

    #[test]
    fn required_and_not_required_states() {
        let mut filter = mod_requirements_filter(Some(Arc::new(StubModInfo)));
        filter
            .set_staging_from_settings(&[("noodleExtensions".into(), "Required".into())])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![
            song("noodle_map", 100.0),
            song("plain_map", 100.0),
            song("unknown_map", 100.0),
        ];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "noodle_map");

        filter
            .set_staging_from_settings(&[("noodleExtensions".into(), "NotRequired".into())])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![song("noodle_map", 100.0), song("plain_map", 100.0)];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].level_id, "plain_map");
    }

    #[test]
    fn unavailable_without_collaborator() {
        let mut filter = mod_requirements_filter(None);
        filter
            .set_staging_from_settings(&[("chroma".into(), "Required".into())])
            .unwrap();
        filter.apply_staging();
        assert!(!filter.is_applied());
    }
}
