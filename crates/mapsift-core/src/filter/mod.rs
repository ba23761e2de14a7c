//! Filter composition and evaluation.
//!
//! Every concrete filter shares one staged/applied state machine: UI edits
//! mutate staging, an explicit apply transition commits staging to the
//! applied values, and [`Filter::filter_song_list`] only ever reads applied
//! values — mid-edit state never affects the displayed result. The state
//! machine is implemented once in [`SongFilter`]; concrete filters supply
//! only a [`FilterPolicy`] with the removal predicate.

mod characteristics;
mod difficulty;
mod duration;
mod list;
mod mod_requirements;
mod njs;
mod note_density;
mod other;
mod player_stats;
mod pp;
mod quick;
mod search;
mod star;
mod voted;

use crate::error::{Error, Result};
use crate::types::{BeatmapDetails, BeatmapDifficulty};

pub use characteristics::CharacteristicsFilterValues;
pub use difficulty::DifficultyFilterValues;
pub use duration::DurationFilterValues;
pub use list::FilterList;
pub use mod_requirements::{ModRequirementsFilterValues, RequirementState};
pub use njs::NjsFilterValues;
pub use note_density::NoteDensityFilterValues;
pub use other::OtherFilterValues;
pub use player_stats::{CompletionState, FullComboState, PlayerStatsFilterValues};
pub use pp::{PpFilterValues, RankGate};
pub use quick::{
    FileSlotStore, FilterSettings, MemorySlotStore, QUICK_FILTER_NAME_MAX, QuickFilter,
    QuickFiltersManager, SlotStore,
};
pub use search::SearchFilterValues;
pub use star::StarFilterValues;
pub use voted::VotedFilterValues;

/// Derived four-state filter status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    NotApplied,
    NotAppliedAndChanged,
    Applied,
    AppliedAndChanged,
}

/// A filter's value set: the unit that moves between staging and applied.
pub trait FilterValues: Clone + PartialEq + Default + Send + 'static {
    /// Whether these values would remove anything. Defaults never filter.
    fn is_filtering(&self) -> bool {
        *self != Self::default()
    }

    /// Key-value pairs for quick-filter persistence. Keys and values must be
    /// alphanumeric; the serialization layer escapes everything else.
    fn to_settings(&self) -> Vec<(String, String)>;

    fn from_settings(pairs: &[(String, String)]) -> Result<Self>;
}

/// The per-filter part: a name, an availability check and the removal
/// predicate. Everything else lives in [`SongFilter`].
pub trait FilterPolicy: Send + 'static {
    type Values: FilterValues;

    fn name(&self) -> &'static str;

    /// Filters backed by an absent optional collaborator report false and
    /// pass songs through unchanged.
    fn is_available(&self) -> bool {
        true
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool;
}

/// Object-safe filter contract used by [`FilterList`].
pub trait Filter: Send {
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    fn is_applied(&self) -> bool;
    fn has_changes(&self) -> bool;
    fn is_staging_defaults(&self) -> bool;
    fn status(&self) -> FilterStatus;
    fn set_defaults_to_staging(&mut self);
    fn set_applied_to_staging(&mut self);
    /// The only transition that changes filtering behaviour.
    fn apply_staging(&mut self);
    fn apply_defaults(&mut self);
    /// In-place removal driven by applied values only, never staged ones.
    fn filter_song_list(&self, songs: &mut Vec<BeatmapDetails>);
    fn applied_settings(&self) -> Vec<(String, String)>;
    fn set_staging_from_settings(&mut self, pairs: &[(String, String)]) -> Result<()>;
}

/// The shared staged/applied state machine around one [`FilterPolicy`].
pub struct SongFilter<P: FilterPolicy> {
    policy: P,
    staging: P::Values,
    applied: P::Values,
}

impl<P: FilterPolicy> SongFilter<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            staging: P::Values::default(),
            applied: P::Values::default(),
        }
    }

    pub fn staging(&self) -> &P::Values {
        &self.staging
    }

    /// Direct staging access for typed callers (the UI shim). Listeners are
    /// notified by [`FilterList`], which owns the observer registry.
    pub fn staging_mut(&mut self) -> &mut P::Values {
        &mut self.staging
    }

    pub fn applied(&self) -> &P::Values {
        &self.applied
    }
}

impl<P: FilterPolicy> Filter for SongFilter<P> {
    fn name(&self) -> &'static str {
        self.policy.name()
    }

    fn is_available(&self) -> bool {
        self.policy.is_available()
    }

    fn is_applied(&self) -> bool {
        self.policy.is_available() && self.applied.is_filtering()
    }

    fn has_changes(&self) -> bool {
        self.staging != self.applied
    }

    fn is_staging_defaults(&self) -> bool {
        self.staging == P::Values::default()
    }

    fn status(&self) -> FilterStatus {
        match (self.is_applied(), self.has_changes()) {
            (false, false) => FilterStatus::NotApplied,
            (false, true) => FilterStatus::NotAppliedAndChanged,
            (true, false) => FilterStatus::Applied,
            (true, true) => FilterStatus::AppliedAndChanged,
        }
    }

    fn set_defaults_to_staging(&mut self) {
        self.staging = P::Values::default();
    }

    fn set_applied_to_staging(&mut self) {
        self.staging = self.applied.clone();
    }

    fn apply_staging(&mut self) {
        self.applied = self.staging.clone();
    }

    fn apply_defaults(&mut self) {
        self.staging = P::Values::default();
        self.applied = P::Values::default();
    }

    fn filter_song_list(&self, songs: &mut Vec<BeatmapDetails>) {
        if !self.is_applied() {
            return;
        }
        songs.retain(|details| self.policy.keep(&self.applied, details));
    }

    fn applied_settings(&self) -> Vec<(String, String)> {
        self.applied.to_settings()
    }

    fn set_staging_from_settings(&mut self, pairs: &[(String, String)]) -> Result<()> {
        self.staging = P::Values::from_settings(pairs)?;
        Ok(())
    }
}

/// Which difficulties a range-style filter inspects. An empty selection means
/// "any difficulty".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultySelection {
    pub easy: bool,
    pub normal: bool,
    pub hard: bool,
    pub expert: bool,
    pub expert_plus: bool,
}

impl DifficultySelection {
    pub fn any_selected(&self) -> bool {
        self.easy || self.normal || self.hard || self.expert || self.expert_plus
    }

    /// True when `difficulty` should be inspected under this selection.
    pub fn admits(&self, difficulty: BeatmapDifficulty) -> bool {
        if !self.any_selected() {
            return true;
        }
        match difficulty {
            BeatmapDifficulty::Easy => self.easy,
            BeatmapDifficulty::Normal => self.normal,
            BeatmapDifficulty::Hard => self.hard,
            BeatmapDifficulty::Expert => self.expert,
            BeatmapDifficulty::ExpertPlus => self.expert_plus,
        }
    }

    pub(crate) fn write_settings(&self, out: &mut Vec<(String, String)>) {
        out.push(("easy".into(), encode_bool(self.easy)));
        out.push(("normal".into(), encode_bool(self.normal)));
        out.push(("hard".into(), encode_bool(self.hard)));
        out.push(("expert".into(), encode_bool(self.expert)));
        out.push(("expertPlus".into(), encode_bool(self.expert_plus)));
    }

    pub(crate) fn read_settings(reader: &SettingsReader<'_>) -> Result<Self> {
        Ok(Self {
            easy: reader.bool("easy")?,
            normal: reader.bool("normal")?,
            hard: reader.bool("hard")?,
            expert: reader.bool("expert")?,
            expert_plus: reader.bool("expertPlus")?,
        })
    }
}

pub(crate) fn encode_bool(value: bool) -> String {
    (if value { "true" } else { "false" }).to_string()
}

/// Helper over the key-value settings list. Missing keys read as the default
/// so older quick filters stay loadable after a filter gains options.
pub(crate) struct SettingsReader<'a> {
    filter: &'static str,
    pairs: &'a [(String, String)],
}

impl<'a> SettingsReader<'a> {
    pub(crate) fn new(filter: &'static str, pairs: &'a [(String, String)]) -> Self {
        Self { filter, pairs }
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn invalid(&self, key: &str, value: &str) -> Error {
        Error::InvalidSetting {
            filter: self.filter,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn bool(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(self.invalid(key, other)),
        }
    }

    pub(crate) fn u32(&self, key: &str) -> Result<u32> {
        match self.get(key) {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|_| self.invalid(key, raw)),
        }
    }

    pub(crate) fn enumerated<T: Copy>(&self, key: &str, table: &[(&str, T)], default: T) -> Result<T> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => table
                .iter()
                .find(|(name, _)| *name == raw)
                .map(|(_, value)| *value)
                .ok_or_else(|| self.invalid(key, raw)),
        }
    }
}

/// Integer tenths keep numeric bounds exactly representable in the
/// alphanumeric wire format.
pub(crate) fn tenths_to_f32(tenths: u32) -> f32 {
    tenths as f32 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::song;

    /// State-machine transitions, checked once against a representative
    /// filter; every other filter shares this exact implementation.
    #[test]
    fn staged_applied_transitions() {
        let mut filter = duration::duration_filter();
        assert_eq!(filter.status(), FilterStatus::NotApplied);
        assert!(filter.is_staging_defaults());

        filter
            .set_staging_from_settings(&[
                ("minEnabled".into(), "true".into()),
                ("minSeconds".into(), "60".into()),
            ])
            .unwrap();
        assert_eq!(filter.status(), FilterStatus::NotAppliedAndChanged);
        assert!(filter.has_changes());
        assert!(!filter.is_applied());

        filter.apply_staging();
        assert_eq!(filter.status(), FilterStatus::Applied);
        assert!(!filter.has_changes());
        assert!(filter.is_applied());

        // Applying then re-staging the applied values is a no-op.
        filter.set_applied_to_staging();
        assert!(!filter.has_changes());

        filter.set_defaults_to_staging();
        assert!(filter.is_staging_defaults());
        assert_eq!(filter.status(), FilterStatus::AppliedAndChanged);

        filter.apply_defaults();
        assert_eq!(filter.status(), FilterStatus::NotApplied);
    }

    #[test]
    fn staged_values_never_affect_filtering() {
        let mut filter = duration::duration_filter();
        filter
            .set_staging_from_settings(&[
                ("minEnabled".into(), "true".into()),
                ("minSeconds".into(), "500".into()),
            ])
            .unwrap();

        // Not applied yet: nothing is removed.
        let mut songs = vec![song("a", 100.0)];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);

        filter.apply_staging();
        filter.filter_song_list(&mut songs);
        assert!(songs.is_empty());
    }

    #[test]
    fn settings_round_trip_through_the_state_machine() {
        let mut filter = duration::duration_filter();
        filter
            .set_staging_from_settings(&[
                ("minEnabled".into(), "true".into()),
                ("minSeconds".into(), "60".into()),
                ("maxEnabled".into(), "true".into()),
                ("maxSeconds".into(), "120".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let pairs = filter.applied_settings();
        let mut second = duration::duration_filter();
        second.set_staging_from_settings(&pairs).unwrap();
        second.apply_staging();

        assert_eq!(second.applied_settings(), pairs);
    }
}
