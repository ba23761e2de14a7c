//! Ordered registry of active filters.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::filter::quick::{FilterSettings, QuickFilter};
use crate::filter::{
    Filter, characteristics::characteristics_filter, difficulty::difficulty_filter,
    duration::duration_filter, mod_requirements::mod_requirements_filter, njs::njs_filter,
    note_density::note_density_filter, other::other_filter, player_stats::player_stats_filter,
    pp::pp_filter, search::search_filter, star::star_filter, voted::voted_filter,
};
use crate::sources::FilterCollaborators;
use crate::types::BeatmapDetails;

/// Called with the filter's name whenever its staging values change through
/// the list. Replaces the host UI's per-control change events.
pub type StagingObserver = Box<dyn Fn(&str) + Send>;

/// Holds the default filter set plus externally registered filters, in a
/// stable order. Applying the set runs each applied filter's removal
/// predicate in registry order; predicates only remove entries, so the
/// outcome is order-independent.
#[derive(Default)]
pub struct FilterList {
    filters: Vec<Box<dyn Filter>>,
    observers: Vec<StagingObserver>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default dozen, wired to whichever collaborators are present.
    pub fn with_defaults(collaborators: &FilterCollaborators) -> Self {
        let mut list = Self::new();
        list.register(Box::new(search_filter()));
        list.register(Box::new(difficulty_filter()));
        list.register(Box::new(duration_filter()));
        list.register(Box::new(njs_filter()));
        list.register(Box::new(note_density_filter()));
        list.register(Box::new(characteristics_filter()));
        list.register(Box::new(pp_filter(collaborators.ranked.clone())));
        list.register(Box::new(star_filter(collaborators.ranked.clone())));
        list.register(Box::new(mod_requirements_filter(
            collaborators.mod_info.clone(),
        )));
        list.register(Box::new(player_stats_filter(
            collaborators.play_history.clone(),
        )));
        list.register(Box::new(voted_filter(collaborators.votes.clone())));
        list.register(Box::new(other_filter()));
        list
    }

    /// Appends a filter. A duplicate name is rejected — the first
    /// registration wins.
    pub fn register(&mut self, filter: Box<dyn Filter>) {
        if self.filters.iter().any(|f| f.name() == filter.name()) {
            warn!(name = filter.name(), "ignoring duplicate filter registration");
            return;
        }
        self.filters.push(filter);
    }

    pub fn observe(&mut self, observer: StagingObserver) {
        self.observers.push(observer);
    }

    fn notify(&self, name: &str) {
        for observer in &self.observers {
            observer(name);
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Box<dyn Filter>> {
        self.filters
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| Error::UnknownFilter(name.to_string()))
    }

    pub fn set_staging_from_settings(
        &mut self,
        name: &str,
        pairs: &[(String, String)],
    ) -> Result<()> {
        self.get_mut(name)?.set_staging_from_settings(pairs)?;
        self.notify(name);
        Ok(())
    }

    pub fn set_defaults_to_staging(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.set_defaults_to_staging();
        self.notify(name);
        Ok(())
    }

    pub fn apply_staging(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.apply_staging();
        Ok(())
    }

    pub fn set_defaults_to_staging_all(&mut self) {
        for filter in &mut self.filters {
            filter.set_defaults_to_staging();
        }
        let names = self.names();
        for name in names {
            self.notify(name);
        }
    }

    pub fn apply_staging_all(&mut self) {
        for filter in &mut self.filters {
            filter.apply_staging();
        }
    }

    pub fn apply_defaults_all(&mut self) {
        for filter in &mut self.filters {
            filter.apply_defaults();
        }
    }

    pub fn any_applied(&self) -> bool {
        self.filters.iter().any(|f| f.is_applied())
    }

    pub fn any_changes(&self) -> bool {
        self.filters.iter().any(|f| f.has_changes())
    }

    /// Run every applied filter's removal predicate, in registry order.
    pub fn apply_filters(&self, songs: &mut Vec<BeatmapDetails>) {
        let before = songs.len();
        for filter in &self.filters {
            filter.filter_song_list(songs);
        }
        debug!(before, after = songs.len(), "applied filter set");
    }

    /// Applied values of currently applied filters, for quick-filter saves.
    /// Filters without persistable settings (free text) are skipped.
    pub fn applied_snapshot(&self) -> Vec<FilterSettings> {
        self.filters
            .iter()
            .filter(|f| f.is_applied())
            .filter_map(|f| {
                let settings = f.applied_settings();
                (!settings.is_empty()).then(|| FilterSettings {
                    name: f.name().to_string(),
                    settings,
                })
            })
            .collect()
    }

    /// Stage and apply a saved quick filter: defaults first, then each saved
    /// filter's settings. Unknown filter names are skipped with a warning so
    /// one stale entry cannot poison the rest.
    pub fn load_quick_filter(&mut self, quick_filter: &QuickFilter) {
        self.set_defaults_to_staging_all();
        for fs in &quick_filter.filters {
            match self.set_staging_from_settings(&fs.name, &fs.settings) {
                Ok(()) => {}
                Err(e) => warn!(filter = %fs.name, error = %e, "skipping quick filter entry"),
            }
        }
        self.apply_staging_all();
    }
}
