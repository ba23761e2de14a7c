//! Quick filters: named snapshots of applied filter settings.
//!
//! Serialized as a two-level escaped-delimiter text line:
//!
//! ```text
//! name|filterA:k=v,k=v;filterB:k=v
//! ```
//!
//! `|` separates the name from the filter list, `;` separates filters, `:`
//! separates a filter's name from its settings, `,` and `=` separate the
//! settings. Every atom passes through one escape layer (backslash before a
//! delimiter or backslash, `\n` for a newline), which makes
//! `parse(serialize(x)) == x` hold for arbitrary names. Keys and values are
//! alphanumeric by construction, so only names ever exercise the escapes.

use std::path::PathBuf;

use ahash::AHashMap;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Upper bound on a quick filter's (unescaped) name, in characters.
pub const QUICK_FILTER_NAME_MAX: usize = 30;

const ESCAPED: &[char] = &['\\', '|', ';', ':', ',', '='];

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub name: String,
    pub settings: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickFilter {
    pub name: String,
    pub filters: Vec<FilterSettings>,
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\n' {
            out.push_str("\\n");
        } else if ESCAPED.contains(&ch) {
            out.push('\\');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => {
                return Err(Error::MalformedQuickFilter(
                    "dangling escape at end of input".to_string(),
                ));
            }
        }
    }
    Ok(out)
}

/// Split on unescaped occurrences of `delim`, leaving escapes intact for a
/// later [`unescape`] pass.
fn split_escaped(raw: &str, delim: char) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let current = parts.last_mut().expect("at least one part");
            current.push('\\');
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if ch == delim {
            parts.push(String::new());
        } else {
            parts.last_mut().expect("at least one part").push(ch);
        }
    }
    parts
}

impl QuickFilter {
    pub fn serialize(&self) -> String {
        let filters = self
            .filters
            .iter()
            .map(|fs| {
                let settings = fs
                    .settings
                    .iter()
                    .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}:{}", escape(&fs.name), settings)
            })
            .collect::<Vec<_>>()
            .join(";");

        format!("{}|{}", escape(&self.name), filters)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let parts = split_escaped(raw, '|');
        if parts.len() != 2 {
            return Err(Error::MalformedQuickFilter(format!(
                "expected one name separator, found {}",
                parts.len().saturating_sub(1)
            )));
        }

        let name = unescape(&parts[0])?;
        let name_len = name.chars().count();
        if name_len == 0 || name_len > QUICK_FILTER_NAME_MAX {
            return Err(Error::QuickFilterName {
                max: QUICK_FILTER_NAME_MAX,
            });
        }

        let mut filters = Vec::new();
        if !parts[1].is_empty() {
            for chunk in split_escaped(&parts[1], ';') {
                let pieces = split_escaped(&chunk, ':');
                if pieces.len() != 2 {
                    return Err(Error::MalformedQuickFilter(format!(
                        "bad filter entry {chunk:?}"
                    )));
                }

                let mut settings = Vec::new();
                if !pieces[1].is_empty() {
                    for pair in split_escaped(&pieces[1], ',') {
                        let kv = split_escaped(&pair, '=');
                        if kv.len() != 2 {
                            return Err(Error::MalformedQuickFilter(format!(
                                "bad setting {pair:?}"
                            )));
                        }
                        settings.push((unescape(&kv[0])?, unescape(&kv[1])?));
                    }
                }

                filters.push(FilterSettings {
                    name: unescape(&pieces[0])?,
                    settings,
                });
            }
        }

        Ok(Self { name, filters })
    }
}

/// Fixed-size named string slots, persisted through the host's config
/// key/value API. Slot `i` holds an empty string or one serialized quick
/// filter.
pub trait SlotStore: Send {
    fn read_slot(&self, index: usize) -> Option<String>;
    fn write_slot(&mut self, index: usize, value: &str);
}

pub struct MemorySlotStore {
    slots: Vec<String>,
}

impl MemorySlotStore {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![String::new(); slot_count],
        }
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, index: usize) -> Option<String> {
        self.slots.get(index).cloned()
    }

    fn write_slot(&mut self, index: usize, value: &str) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = value.to_string();
        }
    }
}

/// JSON-file-backed store for hosts without their own config API. The whole
/// table is rewritten on any mutation; write failures are logged, matching
/// config-store semantics.
pub struct FileSlotStore {
    path: PathBuf,
    slots: AHashMap<usize, String>,
}

impl FileSlotStore {
    pub fn new(path: PathBuf) -> Self {
        let slots = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<AHashMap<String, String>>(&raw) {
                Ok(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| {
                        k.strip_prefix("quickFilter")
                            .and_then(|i| i.parse().ok())
                            .map(|i: usize| (i, v))
                    })
                    .collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "quick filter store is malformed");
                    AHashMap::new()
                }
            },
            Err(_) => AHashMap::new(),
        };
        Self { path, slots }
    }

    fn flush(&self) {
        let map: AHashMap<String, String> = self
            .slots
            .iter()
            .map(|(i, v)| (format!("quickFilter{i}"), v.clone()))
            .collect();
        let json = match serde_json::to_string_pretty(&map) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize quick filter store");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "failed to write quick filter store");
        }
    }
}

impl SlotStore for FileSlotStore {
    fn read_slot(&self, index: usize) -> Option<String> {
        Some(self.slots.get(&index).cloned().unwrap_or_default())
    }

    fn write_slot(&mut self, index: usize, value: &str) {
        self.slots.insert(index, value.to_string());
        self.flush();
    }
}

/// Owns the slot table: loads it at startup, hands out parsed quick filters
/// and rewrites every slot on any mutation.
pub struct QuickFiltersManager {
    slots: Vec<Option<QuickFilter>>,
    store: Box<dyn SlotStore>,
}

impl QuickFiltersManager {
    pub fn new(store: Box<dyn SlotStore>, slot_count: usize) -> Self {
        let mut slots = Vec::with_capacity(slot_count);
        for index in 0..slot_count {
            let slot = match store.read_slot(index) {
                None => None,
                Some(raw) if raw.is_empty() => None,
                Some(raw) => match QuickFilter::parse(&raw) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        // Recoverable: one corrupt slot never takes down the
                        // rest of the table.
                        warn!(slot = index, error = %e, "discarding malformed quick filter");
                        None
                    }
                },
            };
            slots.push(slot);
        }
        Self { slots, store }
    }

    pub fn slots(&self) -> &[Option<QuickFilter>] {
        &self.slots
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Stores a new quick filter in the first empty slot.
    pub fn save(&mut self, name: &str, filters: Vec<FilterSettings>) -> Result<usize> {
        let name_len = name.chars().count();
        if name_len == 0 || name_len > QUICK_FILTER_NAME_MAX {
            return Err(Error::QuickFilterName {
                max: QUICK_FILTER_NAME_MAX,
            });
        }

        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::QuickFilterSlotsFull(self.slots.len()))?;

        self.slots[index] = Some(QuickFilter {
            name: name.to_string(),
            filters,
        });
        info!(slot = index, name, "saved quick filter");
        self.flush();
        Ok(index)
    }

    pub fn delete_slot(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.flush();
                true
            }
            _ => false,
        }
    }

    pub fn delete_by_name(&mut self, name: &str) -> bool {
        let found = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|qf| qf.name == name));
        match found {
            Some(index) => self.delete_slot(index),
            None => false,
        }
    }

    pub fn delete(&mut self, quick_filter: &QuickFilter) -> bool {
        let found = self
            .slots
            .iter()
            .position(|s| s.as_ref() == Some(quick_filter));
        match found {
            Some(index) => self.delete_slot(index),
            None => false,
        }
    }

    /// Whole-table rewrite; there is no partial or append persistence.
    fn flush(&mut self) {
        for (index, slot) in self.slots.iter().enumerate() {
            let serialized = slot.as_ref().map(QuickFilter::serialize).unwrap_or_default();
            self.store.write_slot(index, &serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> QuickFilter {
        QuickFilter {
            name: name.to_string(),
            filters: vec![
                FilterSettings {
                    name: "duration".to_string(),
                    settings: vec![
                        ("minEnabled".to_string(), "true".to_string()),
                        ("minSeconds".to_string(), "60".to_string()),
                    ],
                },
                FilterSettings {
                    name: "difficulty".to_string(),
                    settings: vec![("expertPlus".to_string(), "true".to_string())],
                },
            ],
        }
    }

    #[test]
    fn round_trip_plain_name() {
        let qf = sample("my filter");
        assert_eq!(QuickFilter::parse(&qf.serialize()).unwrap(), qf);
    }

    #[test]
    fn round_trip_with_escape_trigger_characters() {
        // Every delimiter, the backslash and a newline, all in the name.
        let qf = sample("a|b;c:d,e=f\\g\nh");
        let serialized = qf.serialize();
        assert_eq!(QuickFilter::parse(&serialized).unwrap(), qf);
    }

    #[test]
    fn round_trip_empty_filter_list() {
        let qf = QuickFilter {
            name: "empty".to_string(),
            filters: Vec::new(),
        };
        assert_eq!(QuickFilter::parse(&qf.serialize()).unwrap(), qf);
    }

    #[test]
    fn rejects_oversized_names() {
        let long_name = "x".repeat(QUICK_FILTER_NAME_MAX + 1);
        let qf = sample(&long_name);
        assert!(QuickFilter::parse(&qf.serialize()).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(QuickFilter::parse("no separators here").is_err());
        assert!(QuickFilter::parse("name|bad entry").is_err());
        assert!(QuickFilter::parse("name|f:k").is_err());
        assert!(QuickFilter::parse("name|f:k=v\\").is_err());
    }

    #[test]
    fn manager_saves_into_first_empty_slot() {
        let mut manager = QuickFiltersManager::new(Box::new(MemorySlotStore::new(3)), 3);

        assert_eq!(manager.save("one", sample("x").filters).unwrap(), 0);
        assert_eq!(manager.save("two", sample("x").filters).unwrap(), 1);
        assert!(manager.delete_by_name("one"));
        // Freed slot 0 is reused before slot 2.
        assert_eq!(manager.save("three", sample("x").filters).unwrap(), 0);
    }

    #[test]
    fn manager_reports_full_table() {
        let mut manager = QuickFiltersManager::new(Box::new(MemorySlotStore::new(1)), 1);
        manager.save("only", Vec::new()).unwrap();
        assert!(manager.is_full());
        assert!(matches!(
            manager.save("extra", Vec::new()),
            Err(Error::QuickFilterSlotsFull(1))
        ));
    }

    #[test]
    fn manager_round_trips_through_the_store() {
        let mut store = MemorySlotStore::new(2);
        {
            let mut manager = QuickFiltersManager::new(Box::new(MemorySlotStore::new(2)), 2);
            manager.save("persisted", sample("x").filters).unwrap();
            // Copy what the manager wrote into our outer store.
            store.write_slot(0, &manager.slots()[0].as_ref().unwrap().serialize());
        }

        let reloaded = QuickFiltersManager::new(Box::new(store), 2);
        let first = reloaded.slots()[0].as_ref().unwrap();
        assert_eq!(first.name, "persisted");
        assert_eq!(first.filters.len(), 2);
    }

    #[test]
    fn manager_discards_malformed_slots() {
        let mut store = MemorySlotStore::new(2);
        store.write_slot(0, "garbage without separators");
        store.write_slot(1, &sample("ok").serialize());

        let manager = QuickFiltersManager::new(Box::new(store), 2);
        assert!(manager.slots()[0].is_none());
        assert!(manager.slots()[1].is_some());
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quick_filters.json");

        {
            let mut store = FileSlotStore::new(path.clone());
            store.write_slot(0, &sample("saved").serialize());
            store.write_slot(1, "");
        }

        let store = FileSlotStore::new(path);
        let raw = store.read_slot(0).unwrap();
        assert_eq!(QuickFilter::parse(&raw).unwrap().name, "saved");
        assert_eq!(store.read_slot(1).unwrap(), "");
    }
}
