//! External metadata provider boundary.
//!
//! The provider is an optional collaborator (typically another mod's song
//! database) answering synchronous lookups. Failures never abort a batch:
//! each status is tallied and the affected level falls through to the
//! slow-path scan.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

use crate::level_source::LevelHandle;
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
    NoData,
    InvalidBpm,
    InvalidDuration,
    InvalidCharacteristic,
    InvalidDifficulty,
    Exception,
}

pub trait MetadataProvider: Send + Sync {
    fn fetch(&self, handle: &LevelHandle) -> Result<BeatmapDetails, ProviderError>;
}

/// Always answers [`ProviderError::NoData`]; used when no provider mod is
/// installed.
pub struct NoProvider;

impl MetadataProvider for NoProvider {
    fn fetch(&self, _handle: &LevelHandle) -> Result<BeatmapDetails, ProviderError> {
        Err(ProviderError::NoData)
    }
}

/// Per-batch counters, logged once per batch rather than once per item to
/// avoid flooding the log.
#[derive(Debug, Default)]
pub struct ProviderTally {
    no_data: AtomicUsize,
    invalid_bpm: AtomicUsize,
    invalid_duration: AtomicUsize,
    invalid_characteristic: AtomicUsize,
    invalid_difficulty: AtomicUsize,
    exception: AtomicUsize,
    incomplete: AtomicUsize,
}

impl ProviderTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&self, error: ProviderError) {
        let counter = match error {
            ProviderError::NoData => &self.no_data,
            ProviderError::InvalidBpm => &self.invalid_bpm,
            ProviderError::InvalidDuration => &self.invalid_duration,
            ProviderError::InvalidCharacteristic => &self.invalid_characteristic,
            ProviderError::InvalidDifficulty => &self.invalid_difficulty,
            ProviderError::Exception => &self.exception,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Provider answered, but the record failed the completeness heuristic.
    /// A data-quality signal, not an error.
    pub fn record_incomplete(&self) {
        self.incomplete.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> usize {
        [
            &self.no_data,
            &self.invalid_bpm,
            &self.invalid_duration,
            &self.invalid_characteristic,
            &self.invalid_difficulty,
            &self.exception,
            &self.incomplete,
        ]
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .sum()
    }

    pub fn log_summary(&self, batch: &str) {
        if self.total() == 0 {
            return;
        }
        info!(
            batch,
            no_data = self.no_data.load(Ordering::Relaxed),
            invalid_bpm = self.invalid_bpm.load(Ordering::Relaxed),
            invalid_duration = self.invalid_duration.load(Ordering::Relaxed),
            invalid_characteristic = self.invalid_characteristic.load(Ordering::Relaxed),
            invalid_difficulty = self.invalid_difficulty.load(Ordering::Relaxed),
            exception = self.exception.load(Ordering::Relaxed),
            incomplete = self.incomplete.load(Ordering::Relaxed),
            "metadata provider fallbacks for batch"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_accumulates_per_status() {
        let tally = ProviderTally::new();
        tally.record_error(ProviderError::NoData);
        tally.record_error(ProviderError::NoData);
        tally.record_error(ProviderError::Exception);
        tally.record_incomplete();
        assert_eq!(tally.total(), 4);
    }
}
