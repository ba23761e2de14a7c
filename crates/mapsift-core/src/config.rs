//! Runtime configuration for the loader and filter subsystems.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

/// Tunables for background work and suggestion behaviour. Loaded from a TOML
/// file when the host provides one, otherwise the documented defaults apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Where the on-disk details cache lives.
    pub cache_path: PathBuf,
    /// Slow-path resolutions started per tick.
    pub work_chunk_size: usize,
    /// Items examined per tick, even while slow-path work is outstanding.
    pub work_query_chunk_size: usize,
    /// Cache entries with a duration below this are incomplete and eligible
    /// for overwrite.
    pub incomplete_duration_epsilon: f32,
    /// Build steps granted to the active word index per tick.
    pub word_index_chunk_size: usize,
    /// Number of named quick filter slots.
    pub quick_filter_slots: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("UserData/mapsift/details_cache.json"),
            work_chunk_size: 10,
            work_query_chunk_size: 50,
            incomplete_duration_epsilon: 0.01,
            word_index_chunk_size: 200,
            quick_filter_slots: 10,
        }
    }
}

impl Config {
    /// Reads a TOML config. A missing file is not an error — defaults apply.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = toml::from_str(&raw)?;
        info!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/mapsift.toml")).unwrap();
        assert_eq!(config.work_chunk_size, 10);
        assert_eq!(config.quick_filter_slots, 10);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: Config = toml::from_str("work-chunk-size = 4").unwrap();
        assert_eq!(config.work_chunk_size, 4);
        assert_eq!(config.work_query_chunk_size, 50);
        assert!((config.incomplete_duration_epsilon - 0.01).abs() < f32::EPSILON);
    }
}
