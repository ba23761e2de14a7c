use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Failed to write cache file {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize details cache: {0}")]
    CacheSerialize(#[source] serde_json::Error),
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Failed to read level file {path}: {source}")]
    LevelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse level file {path}: {source}")]
    LevelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown difficulty name {0:?}")]
    UnknownDifficulty(String),
    #[error("Unknown filter {0:?}")]
    UnknownFilter(String),
    #[error("Invalid setting {key}={value:?} for filter {filter}")]
    InvalidSetting {
        filter: &'static str,
        key: String,
        value: String,
    },
    #[error("Malformed quick filter: {0}")]
    MalformedQuickFilter(String),
    #[error("Quick filter name must be 1..={max} characters")]
    QuickFilterName { max: usize },
    #[error("All {0} quick filter slots are occupied")]
    QuickFilterSlotsFull(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
