use std::path::PathBuf;

/// Errors raised while reading or validating level data.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("tube holds {len} units but capacity is {capacity}")]
    TubeOverCapacity { len: usize, capacity: usize },

    #[error("unrecognised color label {0:?}")]
    BadColor(String),

    #[error("level {level}: lock refers to tube {tube} but the level has {tube_count} tubes")]
    LockOutOfRange {
        level: String,
        tube: usize,
        tube_count: usize,
    },

    #[error("level {level}, tube {tube}: {source}")]
    InvalidTube {
        level: String,
        tube: usize,
        #[source]
        source: Box<LevelError>,
    },

    #[error("duplicate level id {0:?}")]
    DuplicateId(String),

    #[error("level set is empty")]
    Empty,

    #[error("failed to read level file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse level TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors from the stats file. Callers log these rather than propagate them.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("I/O error on stats file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
