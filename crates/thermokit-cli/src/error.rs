use std::path::PathBuf;
use thermokit::engine::config::ConfigError;
use thermokit::engine::error::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read settings file '{path}': {source}", path = path.display())]
    SettingsFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{failed} of {total} input(s) failed:\n{details}")]
    RunFailed {
        failed: usize,
        total: usize,
        details: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
