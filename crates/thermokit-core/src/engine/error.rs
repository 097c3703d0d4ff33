use super::config::ConfigError;
use super::governor::memory::MemoryError;
use crate::core::io::LoadError;
use crate::core::symmetry::GeometryError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to load {}: {source}", .path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("No atoms loaded")]
    NoAtomsLoaded,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Failed to write {}: {source}", .path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(#[from] MemoryError),

    #[error("Cancelled before processing started")]
    Cancelled,
}

impl From<GeometryError> for EngineError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::NoAtoms => EngineError::NoAtomsLoaded,
        }
    }
}

impl EngineError {
    pub fn load(path: impl Into<PathBuf>, source: LoadError) -> Self {
        EngineError::LoadFailure {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::OutputWriteFailure {
            path: path.into(),
            source,
        }
    }
}
