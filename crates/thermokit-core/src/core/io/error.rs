use super::program::ProgramKind;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),
    #[error("Unknown element '{0}'")]
    UnknownElement(String),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("No loader available for {0} output")]
    Unsupported(ProgramKind),
}

impl LoadError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: line + 1,
            message: message.into(),
        }
    }
}
