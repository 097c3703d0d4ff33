use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The input the diagnostic concerns, if any.
    pub source: Option<PathBuf>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(path) => write!(f, "File {}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Thread-safe sink for warnings and errors raised while processing many files.
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, severity: Severity, source: Option<&Path>, message: impl Into<String>) {
        self.entries().push(Diagnostic {
            severity,
            source: source.map(Path::to_path_buf),
            message: message.into(),
        });
    }

    pub fn warning(&self, source: Option<&Path>, message: impl Into<String>) {
        self.push(Severity::Warning, source, message);
    }

    pub fn error(&self, source: Option<&Path>, message: impl Into<String>) {
        self.push(Severity::Error, source, message);
    }

    fn filtered(&self, severity: Severity) -> Vec<Diagnostic> {
        self.entries()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.filtered(Severity::Warning)
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.filtered(Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.entries().iter().any(|d| d.severity == Severity::Error)
    }

    /// Every diagnostic in the order it was recorded.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
