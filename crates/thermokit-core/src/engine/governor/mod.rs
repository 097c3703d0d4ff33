//! # Resource Governor
//!
//! Shared limits for everything that runs concurrently: estimated memory, open input files,
//! worker threads, plus the collector that gathers diagnostics from all workers.
//!
//! - [`memory`] - [`memory::MemoryMonitor`] with scoped reservations and the default ceiling
//! - [`throttle`] - [`throttle::FileHandleThrottle`], a blocking counting guard
//! - [`diagnostics`] - [`diagnostics::DiagnosticsCollector`] for warnings and errors
//! - [`threads`] - Job-environment detection and thread-count reconciliation

pub mod diagnostics;
pub mod memory;
pub mod threads;
pub mod throttle;

use self::diagnostics::DiagnosticsCollector;
use self::memory::{MemoryMonitor, format_memory_size, resolve_limit_mb};
use self::threads::{JobEnvironment, ThreadDecision, reconcile_threads};
use self::throttle::FileHandleThrottle;
use super::config::ExecutionConfig;
use tracing::info;

/// One governor is shared by every file of an invocation.
#[derive(Debug)]
pub struct ResourceGovernor {
    pub memory: MemoryMonitor,
    pub files: FileHandleThrottle,
    pub diagnostics: DiagnosticsCollector,
    pub threads: ThreadDecision,
}

impl ResourceGovernor {
    pub fn new(execution: &ExecutionConfig, env: &dyn JobEnvironment) -> Self {
        let threads = reconcile_threads(execution.threads, env);
        let limit_mb = resolve_limit_mb(execution.memory_limit_mb, threads.threads, env);
        let memory = MemoryMonitor::with_limit_mb(limit_mb);
        info!(
            threads = threads.threads,
            memory_limit = %format_memory_size(memory.limit()),
            max_open_files = execution.max_open_files,
            "Resource limits resolved"
        );
        let diagnostics = DiagnosticsCollector::new();
        if threads.downgraded {
            diagnostics.warning(None, threads.notice.clone());
        }
        Self {
            memory,
            files: FileHandleThrottle::new(execution.max_open_files),
            diagnostics,
            threads,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.threads.threads
    }
}

#[cfg(test)]
mod tests {
    use super::threads::tests::FixedEnvironment;
    use super::*;
    use crate::engine::config::ThermoConfig;

    #[test]
    fn downgraded_thread_request_is_recorded_as_warning() {
        let config = ThermoConfig::builder().threads(32).build().unwrap();
        let env = FixedEnvironment {
            physical: 4,
            system_memory_mb: Some(16_000),
            ..Default::default()
        };
        let governor = ResourceGovernor::new(&config.execution, &env);
        assert_eq!(governor.thread_count(), 4);
        assert_eq!(governor.diagnostics.warnings().len(), 1);
        assert_eq!(governor.memory.limit(), 4800 * 1024 * 1024);
        assert_eq!(governor.files.limit(), 100);
    }
}
