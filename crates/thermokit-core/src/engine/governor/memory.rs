use super::threads::JobEnvironment;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

pub const MIN_MEMORY_MB: u64 = 512;
pub const MAX_MEMORY_MB: u64 = 64 * 1024;
/// Assumed system memory when it cannot be determined.
pub const FALLBACK_SYSTEM_MEMORY_MB: u64 = 4096;
const MB: u64 = 1024 * 1024;

/// A byte count rendered with a binary unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
        if self.0 < 1024 {
            return write!(f, "{} B", self.0);
        }
        let mut value = self.0 as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        write!(f, "{value:.2} {}", UNITS[unit])
    }
}

pub fn format_memory_size(bytes: u64) -> String {
    ByteSize(bytes).to_string()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot reserve {requested}: {in_use} of {limit} already in use")]
pub struct MemoryError {
    pub requested: ByteSize,
    pub in_use: ByteSize,
    pub limit: ByteSize,
}

/// Tracks estimated memory held by in-flight work against a fixed ceiling.
#[derive(Debug)]
pub struct MemoryMonitor {
    limit: u64,
    current: AtomicU64,
    peak: AtomicU64,
}

impl MemoryMonitor {
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            limit: limit_bytes,
            current: AtomicU64::new(0),
            peak: AtomicU64::new(0),
        }
    }

    pub fn with_limit_mb(limit_mb: u64) -> Self {
        Self::new(limit_mb * MB)
    }

    /// Reserves `bytes` until the returned guard is dropped.
    pub fn try_reserve(&self, bytes: u64) -> Result<MemoryReservation<'_>, MemoryError> {
        let limit = self.limit;
        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(bytes).filter(|&next| next <= limit)
            })
            .map_err(|in_use| MemoryError {
                requested: ByteSize(bytes),
                in_use: ByteSize(in_use),
                limit: ByteSize(limit),
            })?;
        self.peak.fetch_max(previous + bytes, Ordering::AcqRel);
        Ok(MemoryReservation {
            monitor: self,
            bytes,
        })
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn peak(&self) -> u64 {
        self.peak.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// Scoped memory reservation; releases on drop.
#[derive(Debug)]
pub struct MemoryReservation<'a> {
    monitor: &'a MemoryMonitor,
    bytes: u64,
}

impl MemoryReservation<'_> {
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Drop for MemoryReservation<'_> {
    fn drop(&mut self) {
        self.monitor.current.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}

/// Share of system memory granted by default, scaled down under a batch scheduler.
pub fn default_limit_mb(system_memory_mb: u64, threads: usize, under_scheduler: bool) -> u64 {
    let mut fraction = match threads {
        0..=4 => 0.3,
        5..=8 => 0.4,
        9..=16 => 0.5,
        _ => 0.6,
    };
    if under_scheduler {
        fraction *= 0.7;
    }
    ((system_memory_mb as f64 * fraction) as u64).clamp(MIN_MEMORY_MB, MAX_MEMORY_MB)
}

/// The memory ceiling in MB for a run with `threads` workers.
///
/// An explicit request is honored but capped at 95% of a scheduler allocation.
pub fn resolve_limit_mb(requested: Option<u64>, threads: usize, env: &dyn JobEnvironment) -> u64 {
    match requested {
        Some(mb) => match env.scheduler_memory_mb() {
            Some(allocated) if mb > allocated * 95 / 100 => {
                let capped = allocated * 95 / 100;
                warn!(
                    "Memory limit {} exceeds 95% of the scheduler allocation ({}); using {}",
                    format_memory_size(mb * MB),
                    format_memory_size(allocated * MB),
                    format_memory_size(capped * MB)
                );
                capped.max(1)
            }
            _ => mb,
        },
        None => {
            let system = env.system_memory_mb().unwrap_or_else(|| {
                debug!("System memory unknown; assuming {FALLBACK_SYSTEM_MEMORY_MB} MB");
                FALLBACK_SYSTEM_MEMORY_MB
            });
            default_limit_mb(system, threads, env.under_scheduler())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::governor::threads::tests::FixedEnvironment;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn reservation_is_released_on_drop() {
        let monitor = MemoryMonitor::new(1000);
        {
            let guard = monitor.try_reserve(600).unwrap();
            assert_eq!(guard.bytes(), 600);
            assert_eq!(monitor.current(), 600);
        }
        assert_eq!(monitor.current(), 0);
        assert_eq!(monitor.peak(), 600);
    }

    #[test]
    fn reservation_past_limit_is_rejected() {
        let monitor = MemoryMonitor::new(1000);
        let _held = monitor.try_reserve(700).unwrap();
        let err = monitor.try_reserve(400).unwrap_err();
        assert_eq!(err.in_use, ByteSize(700));
        assert_eq!(err.limit, ByteSize(1000));
        assert_eq!(monitor.current(), 700);
        assert!(monitor.try_reserve(300).is_ok());
    }

    #[test]
    fn concurrent_reservations_never_exceed_limit() {
        let monitor = Arc::new(MemoryMonitor::new(10_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        if let Ok(_guard) = monitor.try_reserve(3000) {
                            assert!(monitor.current() <= 10_000);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(monitor.current(), 0);
        assert!(monitor.peak() <= 10_000);
    }

    #[test]
    fn default_limit_follows_thread_tiers() {
        assert_eq!(default_limit_mb(10_000, 4, false), 3000);
        assert_eq!(default_limit_mb(10_000, 8, false), 4000);
        assert_eq!(default_limit_mb(10_000, 16, false), 5000);
        assert_eq!(default_limit_mb(10_000, 32, false), 6000);
        assert_eq!(default_limit_mb(10_000, 4, true), 2100);
    }

    #[test]
    fn default_limit_is_clamped() {
        assert_eq!(default_limit_mb(1000, 1, false), MIN_MEMORY_MB);
        assert_eq!(default_limit_mb(1_000_000, 64, false), MAX_MEMORY_MB);
    }

    #[test]
    fn explicit_limit_is_capped_by_scheduler_allocation() {
        let env = FixedEnvironment {
            physical: 8,
            scheduler_memory_mb: Some(8000),
            under_scheduler: true,
            ..Default::default()
        };
        assert_eq!(resolve_limit_mb(Some(16_000), 8, &env), 7600);
        assert_eq!(resolve_limit_mb(Some(2000), 8, &env), 2000);
    }

    #[test]
    fn unknown_system_memory_uses_fallback() {
        let env = FixedEnvironment {
            physical: 4,
            ..Default::default()
        };
        assert_eq!(resolve_limit_mb(None, 4, &env), default_limit_mb(FALLBACK_SYSTEM_MEMORY_MB, 4, false));
    }

    #[test]
    fn sizes_are_formatted_with_binary_units() {
        assert_eq!(format_memory_size(512), "512 B");
        assert_eq!(format_memory_size(1536), "1.50 KB");
        assert_eq!(format_memory_size(512 * MB), "512.00 MB");
        assert_eq!(format_memory_size(3 * 1024 * MB), "3.00 GB");
    }
}
