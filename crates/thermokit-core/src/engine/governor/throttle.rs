use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub const DEFAULT_MAX_OPEN_FILES: usize = 100;

/// Bounds the number of input files open at once.
#[derive(Debug)]
pub struct FileHandleThrottle {
    limit: usize,
    open: Mutex<usize>,
    released: Condvar,
}

impl FileHandleThrottle {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            open: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until a handle is free.
    pub fn acquire(&self) -> FileHandleGuard<'_> {
        let mut open = self
            .released
            .wait_while(self.lock(), |open| *open >= self.limit)
            .unwrap_or_else(PoisonError::into_inner);
        *open += 1;
        FileHandleGuard { throttle: self }
    }

    pub fn in_use(&self) -> usize {
        *self.lock()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for FileHandleThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OPEN_FILES)
    }
}

#[derive(Debug)]
pub struct FileHandleGuard<'a> {
    throttle: &'a FileHandleThrottle,
}

impl Drop for FileHandleGuard<'_> {
    fn drop(&mut self) {
        *self.throttle.lock() -= 1;
        self.throttle.released.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn guard_releases_on_drop() {
        let throttle = FileHandleThrottle::new(2);
        let first = throttle.acquire();
        let second = throttle.acquire();
        assert_eq!(throttle.in_use(), 2);
        drop(first);
        drop(second);
        assert_eq!(throttle.in_use(), 0);
    }

    #[test]
    fn guard_releases_when_holder_panics() {
        let throttle = Arc::new(FileHandleThrottle::new(1));
        let worker = Arc::clone(&throttle);
        let result = thread::spawn(move || {
            let _guard = worker.acquire();
            panic!("loader failure");
        })
        .join();
        assert!(result.is_err());
        assert_eq!(throttle.in_use(), 0);
    }

    #[test]
    fn concurrent_holders_never_exceed_limit() {
        let throttle = Arc::new(FileHandleThrottle::new(3));
        let high_water = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..12)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                let high_water = Arc::clone(&high_water);
                thread::spawn(move || {
                    let _guard = throttle.acquire();
                    high_water.fetch_max(throttle.in_use(), Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(high_water.load(Ordering::SeqCst) <= 3);
        assert_eq!(throttle.in_use(), 0);
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        assert_eq!(FileHandleThrottle::new(0).limit(), 1);
    }
}
