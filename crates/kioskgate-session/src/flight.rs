//! The in-flight guard.
//!
//! [`FlightFlag`] is a shared boolean that says "a lookup is running".
//! It is taken with a single compare-and-swap and released by dropping the
//! [`FlightGuard`], so every exit path (success, failure, timeout, a
//! cancelled future, a panic) puts it back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "lookup in flight" flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct FlightFlag {
    held: Arc<AtomicBool>,
}

impl FlightFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the flag if it is free.
    ///
    /// Returns `None` when another guard is alive.
    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                held: Arc::clone(&self.held),
            })
    }

    /// Returns `true` while a guard is alive.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the in-flight flag. Releases it on drop.
#[derive(Debug)]
pub struct FlightGuard {
    held: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
