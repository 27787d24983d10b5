//! Synchronization primitives with FIFO fairness.
//!
//! - [`FairLock`]: mutual exclusion with direct hand-off to the oldest waiter
//! - [`FairCondition`]: condition variable whose waiters queue in FIFO order
//! - [`StartBarrier`]: cancellable rendezvous built from the two above
//!
//! [`TableLock`] abstracts over "a lock around the game table" so the
//! orchestrator can run on either the fair lock or `std::sync::Mutex`.

mod fair_condition;
mod fair_lock;
mod start_barrier;

pub use fair_condition::FairCondition;
pub use fair_lock::{FairLock, FairLockGuard};
pub use start_barrier::StartBarrier;

use std::sync::{Mutex, PoisonError};

/// A lock owning a value that player tasks take turns mutating.
pub trait TableLock<T>: Sync {
    /// Wrap `value` in a new unlocked lock.
    fn from_value(value: T) -> Self
    where
        Self: Sized;

    /// Run `f` with exclusive access.
    fn with_exclusive<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;

    /// Take the value back once every task is done.
    fn into_value(self) -> T
    where
        Self: Sized;
}

impl<T: Send> TableLock<T> for FairLock<T> {
    fn from_value(value: T) -> Self {
        FairLock::new(value)
    }

    fn with_exclusive<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut *guard)
    }

    fn into_value(self) -> T {
        self.into_inner()
    }
}

/// The plain variant: no ordering promise among waiters.
impl<T: Send> TableLock<T> for Mutex<T> {
    fn from_value(value: T) -> Self {
        Mutex::new(value)
    }

    fn with_exclusive<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }

    fn into_value(self) -> T {
        self.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
