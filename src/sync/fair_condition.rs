//! A condition variable with FIFO wakeup, paired with [`FairLock`].
//!
//! `wait` releases the lock and joins the condition's queue in one step, so
//! a broadcast issued after the waiter released the lock always reaches it.
//! Woken waiters reacquire the lock through the lock's own FIFO queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::fair_lock::{FairLock, FairLockGuard, Waiter};

/// Condition variable for use with a single [`FairLock`].
#[derive(Debug, Default)]
pub struct FairCondition {
    waiters: Mutex<VecDeque<Arc<Waiter>>>,
    /// Address of the lock this condition is used with, 0 until first wait.
    bound_to: AtomicUsize,
}

impl FairCondition {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_waiters(&self) -> MutexGuard<'_, VecDeque<Arc<Waiter>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bind<T>(&self, lock: &FairLock<T>) {
        let addr = lock as *const FairLock<T> as usize;
        if let Err(existing) =
            self.bound_to
                .compare_exchange(0, addr, Ordering::AcqRel, Ordering::Acquire)
        {
            assert_eq!(existing, addr, "FairCondition used with more than one FairLock");
        }
    }

    /// Release the lock, block until broadcast, then reacquire.
    ///
    /// Panics if this condition was previously used with a different lock.
    pub fn wait<'a, T>(&self, guard: FairLockGuard<'a, T>) -> FairLockGuard<'a, T> {
        self.bind(guard.lock());

        let mut waiters = self.lock_waiters();
        let waiter = Waiter::new();
        waiters.push_back(Arc::clone(&waiter));

        // Release while holding the queue so no broadcast slips in between.
        let lock = guard.into_lock();
        lock.release();
        waiter.block(waiters);

        lock.acquire()
    }

    /// Wait until `condition` returns false.
    pub fn wait_while<'a, T>(
        &self,
        mut guard: FairLockGuard<'a, T>,
        mut condition: impl FnMut(&mut T) -> bool,
    ) -> FairLockGuard<'a, T> {
        while condition(&mut guard) {
            guard = self.wait(guard);
        }
        guard
    }

    /// Wake every thread currently waiting, oldest first.
    ///
    /// Returns the number of threads woken.
    pub fn broadcast(&self) -> usize {
        let mut waiters = self.lock_waiters();
        let woken = waiters.len();
        for waiter in waiters.drain(..) {
            waiter.grant();
        }
        woken
    }

    /// Number of threads blocked in `wait`.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.lock_waiters().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_broadcast_without_waiters() {
        let cond = FairCondition::new();
        assert_eq!(cond.broadcast(), 0);
    }

    #[test]
    fn test_wait_releases_lock() {
        let lock = FairLock::new(false);
        let cond = FairCondition::new();

        thread::scope(|s| {
            s.spawn(|| {
                let ready = cond.wait_while(lock.acquire(), |ready| !*ready);
                assert!(*ready);
            });

            while cond.waiting() == 0 {
                thread::sleep(Duration::from_micros(50));
            }
            // The waiter gave the lock back while blocked.
            let mut guard = lock.try_acquire().expect("lock released by waiter");
            *guard = true;
            assert_eq!(cond.broadcast(), 1);
        });
    }

    #[test]
    #[should_panic(expected = "FairCondition used with more than one FairLock")]
    fn test_condition_bound_to_one_lock() {
        let first = FairLock::new(());
        let second = FairLock::new(());
        let cond = FairCondition::new();

        thread::scope(|s| {
            s.spawn(|| drop(cond.wait(first.acquire())));
            while cond.waiting() == 0 {
                thread::sleep(Duration::from_micros(50));
            }
            cond.broadcast();
        });
        drop(cond.wait(second.acquire()));
    }
}
