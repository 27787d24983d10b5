//! A mutual-exclusion lock with strict FIFO hand-off.
//!
//! `std::sync::Mutex` makes no promise about which blocked thread runs next;
//! a thread that just released the lock can grab it again before anyone it
//! woke gets scheduled. With four equally aggressive players that lets one
//! player starve the rest.
//!
//! `FairLock` queues blocked acquirers and, on release, hands ownership to
//! the head of the queue directly. The lock never becomes free while someone
//! is waiting, so a late arrival cannot overtake a queued one.
//!
//! ## Example
//!
//! ```
//! use dutch_blitz::sync::FairLock;
//!
//! let lock = FairLock::new(0u32);
//! {
//!     let mut guard = lock.acquire();
//!     *guard += 1;
//! }
//! assert_eq!(lock.into_inner(), 1);
//! ```

use std::cell::UnsafeCell;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// One blocked thread. Lives in exactly one queue until granted.
#[derive(Debug)]
pub(super) struct Waiter {
    granted: AtomicBool,
    wakeup: Condvar,
}

impl Waiter {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self {
            granted: AtomicBool::new(false),
            wakeup: Condvar::new(),
        })
    }

    /// Block until `grant` is called. `guard` protects the queue this waiter
    /// was pushed onto and is released while sleeping.
    pub(super) fn block<S>(&self, mut guard: MutexGuard<'_, S>) {
        while !self.granted.load(Ordering::Acquire) {
            guard = self
                .wakeup
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Must be called with the owning queue's mutex held.
    pub(super) fn grant(&self) {
        self.granted.store(true, Ordering::Release);
        self.wakeup.notify_one();
    }
}

#[derive(Debug, Default)]
struct LockState {
    held: bool,
    queue: VecDeque<Arc<Waiter>>,
}

/// FIFO-fair lock protecting a value of type `T`.
pub struct FairLock<T> {
    state: Mutex<LockState>,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is serialized by the held flag; only the single
// owner of a `FairLockGuard` can reach it.
unsafe impl<T: Send> Send for FairLock<T> {}
unsafe impl<T: Send> Sync for FairLock<T> {}

impl<T> FairLock<T> {
    /// Create an unlocked lock around `value`.
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            data: UnsafeCell::new(value),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the lock, blocking behind every earlier waiter.
    ///
    /// A free lock is taken immediately without queueing.
    pub fn acquire(&self) -> FairLockGuard<'_, T> {
        let mut state = self.lock_state();
        if state.held {
            let waiter = Waiter::new();
            state.queue.push_back(Arc::clone(&waiter));
            // Ownership is handed over by `release`; `held` stays true.
            waiter.block(state);
        } else {
            state.held = true;
        }
        FairLockGuard::new(self)
    }

    /// Acquire the lock only if it is free right now.
    pub fn try_acquire(&self) -> Option<FairLockGuard<'_, T>> {
        let mut state = self.lock_state();
        if state.held {
            None
        } else {
            state.held = true;
            Some(FairLockGuard::new(self))
        }
    }

    /// Pass ownership to the oldest waiter, or mark the lock free.
    pub(super) fn release(&self) {
        let mut state = self.lock_state();
        match state.queue.pop_front() {
            Some(next) => next.grant(),
            None => state.held = false,
        }
    }

    /// Number of threads blocked in `acquire`.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.lock_state().queue.len()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.lock_state().held
    }

    /// Mutable access without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: Default> Default for FairLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> std::fmt::Debug for FairLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("FairLock")
            .field("held", &state.held)
            .field("waiters", &state.queue.len())
            .finish_non_exhaustive()
    }
}

/// Exclusive access to the value behind a [`FairLock`]. Dropping the guard
/// releases the lock.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct FairLockGuard<'a, T> {
    lock: &'a FairLock<T>,
    // Shares like `&mut T`: Sync only when `T` is.
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> FairLockGuard<'a, T> {
    fn new(lock: &'a FairLock<T>) -> Self {
        Self {
            lock,
            _marker: PhantomData,
        }
    }

    /// The lock this guard belongs to.
    pub(super) fn lock(&self) -> &'a FairLock<T> {
        self.lock
    }

    /// Give up the guard without releasing; the caller takes over the
    /// obligation to call `release`.
    pub(super) fn into_lock(self) -> &'a FairLock<T> {
        let lock = self.lock;
        std::mem::forget(self);
        lock
    }
}

impl<T> Deref for FairLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard proves ownership of the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for FairLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves ownership of the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for FairLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
