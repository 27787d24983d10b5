//! One-shot start barrier built on [`FairLock`] and [`FairCondition`].
//!
//! Player tasks meet here so they all make their first move at about the
//! same time. Unlike `std::sync::Barrier` it can be cancelled, which lets the
//! orchestrator release the tasks it already spawned when a later spawn
//! fails.

use super::{FairCondition, FairLock};

#[derive(Debug, Default)]
struct Arrivals {
    arrived: usize,
    open: bool,
    cancelled: bool,
}

/// A single-use rendezvous for a fixed number of parties.
#[derive(Debug)]
pub struct StartBarrier {
    parties: usize,
    arrivals: FairLock<Arrivals>,
    released: FairCondition,
}

impl StartBarrier {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "barrier needs at least one party");
        Self {
            parties,
            arrivals: FairLock::default(),
            released: FairCondition::new(),
        }
    }

    /// Block until all parties have arrived.
    ///
    /// Returns `false` if the barrier was cancelled instead.
    pub fn wait(&self) -> bool {
        let mut arrivals = self.arrivals.acquire();
        arrivals.arrived += 1;
        if arrivals.arrived >= self.parties {
            arrivals.open = true;
            self.released.broadcast();
        }
        let arrivals = self
            .released
            .wait_while(arrivals, |a| !a.open && !a.cancelled);
        !arrivals.cancelled
    }

    /// Release every current and future waiter with a `false` result.
    pub fn cancel(&self) {
        let mut arrivals = self.arrivals.acquire();
        arrivals.cancelled = true;
        self.released.broadcast();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_all_parties_pass() {
        let barrier = StartBarrier::new(4);
        let passed = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    if barrier.wait() {
                        passed.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(passed.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_cancel_releases_waiters() {
        let barrier = StartBarrier::new(3);

        thread::scope(|s| {
            let first = s.spawn(|| barrier.wait());
            let second = s.spawn(|| barrier.wait());
            while barrier.released.waiting() < 2 {
                thread::yield_now();
            }
            barrier.cancel();
            assert!(!first.join().unwrap());
            assert!(!second.join().unwrap());
        });

        // Late arrivals see the cancellation too.
        assert!(!barrier.wait());
    }
}
