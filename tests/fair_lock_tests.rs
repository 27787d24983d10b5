//! Fair lock tests.
//!
//! These tests check the ordering promise of the fair lock under real
//! contention: ownership passes to waiters in exactly the order they
//! started waiting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use dutch_blitz::sync::{FairCondition, FairLock, StartBarrier, TableLock};

/// Block until `n` threads are queued on `lock`.
fn wait_for_queue<T>(lock: &FairLock<T>, n: usize) {
    while lock.queue_len() < n {
        thread::yield_now();
    }
}

/// Test that queued acquirers get the lock in enqueue order.
#[test]
fn test_grants_in_enqueue_order() {
    let lock = FairLock::new(Vec::new());

    thread::scope(|s| {
        let guard = lock.acquire();
        for id in 0..8 {
            let lock = &lock;
            s.spawn(move || lock.acquire().push(id));
            wait_for_queue(lock, id + 1);
        }
        drop(guard);
    });

    assert_eq!(lock.into_inner(), (0..8).collect::<Vec<_>>());
}

/// Test that a thread arriving after a release cannot overtake the queue.
#[test]
fn test_late_arrival_does_not_barge() {
    let lock = FairLock::new(Vec::new());

    thread::scope(|s| {
        let guard = lock.acquire();
        let queued = &lock;
        s.spawn(move || queued.acquire().push("queued"));
        wait_for_queue(&lock, 1);

        // Release hands the lock straight to the queued thread.
        drop(guard);
        lock.acquire().push("late");
    });

    assert_eq!(lock.into_inner(), vec!["queued", "late"]);
}

/// Test that a releasing thread which acquires again queues behind the
/// threads already waiting.
#[test]
fn test_releaser_requeues_behind_waiters() {
    let lock = FairLock::new(Vec::new());

    thread::scope(|s| {
        let guard = lock.acquire();
        for (ahead, name) in ["a", "b"].into_iter().enumerate() {
            let lock = &lock;
            s.spawn(move || lock.acquire().push(name));
            wait_for_queue(lock, ahead + 1);
        }

        drop(guard);
        lock.acquire().push("main");
    });

    assert_eq!(lock.into_inner(), vec!["a", "b", "main"]);
}

/// Test that four threads contending in a loop all complete every turn.
#[test]
fn test_every_thread_gets_all_its_turns() {
    const THREADS: usize = 4;
    const TURNS: usize = 50;

    let lock = FairLock::new(Vec::new());
    let ready = StartBarrier::new(THREADS);

    thread::scope(|s| {
        for id in 0..THREADS {
            let lock = &lock;
            let ready = &ready;
            s.spawn(move || {
                assert!(ready.wait());
                for _ in 0..TURNS {
                    lock.acquire().push(id);
                }
            });
        }
    });

    let order = lock.into_inner();
    assert_eq!(order.len(), THREADS * TURNS);
    for id in 0..THREADS {
        assert_eq!(order.iter().filter(|&&x| x == id).count(), TURNS);
    }
}

/// Test that a broadcast wakes every waiter and each sees the update.
#[test]
fn test_condition_broadcast_wakes_all() {
    const WAITERS: usize = 5;

    let lock = FairLock::new(false);
    let cond = FairCondition::new();
    let woken = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..WAITERS {
            s.spawn(|| {
                let guard = cond.wait_while(lock.acquire(), |open| !*open);
                assert!(*guard);
                woken.fetch_add(1, Ordering::SeqCst);
            });
        }
        while cond.waiting() < WAITERS {
            thread::yield_now();
        }

        let mut guard = lock.acquire();
        *guard = true;
        assert_eq!(cond.broadcast(), WAITERS);
    });

    assert_eq!(woken.load(Ordering::SeqCst), WAITERS);
}

/// Test that a cancelled barrier releases the parties already waiting.
#[test]
fn test_barrier_cancel_releases_waiters() {
    let barrier = StartBarrier::new(4);

    thread::scope(|s| {
        let handles: Vec<_> = (0..2).map(|_| s.spawn(|| barrier.wait())).collect();
        barrier.cancel();
        for handle in handles {
            assert!(!handle.join().unwrap());
        }
    });
}

fn total_through<L: TableLock<u64>>() -> u64 {
    let lock = L::from_value(0);
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..1_000 {
                    lock.with_exclusive(|n| *n += 1);
                }
            });
        }
    });
    lock.into_value()
}

/// Test that both table lock variants serialize updates.
#[test]
fn test_table_lock_variants() {
    assert_eq!(total_through::<FairLock<u64>>(), 4_000);
    assert_eq!(total_through::<Mutex<u64>>(), 4_000);
}
