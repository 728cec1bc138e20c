//! Completion tracking for dispatched jobs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::watch;

/// Tracks jobs that were dispatched but not yet accounted for.
///
/// The producer calls [`register`](Self::register) before a job enters the
/// queue and [`finish_enumeration`](Self::finish_enumeration) once it stops
/// listing. The aggregator calls [`account_for`](Self::account_for) once per
/// consumed result. Completion fires exactly once, when enumeration has
/// finished and nothing is outstanding.
#[derive(Debug)]
pub struct CompletionCoordinator {
    outstanding: AtomicUsize,
    dispatched: AtomicUsize,
    enumeration_finished: AtomicBool,
    fired: AtomicBool,
    done: watch::Sender<bool>,
}

impl CompletionCoordinator {
    pub fn new() -> Self {
        let (done, _) = watch::channel(false);
        Self {
            outstanding: AtomicUsize::new(0),
            dispatched: AtomicUsize::new(0),
            enumeration_finished: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            done,
        }
    }

    /// Counts a job about to be handed to the queue.
    pub fn register(&self) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Reverts a [`register`](Self::register) whose job never reached the queue.
    pub fn withdraw(&self) -> bool {
        self.dispatched.fetch_sub(1, Ordering::SeqCst);
        self.release()
    }

    /// Marks one result as consumed.
    ///
    /// Returns `true` if this call completed the work.
    pub fn account_for(&self) -> bool {
        self.release()
    }

    /// Marks enumeration as finished, successfully or not.
    ///
    /// Returns `true` if this call completed the work.
    pub fn finish_enumeration(&self) -> bool {
        self.enumeration_finished.store(true, Ordering::SeqCst);
        self.outstanding.load(Ordering::SeqCst) == 0 && self.fire()
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        *self.done.borrow()
    }

    /// Returns a receiver that observes `true` once the work is complete.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.done.subscribe()
    }

    fn release(&self) -> bool {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "more jobs accounted for than dispatched");

        previous == 1 && self.enumeration_finished.load(Ordering::SeqCst) && self.fire()
    }

    fn fire(&self) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        self.done.send_replace(true);
        true
    }
}

impl Default for CompletionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
