//! Synchronization primitives for gbt.
//!
//! The worker engine itself takes no locks on repository state: each task owns
//! its state and hands it back through its join handle. What remains here is
//! the process-wide limit on concurrently running git processes and the busy
//! flag a task clears when it finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use crossbeam_channel as chan;

/// A counting semaphore for limiting concurrency.
///
/// Every repository runs its git command on its own thread, so a large
/// repository list would otherwise spawn that many `git` processes at once.
/// Provides RAII-based permit management through [`SemaphoreGuard`].
#[derive(Clone)]
pub struct Semaphore {
    state: Arc<(Mutex<usize>, Condvar)>,
}

/// RAII guard that releases a semaphore permit on drop.
///
/// Created by [`Semaphore::acquire`]. The permit is released when this guard
/// is dropped, even if the holder panics.
pub struct SemaphoreGuard {
    state: Arc<(Mutex<usize>, Condvar)>,
}

impl Semaphore {
    /// Create a new semaphore with the given number of permits.
    ///
    /// A semaphore with zero permits would block forever, so at least one
    /// permit is always granted.
    pub fn new(permits: usize) -> Self {
        Self {
            state: Arc::new((Mutex::new(permits.max(1)), Condvar::new())),
        }
    }

    /// Acquire a permit, blocking until one is available.
    pub fn acquire(&self) -> SemaphoreGuard {
        let (lock, cvar) = &*self.state;
        // The counter is a plain integer; a panic while holding the lock
        // cannot leave it half-updated.
        let mut available = lock.lock().unwrap_or_else(PoisonError::into_inner);

        while *available == 0 {
            available = cvar
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }

        *available -= 1;

        SemaphoreGuard {
            state: Arc::clone(&self.state),
        }
    }
}

impl Drop for SemaphoreGuard {
    fn drop(&mut self) {
        let (lock, cvar) = &*self.state;
        let mut available = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *available += 1;
        cvar.notify_one();
    }
}

/// Shared "operation in flight" flag for one worker.
///
/// The coordinating thread only ever reads it; the worker's task clears it
/// through a [`CompletionGuard`].
#[derive(Clone, Debug, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the worker busy and return the guard its task must hold.
    pub(crate) fn raise(
        &self,
        worker_id: usize,
        notify: Option<chan::Sender<usize>>,
    ) -> CompletionGuard {
        self.0.store(true, Ordering::Release);
        CompletionGuard {
            flag: self.clone(),
            worker_id,
            notify,
        }
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clears a [`BusyFlag`] and announces completion when dropped.
///
/// Held by the task thread for the whole operation, so the flag drops back to
/// idle even if the operation panics. The notification is sent after the flag
/// is cleared: a receiver that wakes on it always observes the worker idle.
pub struct CompletionGuard {
    flag: BusyFlag,
    worker_id: usize,
    notify: Option<chan::Sender<usize>>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.flag.clear();
        if let Some(tx) = self.notify.take() {
            // Receiver gone means nobody is waiting for progress.
            let _ = tx.send(self.worker_id);
        }
    }
}
