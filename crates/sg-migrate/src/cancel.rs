//! Cooperative cancellation for migration runs.

use sg_db::InterruptFn;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared flag that aborts a migration run.
///
/// Clones observe the same flag. The migrator checks it between steps and,
/// while its transaction is open, registers the store's interrupt handle here
/// so [`cancel`](Self::cancel) also aborts the statement in flight.
/// Cancellation is permanent for the token.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    interrupts: Mutex<Vec<(u64, InterruptFn)>>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and interrupt any registered in-flight work.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let interrupts = self
            .inner
            .interrupts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, interrupt) in interrupts.iter() {
            interrupt();
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Register an interrupt for the lifetime of the returned guard.
    pub(crate) fn register(&self, interrupt: InterruptFn) -> InterruptRegistration<'_> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .interrupts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, interrupt));

        // cancel() may have run before the push
        if self.is_cancelled() {
            let interrupts = self
                .inner
                .interrupts
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some((_, interrupt)) = interrupts.iter().find(|(i, _)| *i == id) {
                interrupt();
            }
        }
        InterruptRegistration { token: self, id }
    }

    fn registered(&self) -> usize {
        self.inner
            .interrupts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .field("interrupts", &self.registered())
            .finish()
    }
}

/// Removes its interrupt from the token when dropped.
pub(crate) struct InterruptRegistration<'t> {
    token: &'t CancelToken,
    id: u64,
}

impl Drop for InterruptRegistration<'_> {
    fn drop(&mut self) {
        self.token
            .inner
            .interrupts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| *id != self.id);
    }
}

/// Cancels the token on drop unless disarmed; ties a run to its future.
pub(crate) struct CancelOnDrop {
    token: CancelToken,
    armed: bool,
}

impl CancelOnDrop {
    pub(crate) fn new(token: CancelToken) -> Self {
        Self { token, armed: true }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            log::debug!("Migration future dropped before completion; cancelling");
            self.token.cancel();
        }
    }
}

#[cfg(test)]
#[path = "cancel_test.rs"]
mod tests;
