/*!
 * Wait Gate
 *
 * Broadcast release of an arbitrary number of concurrent waiters, with
 * optional per-waiter timeout, reusable indefinitely.
 *
 * # Design: One-Shot Resume Capability
 *
 * Each pending wait is represented by the sending half of a oneshot channel.
 * Sending consumes the sender, so an entry can resume its waiter at most once
 * no matter how a release races a timeout; the losing path's send lands in a
 * closed channel and is discarded.
 */

use crate::future::WaitFuture;
use crate::options::WaitOptions;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::trace;

/// One pending wait: the id it registered under and the capability to
/// resume it exactly once.
pub(crate) struct WaitEntry<T> {
    id: u64,
    resume: oneshot::Sender<Option<T>>,
}

/// State shared between gate handles and in-flight wait futures.
pub(crate) struct GateInner<T> {
    /// Pending entries in arrival order. Swapped out wholesale on release.
    pending: Mutex<Vec<WaitEntry<T>>>,
    /// Source of per-entry ids for timeout and cancellation removal.
    next_id: AtomicU64,
}

impl<T> GateInner<T> {
    /// Remove the entry registered under `id`, if it is still pending.
    ///
    /// Called by a wait future when its timeout elapses or when it is
    /// dropped unresolved. Returns `true` if the entry was removed and
    /// `false` if it was gone already, which means a release drained it
    /// first and its resumption is in flight.
    pub(crate) fn deregister(&self, id: u64) -> bool {
        let mut pending = self.pending.lock();
        if let Some(index) = pending.iter().position(|entry| entry.id == id) {
            pending.remove(index);
            trace!(id, "wait deregistered");
            true
        } else {
            false
        }
    }
}

/// A reusable async broadcast gate.
///
/// Any number of tasks can suspend on the gate via the `wait` family; a
/// single [`WaitGate::release`] resumes every wait pending at that moment
/// with the released value. Waits registered while a release is in flight
/// are kept for the next cycle. The gate holds no state between cycles.
///
/// Handles are cheap to clone and all refer to the same gate. Dropping the
/// last handle resolves every still-pending wait with no value.
///
/// # Examples
///
/// ```
/// use wait_gate::WaitGate;
///
/// # tokio_test::block_on(async {
/// let gate = WaitGate::new();
///
/// let first = gate.wait();
/// let second = gate.wait();
/// gate.release(7);
///
/// assert_eq!(first.await, Some(7));
/// assert_eq!(second.await, Some(7));
/// # });
/// ```
pub struct WaitGate<T> {
    inner: Arc<GateInner<T>>,
}

impl<T> WaitGate<T> {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GateInner {
                pending: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Wait until the gate is released.
    ///
    /// The returned future never times out; only a release (or destruction
    /// of the gate) resolves it.
    pub fn wait(&self) -> WaitFuture<T> {
        self.wait_with(WaitOptions::indefinite())
    }

    /// Wait until the gate is released or `timeout` elapses.
    ///
    /// Resolves with the released value, or with `None` once the timeout
    /// has elapsed. A zero timeout is valid and behaves as an immediate
    /// timeout unless a release is observed first.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitFuture<T> {
        self.wait_with(WaitOptions::timeout(timeout))
    }

    /// Wait with explicit [`WaitOptions`].
    ///
    /// The wait is registered at call time, before the returned future is
    /// first polled, so a release issued synchronously after this call
    /// always observes it.
    pub fn wait_with(&self, options: WaitOptions) -> WaitFuture<T> {
        let (resume, resolution) = oneshot::channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        self.inner.pending.lock().push(WaitEntry { id, resume });
        trace!(
            id,
            timeout = ?options.timeout,
            keep_alive = options.keep_alive,
            "wait registered"
        );

        WaitFuture::new(Arc::downgrade(&self.inner), id, resolution, options.timeout)
    }

    /// Release the gate, resuming every currently pending wait with `value`.
    ///
    /// The pending set is drained atomically: waits registered concurrently
    /// with this call are not resumed by it and stay pending for the next
    /// release. Releasing with no pending waits is a no-op.
    pub fn release(&self, value: T)
    where
        T: Clone,
    {
        let drained = std::mem::take(&mut *self.inner.pending.lock());
        trace!(waiters = drained.len(), "release");
        for entry in drained {
            // A closed channel means the waiter was dropped between the
            // drain and now; nothing left to resume.
            let _ = entry.resume.send(Some(value.clone()));
        }
    }

    /// Release the gate with no value.
    ///
    /// Every currently pending wait resolves with `None`, the same outcome
    /// an elapsed timeout produces.
    pub fn release_none(&self) {
        let drained = std::mem::take(&mut *self.inner.pending.lock());
        trace!(waiters = drained.len(), "release without value");
        for entry in drained {
            let _ = entry.resume.send(None);
        }
    }

    /// Number of currently pending waits (for diagnostics).
    pub fn waiter_count(&self) -> usize {
        self.inner.pending.lock().len()
    }
}

impl<T> Clone for WaitGate<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for WaitGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WaitGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitGate")
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
