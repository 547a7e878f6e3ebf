/*!
 * Wait Future
 *
 * The suspended half of a wait: resolves with the released value, or with no
 * value once its timeout elapses or its entry is destroyed.
 *
 * # Design: Timer Inside the Future
 *
 * The timeout is an inert duration until the future is first polled, at
 * which point it is armed as a boxed [`Sleep`]. Keeping the timer inside the
 * future means registration needs no runtime handle, and a release cancels
 * the timer implicitly: a resolved future simply never polls its sleep
 * again.
 */

use crate::gate::GateInner;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{sleep, Sleep};
use tracing::trace;

/// Timeout state of a wait. Bounded waits arm their sleep lazily so that a
/// wait can be registered outside a runtime context.
enum TimerState {
    /// Unbounded wait; no timer will ever be armed.
    Unbounded,
    /// Bounded wait; armed with the stored duration on first poll.
    Unarmed(Duration),
    /// Ticking timer.
    Armed(Pin<Box<Sleep>>),
}

/// Future returned by the [`WaitGate`](crate::WaitGate) `wait` family.
///
/// Resolves to `Some(value)` when a release carrying a value captures this
/// wait, and to `None` when the wait times out, is released without a value,
/// or its entry is destroyed (for example because the last gate handle was
/// dropped). Resolution happens exactly once and is never an error.
///
/// The resume channel is polled before the timeout, so when a zero timeout
/// and a release land in the same tick, a release the gate has already
/// observed wins over the elapsed timer.
///
/// As with any future, the timeout clock only advances while the future is
/// being polled. Dropping an unresolved `WaitFuture` unregisters the wait
/// from its gate.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WaitFuture<T> {
    gate: Weak<GateInner<T>>,
    id: u64,
    resolution: oneshot::Receiver<Option<T>>,
    timer: TimerState,
    done: bool,
}

impl<T> WaitFuture<T> {
    pub(crate) fn new(
        gate: Weak<GateInner<T>>,
        id: u64,
        resolution: oneshot::Receiver<Option<T>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            gate,
            id,
            resolution,
            timer: match timeout {
                Some(duration) => TimerState::Unarmed(duration),
                None => TimerState::Unbounded,
            },
            done: false,
        }
    }
}

impl<T> Future for WaitFuture<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        // Channel first: a release the gate has already observed beats a
        // timer that elapsed in the same tick.
        if let Poll::Ready(outcome) = Pin::new(&mut this.resolution).poll(cx) {
            this.done = true;
            // A closed channel means the entry was destroyed without being
            // resumed; the wait still resolves, with no value.
            return Poll::Ready(outcome.unwrap_or(None));
        }

        if let TimerState::Unarmed(duration) = &this.timer {
            let duration = *duration;
            this.timer = TimerState::Armed(Box::pin(sleep(duration)));
        }
        let TimerState::Armed(timeout) = &mut this.timer else {
            return Poll::Pending;
        };
        ready!(timeout.as_mut().poll(cx));

        // Timed out. Not finding our entry means a release drained it before
        // the timer fired; that release's value wins and its arrival on the
        // resume channel resolves (or has resolved) this future.
        let removed = match this.gate.upgrade() {
            Some(gate) => gate.deregister(this.id),
            // Gate destroyed: the entry is gone and the channel is closed.
            None => false,
        };
        if !removed {
            return match Pin::new(&mut this.resolution).poll(cx) {
                Poll::Ready(outcome) => {
                    this.done = true;
                    Poll::Ready(outcome.unwrap_or(None))
                }
                Poll::Pending => Poll::Pending,
            };
        }
        this.done = true;
        trace!(id = this.id, "wait timed out");
        Poll::Ready(None)
    }
}

impl<T> Drop for WaitFuture<T> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(gate) = self.gate.upgrade() {
            gate.deregister(self.id);
        }
    }
}

impl<T> fmt::Debug for WaitFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitFuture")
            .field("id", &self.id)
            .field("bounded", &!matches!(self.timer, TimerState::Unbounded))
            .field("done", &self.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::WaitGate;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready_eq};

    #[test]
    fn stays_pending_until_release_is_observed() {
        let gate = WaitGate::new();
        let mut waiter = task::spawn(gate.wait());

        assert_pending!(waiter.poll());

        gate.release(7);
        assert!(waiter.is_woken());
        assert_ready_eq!(waiter.poll(), Some(7));
    }

    #[test]
    fn dropping_an_unresolved_future_unregisters_its_entry() {
        let gate: WaitGate<u32> = WaitGate::new();
        let abandoned = gate.wait();
        let _kept = gate.wait();
        assert_eq!(gate.waiter_count(), 2);

        drop(abandoned);
        assert_eq!(gate.waiter_count(), 1);
    }

    #[test]
    fn dropping_the_gate_resolves_the_wait_with_no_value() {
        let gate: WaitGate<u32> = WaitGate::new();
        let mut waiter = task::spawn(gate.wait());

        assert_pending!(waiter.poll());

        drop(gate);
        assert!(waiter.is_woken());
        assert_ready_eq!(waiter.poll(), None);
    }
}
