/*!
 * Wait Gate
 *
 * A reusable async broadcast gate: any number of tasks suspend on the gate
 * until an external event releases them, each wait optionally bounded by its
 * own timeout and optionally receiving a payload from the releaser.
 *
 * # Architecture
 *
 * The gate keeps an ordered list of pending waits, each represented by a
 * one-shot resume capability. `release` drains the list atomically and
 * resumes every captured wait with the same value; a wait whose timeout
 * elapses first resolves with no value instead. The gate carries no state
 * between cycles and can be reused indefinitely.
 *
 * # Examples
 *
 * ```
 * use std::time::Duration;
 * use wait_gate::WaitGate;
 *
 * # tokio_test::block_on(async {
 * let gate = WaitGate::new();
 *
 * let waiter = gate.wait_timeout(Duration::from_secs(1));
 * gate.release(42);
 *
 * assert_eq!(waiter.await, Some(42));
 * # });
 * ```
 */

mod future;
mod gate;
mod options;

// Re-exports
pub use future::WaitFuture;
pub use gate::WaitGate;
pub use options::WaitOptions;
