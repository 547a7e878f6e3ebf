/*!
 * Wait Options
 *
 * Per-wait configuration for timeout and process-lifetime behavior
 */

use std::time::Duration;

/// Configuration for a single wait registration.
///
/// Fields are public to allow struct-update syntax:
///
/// ```
/// use std::time::Duration;
/// use wait_gate::WaitOptions;
///
/// let options = WaitOptions {
///     timeout: Some(Duration::from_millis(500)),
///     ..Default::default()
/// };
/// assert!(!options.keep_alive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// How long the wait stays pending before resolving with no value.
    /// `None` waits indefinitely; `Some(Duration::ZERO)` is a valid
    /// next-tick timeout.
    pub timeout: Option<Duration>,
    /// Hint that the pending timer should keep an otherwise-idle process
    /// alive until it fires or is cancelled. Tokio has no such notion
    /// (detached timers never hold the runtime open), so the flag is
    /// recorded but has no effect. It never affects resolution.
    pub keep_alive: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            keep_alive: false,
        }
    }
}

impl WaitOptions {
    /// Wait indefinitely; only a release resolves the wait.
    pub const fn indefinite() -> Self {
        Self {
            timeout: None,
            keep_alive: false,
        }
    }

    /// Resolve with no value after `timeout` unless released first.
    pub const fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            keep_alive: false,
        }
    }
}
