// ABOUTME: Bounded retry policy for install attempts.
// ABOUTME: Explicit policy object so tests can inject a zero-delay variant.

use std::time::Duration;

/// How the apply executor retries a failed install.
///
/// After each failed attempt (except the last) the executor deletes the
/// partially created release before trying again, because a concurrent actor
/// may have created backend-side state between the dry-run and the real
/// pass. `backoff` is slept between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Zero-delay policy for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
