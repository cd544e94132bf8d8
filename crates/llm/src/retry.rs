//! Bounded retry policy for calls to external services.

use std::time::Duration;

/// Attempts are capped to this many when the failure was a timeout,
/// independent of the rate-limit attempt budget: one retry, then give up.
pub const TIMEOUT_MAX_ATTEMPTS: u32 = 2;

/// Explicit retry budget with exponential backoff.
///
/// `max_attempts` counts total attempts including the first; `base_delay`
/// doubles after each failed attempt. No attempt loop in this codebase is
/// unbounded: every retry site goes through a policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles per attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` of 0 is treated as 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Whether another attempt is allowed after `attempt` attempts failed.
    pub fn allows_another(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Backoff delay before attempt `attempts_made + 1`.
    pub fn delay_after(&self, attempts_made: u32) -> Duration {
        let factor = 1u32 << attempts_made.saturating_sub(1).min(10);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert!(policy.allows_another(1));
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100));
        assert_eq!(policy.max_attempts, 1);
    }
}
