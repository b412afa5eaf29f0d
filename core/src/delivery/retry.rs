//! Attempt budget and exponential backoff for message sends.

use std::time::Duration;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// How many failed attempts a send may make and how long to wait between
/// them. Rate-limit answers are not attempts and never touch this budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay_ms,
        }
    }

    /// Whether another attempt is allowed after `failures` failed ones.
    pub fn should_retry(&self, failures: u32) -> bool {
        failures < self.max_attempts
    }

    /// Delay before the retry that follows failure number `failures`
    /// (1-based): base, 2x base, 4x base, ...
    pub fn delay_after(&self, failures: u32) -> Duration {
        let exp = failures.saturating_sub(1);
        Duration::from_millis(self.base_delay_ms.saturating_mul(2u64.saturating_pow(exp)))
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 1000ms base delay.
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.base_delay_ms, 1000);
    }

    #[test]
    fn should_retry_within_budget() {
        let p = RetryPolicy::new(3, 100);
        assert!(p.should_retry(0));
        assert!(p.should_retry(1));
        assert!(p.should_retry(2));
        assert!(!p.should_retry(3));
        assert!(!p.should_retry(4));
    }

    #[test]
    fn exponential_delay() {
        let p = RetryPolicy::new(5, 1000);
        assert_eq!(p.delay_after(1), Duration::from_millis(1000));
        assert_eq!(p.delay_after(2), Duration::from_millis(2000));
        assert_eq!(p.delay_after(3), Duration::from_millis(4000));
        assert_eq!(p.delay_after(4), Duration::from_millis(8000));
    }

    #[test]
    fn delay_saturates() {
        let p = RetryPolicy::new(100, u64::MAX / 2);
        assert_eq!(p.delay_after(80), Duration::from_millis(u64::MAX));
    }
}
