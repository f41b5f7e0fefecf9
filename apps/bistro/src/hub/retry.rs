//! Reconnect timing for the hub client.

use rand::Rng;
use std::time::Duration;

/// Bounded exponential backoff with random jitter.
///
/// Retry `n` (1-based) waits `base_delay * 2^(n-1)`, capped at `max_delay`,
/// plus a random `0..=jitter` in whole milliseconds. After `max_retries`
/// failed retries the connection is declared failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Same delay before every retry, no jitter.
    ///
    /// `RetryPolicy::fixed(Duration::from_secs(5), 1)` retries once after five seconds.
    #[must_use]
    pub const fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            max_delay: delay,
            jitter: Duration::ZERO,
        }
    }

    /// Fail on the first unsuccessful attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::fixed(Duration::ZERO, 0)
    }

    /// Delay before retry `retry` without jitter.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay before retry `retry`, jitter included.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let backoff = self.backoff(retry);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return backoff;
        }
        let extra = rand::rng().random_range(0..=jitter_ms);
        backoff.saturating_add(Duration::from_millis(extra))
    }

    /// Whether another retry is allowed after `failed_retries` failures.
    #[must_use]
    pub fn allows(&self, failed_retries: u32) -> bool {
        failed_retries <= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_cap() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            jitter: Duration::ZERO,
        };
        let delays: Vec<u64> = (1..=6)
            .map(|n| policy.backoff(n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
        assert_eq!(policy.backoff(64), Duration::from_millis(1000));
    }

    #[test]
    fn jitter_stays_in_bounds() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(100),
            jitter: Duration::from_millis(50),
        };
        for _ in 0..100 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn fixed_policy_retries_once() {
        let policy = RetryPolicy::fixed(Duration::from_secs(5), 1);
        assert_eq!(policy.delay_for(1), Duration::from_secs(5));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
        assert!(!RetryPolicy::no_retry().allows(1));
    }
}
