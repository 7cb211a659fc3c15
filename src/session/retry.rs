use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Explicit retry policy for remote session calls: attempt cap plus
/// exponential backoff with jitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Jitter range 0.0-1.0, applied symmetrically around the backoff value
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
            max_delay_ms: 15_000,
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Backoff before retry number `attempt` (zero-based):
    /// `min(max_delay, base * 2^attempt) * (1 ± jitter * rand)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(31));
        let capped = exponential.min(self.max_delay_ms);

        let random: f64 = rand::rng().random();
        let jitter = 1.0 + (random * 2.0 - 1.0) * self.jitter_factor;
        let with_jitter = (capped as f64 * jitter).round().max(0.0) as u64;
        Duration::from_millis(with_jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(jitter_factor: f64) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
            jitter_factor,
        }
    }

    #[test]
    fn backoff_grows_exponentially_without_jitter() {
        let p = policy(0.0);
        assert_eq!(p.delay_for(0), Duration::from_millis(1000));
        assert_eq!(p.delay_for(1), Duration::from_millis(2000));
        assert_eq!(p.delay_for(2), Duration::from_millis(4000));
        assert_eq!(p.delay_for(3), Duration::from_millis(8000));
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let p = policy(0.0);
        assert_eq!(p.delay_for(10), Duration::from_millis(60_000));
        // No overflow at absurd attempt numbers
        assert_eq!(p.delay_for(500), Duration::from_millis(60_000));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let p = policy(0.2);
        for _ in 0..100 {
            let d = p.delay_for(0).as_millis() as u64;
            assert!((800..=1200).contains(&d), "delay {d} outside jitter bounds");
        }
    }

    #[test]
    fn max_attempts_floor_is_one() {
        let p = RetryPolicy::default().with_max_attempts(0);
        assert_eq!(p.max_attempts, 1);
    }
}
