//! Retry policy for backend calls.
//!
//! Pure configuration: the requester in `moonlit-http` owns the loop and the
//! random source, this type only answers "how many attempts" and "how long to
//! wait before attempt `n + 1`".

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;

/// Default number of attempts per backend call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 300;

/// Exponential backoff with additive jitter.
///
/// The wait after failed attempt `n` (zero-based) is
/// `base * 2^n + jitter` with `jitter` in `[0, base)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl RetryPolicy {
    /// Create a validated policy.
    pub const fn new(max_attempts: u32, base_delay_ms: u64) -> Result<Self, SettingsError> {
        if max_attempts == 0 {
            return Err(SettingsError::InvalidMaxAttempts(max_attempts));
        }
        if base_delay_ms == 0 {
            return Err(SettingsError::InvalidBaseDelay(base_delay_ms));
        }
        Ok(Self {
            max_attempts,
            base_delay_ms,
        })
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    /// Whether `attempt` (zero-based) is the last one allowed.
    #[must_use]
    pub const fn is_final(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) >= self.max_attempts
    }

    /// Lower bound of the wait after failed attempt `attempt`: `base * 2^attempt`.
    #[must_use]
    pub fn backoff_floor(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Wait after failed attempt `attempt` given a jitter sample.
    ///
    /// `jitter_ms` is folded into `[0, base)` so any random `u64` is accepted.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, jitter_ms: u64) -> Duration {
        self.backoff_floor(attempt) + Duration::from_millis(jitter_ms % self.base_delay_ms.max(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_documented_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.base_delay_ms(), 300);
    }

    #[test]
    fn zero_attempts_or_zero_delay_are_rejected() {
        assert!(matches!(
            RetryPolicy::new(0, 100),
            Err(SettingsError::InvalidMaxAttempts(0))
        ));
        assert!(matches!(
            RetryPolicy::new(3, 0),
            Err(SettingsError::InvalidBaseDelay(0))
        ));
        assert!(RetryPolicy::new(1, 1).is_ok());
    }

    #[test]
    fn final_attempt_is_last_zero_based_index() {
        let policy = RetryPolicy::new(3, 100).unwrap();
        assert!(!policy.is_final(0));
        assert!(!policy.is_final(1));
        assert!(policy.is_final(2));
        assert!(RetryPolicy::single_attempt().is_final(0));
    }

    #[test]
    fn delay_stays_within_jitter_window() {
        let policy = RetryPolicy::new(6, 300).unwrap();
        for attempt in 0..5 {
            let floor = 300u64 << attempt;
            for jitter in [0, 1, 150, 299, 300, 12_345, u64::MAX] {
                let delay = policy.delay_for(attempt, jitter).as_millis();
                assert!(
                    delay >= u128::from(floor),
                    "attempt {attempt}: {delay} < {floor}"
                );
                assert!(
                    delay < u128::from(floor + 300),
                    "attempt {attempt}: {delay} too large"
                );
            }
        }
    }

    #[test]
    fn floors_grow_strictly() {
        let policy = RetryPolicy::default();
        let floors: Vec<_> = (0..4).map(|a| policy.backoff_floor(a)).collect();
        assert!(floors.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(floors[0], Duration::from_millis(300));
    }

    #[test]
    fn huge_attempt_numbers_saturate_instead_of_overflowing() {
        let policy = RetryPolicy::default();
        let delay = policy.backoff_floor(200);
        assert_eq!(delay, Duration::from_millis(u64::MAX));
    }
}
