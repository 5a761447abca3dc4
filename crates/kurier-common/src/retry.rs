//! Retry policies for reconnection and request orchestration.
//!
//! A policy is a pure function from (attempt, elapsed) to an optional delay;
//! `None` means give up. Sleeping stays with the caller so policies can be
//! shared freely across tasks.

use std::time::Duration;

/// Reusable retry policy.
#[derive(Debug, Clone)]
pub enum Retry {
    /// Retry immediately up to a fixed number of attempts.
    AttemptCount { max_attempts: u32 },
    /// Delay-based backoff, linear or exponential, with optional caps.
    Backoff {
        delay: Duration,
        linear: bool,
        max_delay: Option<Duration>,
        timeout: Option<Duration>,
    },
}

impl Retry {
    /// Fixed attempt count with no delay between attempts.
    pub fn attempts(max_attempts: u32) -> Self {
        Retry::AttemptCount { max_attempts }
    }

    /// Exponential backoff starting from `delay`.
    pub fn backoff(delay: Duration) -> Self {
        Retry::Backoff { delay, linear: false, max_delay: None, timeout: None }
    }

    /// Linear backoff: `delay * (attempt + 1)`.
    pub fn linear(delay: Duration) -> Self {
        Retry::Backoff { delay, linear: true, max_delay: None, timeout: None }
    }

    /// Cap any single delay.
    pub fn with_max_delay(self, cap: Duration) -> Self {
        match self {
            Retry::Backoff { delay, linear, timeout, .. } => {
                Retry::Backoff { delay, linear, max_delay: Some(cap), timeout }
            }
            other => other,
        }
    }

    /// Give up once the total elapsed time exceeds `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            Retry::Backoff { delay, linear, max_delay, .. } => {
                Retry::Backoff { delay, linear, max_delay, timeout: Some(timeout) }
            }
            other => other,
        }
    }

    /// Delay before the next attempt, or `None` to give up.
    ///
    /// `attempt` counts completed attempts (the first retry passes 0);
    /// `elapsed` is the total time since the operation started.
    pub fn next_delay(&self, attempt: u32, elapsed: Duration) -> Option<Duration> {
        match self {
            Retry::AttemptCount { max_attempts } => {
                (attempt < *max_attempts).then_some(Duration::ZERO)
            }
            Retry::Backoff { delay, linear, max_delay, timeout } => {
                if let Some(limit) = timeout {
                    if elapsed > *limit {
                        return None;
                    }
                }

                let mut next = if *linear {
                    delay.saturating_mul(attempt + 1)
                } else {
                    // delay/2 * (2^(attempt+1) - 1), saturating for large attempts
                    let unit = delay.as_millis() as u128;
                    let steps = (1u128 << attempt.saturating_add(1).min(63)) - 1;
                    let millis = (unit * steps / 2).min(u64::MAX as u128) as u64;
                    Duration::from_millis(millis)
                };

                if let Some(cap) = max_delay {
                    next = next.min(*cap);
                }
                // never sleep past the total deadline
                if let Some(limit) = timeout {
                    next = next.min(limit.saturating_sub(elapsed));
                }
                Some(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_count_gives_up_at_max() {
        let retry = Retry::attempts(3);
        assert_eq!(retry.next_delay(0, Duration::ZERO), Some(Duration::ZERO));
        assert_eq!(retry.next_delay(2, Duration::ZERO), Some(Duration::ZERO));
        assert_eq!(retry.next_delay(3, Duration::ZERO), None);
    }

    #[test]
    fn linear_backoff_scales_with_attempt() {
        let retry = Retry::linear(Duration::from_millis(100));
        assert_eq!(retry.next_delay(0, Duration::ZERO), Some(Duration::from_millis(100)));
        assert_eq!(retry.next_delay(1, Duration::ZERO), Some(Duration::from_millis(200)));
        assert_eq!(retry.next_delay(4, Duration::ZERO), Some(Duration::from_millis(500)));
    }

    #[test]
    fn exponential_backoff_doubles() {
        let retry = Retry::backoff(Duration::from_millis(100));
        assert_eq!(retry.next_delay(0, Duration::ZERO), Some(Duration::from_millis(50)));
        assert_eq!(retry.next_delay(1, Duration::ZERO), Some(Duration::from_millis(150)));
        assert_eq!(retry.next_delay(2, Duration::ZERO), Some(Duration::from_millis(350)));
    }

    #[test]
    fn max_delay_caps_backoff() {
        let retry = Retry::backoff(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(200));
        assert_eq!(retry.next_delay(5, Duration::ZERO), Some(Duration::from_millis(200)));
    }

    #[test]
    fn timeout_gives_up_and_caps_final_delay() {
        let retry = Retry::linear(Duration::from_secs(10))
            .with_timeout(Duration::from_secs(12));
        // past the deadline: give up
        assert_eq!(retry.next_delay(0, Duration::from_secs(13)), None);
        // near the deadline: delay shrinks to the remaining time
        assert_eq!(
            retry.next_delay(0, Duration::from_secs(5)),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn large_attempt_does_not_overflow() {
        let retry = Retry::backoff(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(30));
        assert_eq!(retry.next_delay(500, Duration::ZERO), Some(Duration::from_secs(30)));
    }
}
