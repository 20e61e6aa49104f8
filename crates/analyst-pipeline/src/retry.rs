//! Per-stage retry schedule
//!
//! The Coordinator owns the attempt loop and decides, via
//! `StageError::is_transient`, whether a failure is worth another try at
//! all. This type only answers two questions: how many attempts a stage
//! gets, and how long to wait after the n-th failed one.

use std::time::Duration;

/// Attempt budget and backoff schedule for one stage
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per stage, first try included
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_backoff: Duration,

    /// Ceiling on any single delay
    pub max_backoff: Duration,

    /// Growth factor applied per further failure
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    /// Three attempts, 100 ms doubling to a 10 s ceiling
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            multiplier,
        }
    }

    /// Single attempt, no waiting
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, 1.0)
    }

    /// Millisecond-scale delays so retry paths stay quick under test
    pub fn fast() -> Self {
        Self::new(
            3,
            Duration::from_millis(10),
            Duration::from_millis(100),
            2.0,
        )
    }

    /// Delay to sleep after the given failed attempt (1-based)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let grown = self
            .initial_backoff
            .mul_f64(self.multiplier.powi(attempt.saturating_sub(1) as i32));
        grown.min(self.max_backoff)
    }
}
