//! Retry schedule utilities for polling operations
//!
//! This module provides the exponential backoff formula shared by every poll
//! loop, a per-outcome [`Backoff`] cursor, and the [`PollBudget`] that turns an
//! open-ended poll into a bounded one.

use crate::config::PollingConfig;
use crate::errors::ApiError;
use std::time::Duration;
use tokio::time::Instant;

/// Calculate next backoff duration using exponential backoff with a maximum cap
///
/// `new_backoff = min(current_backoff * multiplier, max_backoff)`
///
/// # Example
/// ```
/// use std::time::Duration;
/// use bounce_dashboard::api::calculate_next_backoff;
///
/// let backoff = Duration::from_millis(2000);
/// let next = calculate_next_backoff(backoff, 1.5, Duration::from_secs(30));
/// assert_eq!(next, Duration::from_millis(3000));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff: Duration,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(max_backoff)
}

/// Delay cursor for one kind of "not ready yet" answer
///
/// The first call to [`Backoff::next_delay`] yields the initial delay; later
/// calls grow it. A multiplier of 1.0 gives a fixed interval.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    multiplier: f64,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            current: initial,
            multiplier,
            max,
        }
    }

    pub fn fixed(interval: Duration) -> Self {
        Self::new(interval, 1.0, interval)
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = calculate_next_backoff(self.current, self.multiplier, self.max);
        delay
    }
}

/// Attempt and wall-clock bounds for a poll loop
#[derive(Debug, Clone)]
pub struct PollBudget {
    operation: String,
    started: Instant,
    attempts: u32,
    attempt_limit: Option<u32>,
    deadline: Option<Duration>,
}

impl PollBudget {
    pub fn new(operation: impl Into<String>, config: &PollingConfig) -> Self {
        Self {
            operation: operation.into(),
            started: Instant::now(),
            attempts: 0,
            attempt_limit: config.attempt_limit(),
            deadline: config.deadline(),
        }
    }

    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Check whether another attempt may be scheduled after `delay`
    pub fn ensure_can_wait(&self, delay: Duration) -> Result<(), ApiError> {
        if let Some(limit) = self.attempt_limit {
            if self.attempts >= limit {
                return Err(ApiError::MaxAttemptsExceeded {
                    operation: self.operation.clone(),
                    attempts: self.attempts,
                });
            }
        }
        if let Some(deadline) = self.deadline {
            let elapsed = self.elapsed();
            if elapsed + delay > deadline {
                return Err(ApiError::DeadlineExceeded {
                    operation: self.operation.clone(),
                    elapsed_seconds: elapsed.as_secs(),
                });
            }
        }
        Ok(())
    }
}
