//! Retry policies for gateway requests.

use crate::FetchError;
use std::time::Duration;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt);
                std::cmp::min(base.saturating_mul(multiplier), *max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(1000),
            max: Duration::from_secs(30),
        }
    }
}

/// Conditions that trigger a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCondition {
    /// Retry on specific HTTP status code.
    StatusCode(u16),
    /// Retry on any 5xx status.
    ServerError,
    /// Retry on timeout.
    Timeout,
    /// Retry on connection error.
    ConnectionError,
}

impl RetryCondition {
    /// Check if an error matches this condition.
    pub fn matches(&self, error: &FetchError) -> bool {
        match (self, error) {
            (Self::StatusCode(code), FetchError::HttpError { status, .. }) => status == code,
            (Self::ServerError, FetchError::HttpError { status, .. }) => {
                (500..600).contains(status)
            }
            (Self::Timeout, FetchError::Timeout) => true,
            (Self::ConnectionError, FetchError::Network(_)) => true,
            _ => false,
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_attempts: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
    /// Conditions that trigger retry.
    pub retry_on: Vec<RetryCondition>,
}

impl RetryPolicy {
    /// Create a new retry policy that retries transient failures.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::default(),
            retry_on: vec![
                RetryCondition::ServerError,
                RetryCondition::StatusCode(408),
                RetryCondition::Timeout,
                RetryCondition::ConnectionError,
            ],
        }
    }

    /// Reads: up to 3 retries, `min(1s * 2^n, 30s)` apart. Client errors
    /// other than 408 are never retried.
    pub fn query() -> Self {
        Self::new(3)
    }

    /// Writes: one retry after a second.
    pub fn mutation() -> Self {
        Self::new(1).with_backoff(BackoffStrategy::Fixed(Duration::from_secs(1)))
    }

    /// Create a policy with no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: BackoffStrategy::None,
            retry_on: Vec::new(),
        }
    }

    /// Set backoff strategy.
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Set retry conditions.
    pub fn with_conditions(mut self, conditions: Vec<RetryCondition>) -> Self {
        self.retry_on = conditions;
        self
    }

    /// Check if the request should be retried after failing `attempt`
    /// retries so far.
    pub fn should_retry(&self, error: &FetchError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }
        self.retry_on.iter().any(|c| c.matches(error))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> FetchError {
        FetchError::HttpError {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_query_backoff_schedule() {
        let policy = RetryPolicy::query();
        assert_eq!(policy.backoff.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.backoff.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.backoff.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.backoff.delay_for_attempt(10), Duration::from_secs(30));
        assert_eq!(policy.backoff.delay_for_attempt(40), Duration::from_secs(30));
    }

    #[test]
    fn test_query_retries_transient_three_times() {
        let policy = RetryPolicy::query();
        assert!(policy.should_retry(&http(500), 0));
        assert!(policy.should_retry(&http(503), 2));
        assert!(!policy.should_retry(&http(503), 3));
        assert!(policy.should_retry(&FetchError::Network("down".into()), 0));
        assert!(policy.should_retry(&FetchError::Timeout, 0));
    }

    #[test]
    fn test_query_never_retries_client_errors_except_408() {
        let policy = RetryPolicy::query();
        assert!(!policy.should_retry(&http(400), 0));
        assert!(!policy.should_retry(&http(404), 0));
        assert!(!policy.should_retry(&http(429), 0));
        assert!(policy.should_retry(&http(408), 0));
    }

    #[test]
    fn test_mutation_retries_once() {
        let policy = RetryPolicy::mutation();
        assert!(policy.should_retry(&http(500), 0));
        assert!(!policy.should_retry(&http(500), 1));
        assert_eq!(policy.backoff.delay_for_attempt(0), Duration::from_secs(1));
    }

    #[test]
    fn test_none_policy() {
        assert!(!RetryPolicy::none().should_retry(&http(500), 0));
    }
}
