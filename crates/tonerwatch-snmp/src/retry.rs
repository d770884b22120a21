// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry engine for single-identifier SNMP requests.
//
// Classifies field errors into Transient (retry) and Permanent (give up).
// Retries are confined to one identifier of one device; nothing above the
// field level is ever retried.

use std::time::Duration;

use tonerwatch_core::QueryFieldError;
use tonerwatch_core::config::{RETRY_BACKOFF_CAP, SnmpSettings};
use tracing::debug;

/// Whether a failed request is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Lost datagram, slow agent, transient socket error.
    Transient,
    /// The agent answered; asking again yields the same answer.
    Permanent,
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first request.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(200),
            max_delay: RETRY_BACKOFF_CAP,
        }
    }
}

impl From<&SnmpSettings> for RetryConfig {
    fn from(settings: &SnmpSettings) -> Self {
        Self {
            max_retries: settings.retries,
            ..Default::default()
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry: the error is permanent.
    GiveUp(ErrorClass),
    /// Maximum retries exhausted.
    Exhausted,
}

/// Classify a field error for retry decisions.
pub fn classify_error(err: &QueryFieldError) -> ErrorClass {
    match err {
        QueryFieldError::Timeout | QueryFieldError::Transport(_) => ErrorClass::Transient,
        QueryFieldError::NoSuchObject
        | QueryFieldError::InvalidOid(_)
        | QueryFieldError::Unconvertible(_) => ErrorClass::Permanent,
    }
}

/// Decide whether to retry based on the error class and attempt count.
pub fn should_retry(err: &QueryFieldError, attempt: u32, config: &RetryConfig) -> RetryDecision {
    match classify_error(err) {
        ErrorClass::Permanent => RetryDecision::GiveUp(ErrorClass::Permanent),
        ErrorClass::Transient => {
            if attempt >= config.max_retries {
                debug!(attempt, max = config.max_retries, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, config);
                debug!(attempt, delay_ms = delay.as_millis(), "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// Compute exponential backoff delay with jitter.
///
/// delay = min(base * 2^attempt + jitter, max_delay)
fn compute_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_ms = config.base_delay.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(10));
    let total_ms = exp_ms.saturating_add(jitter(base_ms, attempt));
    let capped_ms = total_ms.min(config.max_delay.as_millis() as u64);

    Duration::from_millis(capped_ms)
}

/// Deterministic jitter in [0, base) spread by the attempt number.
fn jitter(base_ms: u64, attempt: u32) -> u64 {
    let hash = (attempt as u64).wrapping_mul(6364136223846793005);
    hash % base_ms.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_transient() {
        assert_eq!(classify_error(&QueryFieldError::Timeout), ErrorClass::Transient);
    }

    #[test]
    fn missing_object_is_permanent() {
        assert_eq!(
            classify_error(&QueryFieldError::NoSuchObject),
            ErrorClass::Permanent
        );
    }

    #[test]
    fn single_retry_by_default() {
        let config = RetryConfig::default();
        let err = QueryFieldError::Timeout;
        assert!(matches!(should_retry(&err, 0, &config), RetryDecision::RetryAfter(_)));
        assert!(matches!(should_retry(&err, 1, &config), RetryDecision::Exhausted));
    }

    #[test]
    fn permanent_error_never_retries() {
        let config = RetryConfig::default();
        assert!(matches!(
            should_retry(&QueryFieldError::InvalidOid("x".into()), 0, &config),
            RetryDecision::GiveUp(ErrorClass::Permanent)
        ));
    }

    #[test]
    fn zero_retries_from_settings() {
        let settings = SnmpSettings {
            retries: 0,
            ..Default::default()
        };
        let config = RetryConfig::from(&settings);
        assert!(matches!(
            should_retry(&QueryFieldError::Timeout, 0, &config),
            RetryDecision::Exhausted
        ));
    }

    #[test]
    fn delay_increases_and_is_capped() {
        let config = RetryConfig::default();
        let d0 = compute_delay(0, &config);
        let d1 = compute_delay(1, &config);
        assert!(d1 > d0);
        assert!(compute_delay(20, &config) <= Duration::from_secs(2));
    }
}
