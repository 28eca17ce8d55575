//! Backoff for transient transport failures.
//!
//! Distinct from the token refresh: a refresh happens at most once per
//! request, while transient failures (connect errors, timeouts, 5xx) are
//! retried after each delay in [`RetryPolicy::delays`].

use std::time::Duration;

/// Default retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const DEFAULT_DELAYS_SECS: [u64; 3] = [1, 2, 4];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before each retry; its length is the number of retries.
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delays: DEFAULT_DELAYS_SECS
                .iter()
                .map(|secs| Duration::from_secs(*secs))
                .collect(),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first transient error.
    pub fn none() -> Self {
        Self { delays: Vec::new() }
    }

    /// Retry `count` times without sleeping.
    pub fn immediate(count: usize) -> Self {
        Self {
            delays: vec![Duration::ZERO; count],
        }
    }

    /// Whether a transport error is worth another attempt.
    pub fn is_transient(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }
}
