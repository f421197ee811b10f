//! Retry logic for network operations: exponential backoff with jitter.

use anyhow::Result;
use log::{debug, warn};
use rand::Rng;
use std::error::Error as _;
use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

use crate::http::StatusError;

/// Default number of attempts (initial call included).
pub const MAX_RETRIES: usize = 3;

/// Default delay before the first retry.
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// Default growth factor between consecutive delays.
pub const BACKOFF: f64 = 2.0;

/// Upper bound (exclusive) of the random fraction added to every delay.
pub const MAX_JITTER: f64 = 0.25;

/// Exponential backoff policy for a single wrapped call.
///
/// The policy itself holds no state between calls; every [`RetryPolicy::run`]
/// starts with a fresh [`RetryContext`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    retry_count: usize,
    base_delay: Duration,
    backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: MAX_RETRIES,
            base_delay: BASE_DELAY,
            backoff: BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn with_retry_count(mut self, retry_count: usize) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total number of attempts; zero is treated as a single attempt.
    pub fn retry_count(&self) -> usize {
        self.retry_count.max(1)
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn backoff(&self) -> f64 {
        self.backoff
    }

    /// Delay slept after the failed attempt with zero-based index `attempt`.
    ///
    /// `backoff^attempt * base_delay * (1 + jitter)`
    pub fn delay_for(&self, attempt: usize, jitter: f64) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = (self.backoff.powi(exponent) * (1.0 + jitter)).max(0.0);
        Duration::try_from_secs_f64(self.base_delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }

    /// Runs `operation` until it succeeds, fails with an error rejected by
    /// `is_retryable`, or runs out of attempts.
    ///
    /// The error of the last attempt is returned unchanged.
    pub async fn run<F, Fut, T, C>(
        &self,
        operation_name: &str,
        is_retryable: C,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        C: Fn(&anyhow::Error) -> bool,
    {
        let mut context = RetryContext::new(*self);

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) {
                        debug!("{}: non-retryable error: {:#}", operation_name, e);
                        return Err(e);
                    }

                    if context.is_last_attempt() {
                        warn!(
                            "{}: attempt {}/{} failed ({:#}), giving up",
                            operation_name,
                            context.attempt + 1,
                            context.policy.retry_count(),
                            e
                        );
                        return Err(e);
                    }

                    let delay = context.next_delay();
                    warn!(
                        "{}: attempt {}/{} failed ({:#}), retrying in {}ms...",
                        operation_name,
                        context.attempt,
                        context.policy.retry_count(),
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Attempt bookkeeping for one [`RetryPolicy::run`] call.
#[derive(Debug, Clone, Copy)]
pub struct RetryContext {
    attempt: usize,
    policy: RetryPolicy,
}

impl RetryContext {
    fn new(policy: RetryPolicy) -> Self {
        Self { attempt: 0, policy }
    }

    fn is_last_attempt(&self) -> bool {
        self.attempt + 1 >= self.policy.retry_count()
    }

    /// Samples the delay for the current attempt and moves on to the next one.
    fn next_delay(&mut self) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.0..MAX_JITTER);
        let delay = self.policy.delay_for(self.attempt, jitter);
        self.attempt += 1;
        delay
    }
}

/// Default retry classifier: the connection could not be made, timed out,
/// or went away before the response was complete.
///
/// HTTP status failures never count, even though they surface as errors.
pub fn is_transient(error: &anyhow::Error) -> bool {
    if error.downcast_ref::<StatusError>().is_some() {
        return false;
    }

    error.chain().any(|cause| {
        cause.downcast_ref::<reqwest::Error>().is_some_and(|e| {
            e.is_connect() || e.is_timeout() || ((e.is_request() || e.is_body()) && is_connection_lost(e))
        })
    })
}

/// Walks the source chain of a request or body error looking for a peer
/// that closed or reset the connection.
fn is_connection_lost(error: &reqwest::Error) -> bool {
    let mut source = error.source();

    while let Some(cause) = source {
        let peer_gone = cause.downcast_ref::<std::io::Error>().is_some_and(|io| {
            matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
                    | ErrorKind::NotConnected
            )
        });
        if peer_gone {
            return true;
        }

        // hyper reports an early close only through its message
        let message = cause.to_string();
        if message.contains("connection closed")
            || message.contains("connection reset")
            || message.contains("broken pipe")
            || message.contains("end of file")
        {
            return true;
        }

        source = cause.source();
    }

    false
}
