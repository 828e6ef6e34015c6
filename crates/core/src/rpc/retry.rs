//! Retry policy for stored-procedure calls
//!
//! Retries are limited to idempotent requests and transient failures (no
//! response at all, or one of the retryable HTTP statuses). Delays grow
//! exponentially from the base delay: 1s, 2s, 4s with the defaults.

use std::future::Future;
use std::time::Duration;

use storedesk_domain::constants::RETRYABLE_HTTP_STATUSES;
use storedesk_domain::{RetrySettings, RpcError};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Per-call retry state. Created when the call starts, dropped when it
/// resolves.
#[derive(Debug, Clone)]
pub struct RetryAttempt {
    attempt_number: u32,
    started_at: Instant,
    delay_before: Duration,
}

impl RetryAttempt {
    /// State for the first attempt of a call, starting now.
    pub fn first() -> Self {
        Self { attempt_number: 1, started_at: Instant::now(), delay_before: Duration::ZERO }
    }

    /// 1-based attempt counter, monotonically increasing for the call.
    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    /// Number of retries already performed before this attempt.
    pub fn retry_count(&self) -> u32 {
        self.attempt_number.saturating_sub(1)
    }

    /// When the current attempt started.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Backoff slept before the current attempt. Zero for the first.
    pub fn delay_before(&self) -> Duration {
        self.delay_before
    }

    /// Latency of the current attempt.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn advance(&mut self, delay: Duration) {
        self.attempt_number += 1;
        self.delay_before = delay;
        self.started_at = Instant::now();
    }
}

/// How an attempt failed, as far as retry eligibility is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// No HTTP response was received (connect, DNS, timeout).
    NoResponse,
    /// A response arrived with a non-success HTTP status.
    HttpStatus(u16),
    /// A response arrived but could not be read as an envelope.
    InvalidResponse,
}

impl AttemptFailure {
    /// HTTP status of the failure, if a response arrived.
    pub fn status(self) -> Option<u16> {
        match self {
            Self::HttpStatus(status) => Some(status),
            _ => None,
        }
    }
}

/// A failed attempt together with the error it resolves to if not retried.
#[derive(Debug, Clone)]
pub struct FailedAttempt {
    /// Retry classification
    pub failure: AttemptFailure,
    /// Error surfaced if this attempt is the last
    pub error: RpcError,
}

impl FailedAttempt {
    /// Attempt that got no HTTP response.
    pub fn no_response(error: RpcError) -> Self {
        Self { failure: AttemptFailure::NoResponse, error }
    }

    /// Attempt answered with a non-success HTTP status.
    pub fn http_status(status: u16, error: RpcError) -> Self {
        Self { failure: AttemptFailure::HttpStatus(status), error }
    }

    /// Attempt whose body was not a valid envelope.
    pub fn invalid_response(error: RpcError) -> Self {
        Self { failure: AttemptFailure::InvalidResponse, error }
    }
}

/// Decides whether and when a failed attempt is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryPolicy {
    /// Policy allowing `max_retries` retries with exponential backoff from
    /// `base_delay`.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Policy from loaded retry settings.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_retries, settings.base_delay())
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the first retry; doubles for each later one.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Whether the failure kind is transient.
    pub fn is_retryable(failure: AttemptFailure) -> bool {
        match failure {
            AttemptFailure::NoResponse => true,
            AttemptFailure::HttpStatus(status) => RETRYABLE_HTTP_STATUSES.contains(&status),
            AttemptFailure::InvalidResponse => false,
        }
    }

    /// Non-idempotent requests are never retried, whatever the failure.
    pub fn should_retry(
        &self,
        attempt: &RetryAttempt,
        idempotent: bool,
        failure: AttemptFailure,
    ) -> bool {
        idempotent && attempt.retry_count() < self.max_retries && Self::is_retryable(failure)
    }

    /// `base_delay * 2^retry_count`
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let multiplier = 1u32 << retry_count.min(16);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// ceiling is reached. The operation receives the attempt number.
    pub async fn run<T, F, Fut>(
        &self,
        endpoint: &str,
        idempotent: bool,
        mut operation: F,
    ) -> Result<T, RpcError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FailedAttempt>>,
    {
        let mut attempt = RetryAttempt::first();

        loop {
            match operation(attempt.attempt_number()).await {
                Ok(value) => {
                    if attempt.retry_count() > 0 {
                        debug!(
                            endpoint,
                            attempt = attempt.attempt_number(),
                            "rpc call recovered after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(failed) => {
                    let duration_ms = u64::try_from(attempt.elapsed().as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        endpoint,
                        attempt = attempt.attempt_number(),
                        status = failed.failure.status(),
                        duration_ms,
                        error = %failed.error,
                        "rpc attempt failed"
                    );

                    if !self.should_retry(&attempt, idempotent, failed.failure) {
                        return Err(failed.error);
                    }

                    let delay = self.delay_for(attempt.retry_count());
                    debug!(
                        endpoint,
                        next_attempt = attempt.attempt_number() + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "retrying rpc call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt.advance(delay);
                }
            }
        }
    }
}
