use std::future::Future;
use std::io;
use std::time::Duration;

use http::StatusCode;

use crate::{ErrorKind, Outcome, Result};

/// An extension trait to help determine if a failed fetch attempt
/// is worth retrying.
///
/// Modified from `Retryable` in [reqwest-middleware].
/// We vendor this logic to avoid a dependency on `reqwest-middleware` and
/// to classify our own error taxonomy: transient I/O and timeout-class
/// failures are retryable, malformed targets and client-side protocol
/// errors are not.
///
/// [reqwest-middleware]: https://github.com/TrueLayer/reqwest-middleware/blob/f854725791ccf4a02c401a26cab3d9db753f468c/reqwest-retry/src/retryable.rs
pub trait RetryExt {
    fn should_retry(&self) -> bool;
}

impl RetryExt for StatusCode {
    #[allow(clippy::if_same_then_else)]
    fn should_retry(&self) -> bool {
        let status = *self;
        if status.is_server_error() {
            true
        } else if status.is_client_error()
            && status != StatusCode::REQUEST_TIMEOUT
            && status != StatusCode::TOO_MANY_REQUESTS
        {
            false
        } else if status.is_success() {
            false
        } else {
            status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS
        }
    }
}

impl RetryExt for reqwest::Error {
    fn should_retry(&self) -> bool {
        if self.is_timeout() || self.is_connect() {
            true
        } else if self.is_body() || self.is_decode() || self.is_builder() || self.is_redirect() {
            false
        } else if self.is_request() {
            // It seems that hyper::Error(IncompleteMessage) is not correctly handled by reqwest.
            // Here we check if the Reqwest error was originated by hyper and map it consistently.
            if let Some(hyper_error) = get_source_error_type::<hyper::Error>(&self) {
                // The hyper::Error(IncompleteMessage) is raised if the HTTP
                // response is well formatted but does not contain all the
                // bytes. This can happen when the server has started sending
                // back the response but the connection is cut halfway through.
                // We can safely retry the call, hence marking this error as
                // transient.
                //
                // Instead hyper::Error(Canceled) is raised when the connection is
                // gracefully closed on the server side.
                if hyper_error.is_incomplete_message() || hyper_error.is_canceled() {
                    true

                // Try and downcast the hyper error to [`io::Error`] if that is the
                // underlying error, and try and classify it.
                } else if let Some(io_error) = get_source_error_type::<io::Error>(hyper_error) {
                    should_retry_io(io_error)
                } else {
                    false
                }
            } else {
                false
            }
        } else if let Some(status) = self.status() {
            status.should_retry()
        } else {
            false
        }
    }
}

impl RetryExt for ErrorKind {
    fn should_retry(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::NetworkRequest(e) => e.should_retry(),
            Self::RejectedStatusCode(code) => code.should_retry(),
            _ => false,
        }
    }
}

impl RetryExt for Outcome {
    fn should_retry(&self) -> bool {
        match self {
            Outcome::Success { .. } => false,
            Outcome::Failure { error, .. } => error.should_retry(),
        }
    }
}

/// Classifies an `io::Error` into retryable or not.
fn should_retry_io(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::TimedOut
    )
}

/// Downcasts the given err source into T.
fn get_source_error_type<T: std::error::Error + 'static>(
    err: &dyn std::error::Error,
) -> Option<&T> {
    let mut source = err.source();

    while let Some(err) = source {
        if let Some(typed_err) = err.downcast_ref::<T>() {
            return Some(typed_err);
        }

        source = err.source();
    }
    None
}

/// Bounded exponential-backoff retry for fallible fetch operations.
///
/// Exists only for the duration of one wrapped call; the attempt counter
/// and the current backoff delay are transient per-call state. On a
/// retryable failure the policy waits `initial_delay`, multiplies the
/// delay by `backoff_factor` and tries again, up to `max_attempts` total
/// attempts.
///
/// The policy always *propagates* the final outcome. Callers which absorb
/// exhausted retries instead (the worker-pool and concurrent strategies)
/// map the propagated failure to an empty result themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: usize,
    initial_delay: Duration,
    backoff_factor: f64,
}

impl RetryPolicy {
    /// Create a new retry policy.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidRetryPolicy` if `max_attempts` is zero
    /// or `backoff_factor` is below 1.
    pub fn new(max_attempts: usize, initial_delay: Duration, backoff_factor: f64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(ErrorKind::InvalidRetryPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(ErrorKind::InvalidRetryPolicy(format!(
                "backoff_factor must be at least 1, got {backoff_factor}"
            )));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_factor,
        })
    }

    /// Total number of attempts this policy makes, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Run `op` with retries and an exponential backoff.
    ///
    /// `op` is invoked at least once. Successful and non-retryable
    /// outcomes are returned right away; only transient failures consume
    /// further attempts.
    pub async fn run<F, Fut>(&self, mut op: F) -> Outcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let mut attempts: usize = 1;
        let mut wait_time = self.initial_delay;

        let mut outcome = op().await;
        while attempts < self.max_attempts {
            if outcome.is_success() || !outcome.should_retry() {
                return outcome;
            }
            log::warn!(
                "Attempt {attempts} for {} failed, retrying in {}ms",
                outcome.target(),
                wait_time.as_millis()
            );
            tokio::time::sleep(wait_time).await;
            wait_time = wait_time.mul_f64(self.backoff_factor);
            attempts += 1;
            outcome = op().await;
        }
        outcome
    }
}
