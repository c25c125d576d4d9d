use std::hash::Hash;

use http::StatusCode;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Possible errors when interacting with `crawlbench_lib`.
///
/// The variants fall into three classes which drive retry behavior:
/// malformed targets (never retried, rejected before any network attempt),
/// transient I/O failures (retried up to the attempt ceiling), and terminal
/// failures which retries cannot fix.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The given string can not be parsed into an absolute URL
    #[error("Cannot parse `{0}` as an absolute URL: {1}")]
    InvalidTarget(String, url::ParseError),
    /// The URL parsed, but uses a scheme we don't fetch
    #[error("Unsupported scheme `{1}` in `{0}`; only http and https are fetched")]
    UnsupportedScheme(String, String),
    /// The URL parsed, but has no host to connect to
    #[error("URL `{0}` is missing a host")]
    MissingHost(String),
    /// Reqwest network error
    #[error("Network error while trying to connect to an endpoint")]
    NetworkRequest(#[source] reqwest::Error),
    /// The request did not complete within the per-request timeout
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),
    /// The server answered with an unexpected status code
    #[error("Rejected status code: {0}")]
    RejectedStatusCode(StatusCode),
    /// The response arrived, but its body could not be read
    #[error("Failed to read response body")]
    ReadResponseBody(#[source] reqwest::Error),
    /// The request client could not be created
    #[error("Failed to build the request client")]
    BuildRequestClient(#[source] reqwest::Error),
    /// The given header value could not be parsed
    #[error("Header could not be parsed")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    /// The configured request rate is not a positive number
    #[error("Maximum request rate must be a positive number of requests per second, got {0}")]
    InvalidRateLimit(f64),
    /// The retry policy parameters are out of bounds
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
    /// Some other configuration value is out of bounds
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ErrorKind {
    /// Returns `true` for errors raised by target validation, before any
    /// network attempt is made. These are terminal and consume no
    /// rate-limit budget.
    #[must_use]
    pub const fn is_invalid_target(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget(_, _) | Self::UnsupportedScheme(_, _) | Self::MissingHost(_)
        )
    }

    /// Return the underlying `reqwest::Error` (if any)
    #[must_use]
    pub const fn reqwest_error(&self) -> Option<&reqwest::Error> {
        match self {
            Self::NetworkRequest(e)
            | Self::Timeout(e)
            | Self::ReadResponseBody(e)
            | Self::BuildRequestClient(e) => Some(e),
            _ => None,
        }
    }

    /// A short, stable label for the error class.
    ///
    /// Used for grouping failures in summaries and in the serialized
    /// outcome contract.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidTarget(_, _) | Self::UnsupportedScheme(_, _) | Self::MissingHost(_) => {
                "invalid_target"
            }
            Self::NetworkRequest(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::RejectedStatusCode(_) => "http_status",
            Self::ReadResponseBody(_) => "body",
            Self::BuildRequestClient(_) | Self::InvalidHeader(_) => "client",
            Self::InvalidRateLimit(_) | Self::InvalidRetryPolicy(_) | Self::InvalidConfig(_) => {
                "config"
            }
        }
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidTarget(s1, e1), Self::InvalidTarget(s2, e2)) => s1 == s2 && e1 == e2,
            (Self::UnsupportedScheme(u1, s1), Self::UnsupportedScheme(u2, s2)) => {
                u1 == u2 && s1 == s2
            }
            (Self::MissingHost(u1), Self::MissingHost(u2)) => u1 == u2,
            // `reqwest::Error` does not implement `PartialEq`; comparing the
            // rendered message is the best we can do
            (Self::NetworkRequest(e1), Self::NetworkRequest(e2))
            | (Self::Timeout(e1), Self::Timeout(e2))
            | (Self::ReadResponseBody(e1), Self::ReadResponseBody(e2))
            | (Self::BuildRequestClient(e1), Self::BuildRequestClient(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::RejectedStatusCode(c1), Self::RejectedStatusCode(c2)) => c1 == c2,
            (Self::InvalidHeader(_), Self::InvalidHeader(_)) => true,
            (Self::InvalidRateLimit(r1), Self::InvalidRateLimit(r2)) => r1 == r2,
            (Self::InvalidRetryPolicy(m1), Self::InvalidRetryPolicy(m2))
            | (Self::InvalidConfig(m1), Self::InvalidConfig(m2)) => m1 == m2,
            _ => false,
        }
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H>(&self, state: &mut H)
    where
        H: std::hash::Hasher,
    {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::InvalidTarget(s, e) => (s, e.to_string()).hash(state),
            Self::UnsupportedScheme(u, s) => (u, s).hash(state),
            Self::MissingHost(u) => u.hash(state),
            Self::NetworkRequest(e)
            | Self::Timeout(e)
            | Self::ReadResponseBody(e)
            | Self::BuildRequestClient(e) => e.to_string().hash(state),
            Self::RejectedStatusCode(c) => c.hash(state),
            Self::InvalidHeader(e) => e.to_string().hash(state),
            Self::InvalidRateLimit(r) => r.to_bits().hash(state),
            Self::InvalidRetryPolicy(m) | Self::InvalidConfig(m) => m.hash(state),
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
