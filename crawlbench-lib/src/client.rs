//! HTTP client used by every fetch strategy.
//!
//! This module defines two structs, [`Client`] and [`ClientBuilder`].
//! `Client` issues one GET request per call and maps the result into the
//! uniform [`Outcome`] contract. `ClientBuilder` exposes a finer level of
//! granularity for building a `Client`.
use std::time::Duration;

use http::header::{self, HeaderMap, HeaderValue};
use typed_builder::TypedBuilder;

use crate::{ErrorKind, Outcome, Result, Target};

/// Default number of redirects before a request is deemed as failed, 5.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
/// Default timeout in seconds before a request is deemed as failed, 20.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
/// Default user agent, `crawlbench-<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("crawlbench/", env!("CARGO_PKG_VERSION"));

// Constants currently not configurable by the user.
/// A timeout for only the connect phase of a request.
const CONNECT_TIMEOUT: u64 = 10;
/// TCP keepalive
/// See <https://tldp.org/HOWTO/TCP-Keepalive-HOWTO/overview.html> for more info
const TCP_KEEPALIVE: u64 = 60;

/// Builder for [`Client`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
pub struct ClientBuilder {
    /// User-agent used for all requests.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,

    /// Response timeout per request.
    ///
    /// This is the sole cancellation mechanism: an attempt exceeding the
    /// timeout fails with a retryable `ErrorKind::Timeout`. When unset,
    /// [`DEFAULT_TIMEOUT_SECS`] applies, so no attempt blocks
    /// indefinitely.
    timeout: Option<Duration>,

    /// Maximum number of redirects per request before returning an error.
    #[builder(default = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,

    /// Sets the default headers for every request.
    custom_headers: HeaderMap,
}

impl Default for ClientBuilder {
    #[must_use]
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the user-agent is invalid or the request
    /// client cannot be created.
    pub fn client(self) -> Result<Client> {
        let mut headers = self.custom_headers;
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let reqwest_client = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT))
            .tcp_keepalive(Duration::from_secs(TCP_KEEPALIVE))
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .build()
            .map_err(ErrorKind::BuildRequestClient)?;

        Ok(Client { reqwest_client })
    }
}

/// Performs one fetch attempt per call and returns the uniform outcome
/// contract consumed by every strategy.
///
/// See [`ClientBuilder`] which contains sane defaults for all
/// configuration options.
#[derive(Debug, Clone)]
pub struct Client {
    /// HTTP request client.
    ///
    /// [reqwest]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
    reqwest_client: reqwest::Client,
}

impl Client {
    /// Fetch a single validated target with one GET request.
    ///
    /// Never panics and never blocks indefinitely; the per-request
    /// timeout bounds every attempt. Status codes outside the 2xx range
    /// are reported as `ErrorKind::RejectedStatusCode` so the retry layer
    /// can classify them.
    pub async fn fetch(&self, target: &Target) -> Outcome {
        match self.reqwest_client.get(target.as_str()).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Outcome::Failure {
                        target: target.to_string(),
                        error: ErrorKind::RejectedStatusCode(status),
                    };
                }
                match response.text().await {
                    Ok(body) => Outcome::Success {
                        target: target.clone(),
                        status,
                        body,
                    },
                    Err(e) => Outcome::Failure {
                        target: target.to_string(),
                        error: ErrorKind::ReadResponseBody(e),
                    },
                }
            }
            Err(e) if e.is_timeout() => Outcome::Failure {
                target: target.to_string(),
                error: ErrorKind::Timeout(e),
            },
            Err(e) => Outcome::Failure {
                target: target.to_string(),
                error: ErrorKind::NetworkRequest(e),
            },
        }
    }
}
