//! `crawlbench-lib` fetches a list of URLs under three alternative
//! execution strategies and presents their results behind one uniform
//! outcome contract, so that the strategies can be compared for
//! throughput without differing in what they return.
//!
//! ```no_run
//! use crawlbench_lib::{crawl, Result, StrategyKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let targets = vec!["https://example.com/jobs".to_string()];
//!     let outcomes = crawl(StrategyKind::Concurrent, &targets).await?;
//!     for outcome in outcomes {
//!         println!("{outcome}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For more specific use-cases, build the pieces yourself: a
//! [`CrawlConfig`] describes the scheduling surface (rate ceiling,
//! concurrency cap, retry bounds, timeouts), and
//! [`StrategyKind::build`] turns it into a ready-to-use
//! [`FetchStrategy`].

mod client;
mod config;
mod ratelimit;
mod retry;
mod strategy;
mod types;
mod uri;

#[cfg(test)]
#[macro_use]
pub mod test_utils;

pub use client::{Client, ClientBuilder, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use config::{
    CrawlConfig, DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_RATE, DEFAULT_PER_REQUEST_TIMEOUT, DEFAULT_POOL_SIZE, DEFAULT_SEQUENTIAL_DELAY,
};
pub use ratelimit::{Admission, RateLimiter};
pub use retry::{RetryExt, RetryPolicy};
pub use strategy::{crawl, Concurrent, FetchStrategy, Sequential, StrategyKind, WorkerPool};
pub use types::{ErrorKind, Outcome, Result};
pub use uri::Target;
