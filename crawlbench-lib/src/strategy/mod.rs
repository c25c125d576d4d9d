//! The three interchangeable fetch strategies.
//!
//! All strategies implement [`FetchStrategy`] and produce the same
//! logical outcome set for the same targets under the same network
//! conditions; the strategy is a performance dimension, not a
//! correctness dimension. Selection happens via [`StrategyKind`] and
//! explicit configuration, not runtime type inspection.
//!
//! The strategies differ in how they *absorb* targets whose transient
//! failures exhausted all retry attempts:
//!
//! - [`Sequential`] reports every target, including failures.
//! - [`WorkerPool`] and [`Concurrent`] silently drop exhausted targets,
//!   so callers must not assume `len(output) == len(input)` for them.
//!
//! This asymmetry is deliberate, documented per strategy and pinned by
//! tests. Malformed targets and terminal failures are reported as
//! outcomes by every strategy.

mod concurrent;
mod sequential;
mod worker_pool;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub use concurrent::Concurrent;
pub use sequential::Sequential;
pub use worker_pool::WorkerPool;

use crate::{
    client::ClientBuilder, CrawlConfig, Outcome, RateLimiter, Result, RetryExt, RetryPolicy,
};

/// A way of fetching a set of targets.
///
/// One `crawl` call produces at most one outcome per target. A failing
/// target never prevents outcomes for the rest.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Fetch all targets and assemble their outcomes.
    async fn crawl(&self, targets: &[String]) -> Vec<Outcome>;

    /// Which strategy this is, for reporting.
    fn kind(&self) -> StrategyKind;
}

/// Selects one of the three fetch strategies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// One target at a time, fixed inter-request delay, single attempt
    Sequential,
    /// Bounded pool of workers, retry with absorb-to-null
    WorkerPool,
    /// One task per target on a single execution context, shared rate
    /// limiter, retry with absorb-to-null
    Concurrent,
}

impl StrategyKind {
    /// Build the selected strategy from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the configuration violates any bound or the
    /// request client cannot be created.
    pub fn build(self, config: &CrawlConfig) -> Result<Box<dyn FetchStrategy>> {
        config.validate()?;
        let client = ClientBuilder::builder()
            .timeout(Some(config.per_request_timeout))
            .build()
            .client()?;

        Ok(match self {
            Self::Sequential => Box::new(Sequential::new(client, config.sequential_delay)),
            Self::WorkerPool => Box::new(WorkerPool::new(
                client,
                RetryPolicy::new(
                    config.max_attempts,
                    config.initial_delay,
                    config.backoff_factor,
                )?,
                config.pool_size,
            )),
            Self::Concurrent => Box::new(Concurrent::new(
                client,
                RateLimiter::new(config.max_rate, config.max_concurrent)?,
                RetryPolicy::new(
                    config.max_attempts,
                    config.initial_delay,
                    config.backoff_factor,
                )?,
            )),
        })
    }
}

/// A convenience function to crawl a list of targets with one strategy
/// and the default configuration.
///
/// # Errors
///
/// Returns an `Err` if the strategy cannot be built. Individual fetch
/// failures are part of the returned outcomes, not errors.
pub async fn crawl(kind: StrategyKind, targets: &[String]) -> Result<Vec<Outcome>> {
    let strategy = kind.build(&CrawlConfig::default())?;
    Ok(strategy.crawl(targets).await)
}

/// Absorb-to-null mapping shared by the worker-pool and concurrent
/// strategies.
///
/// Exhausted transient failures yield no result; successes, malformed
/// targets and terminal failures are passed through as outcomes.
pub(crate) fn absorb_exhausted(outcome: Outcome) -> Option<Outcome> {
    match outcome {
        Outcome::Failure { target, error } if error.should_retry() => {
            log::warn!("Giving up on {target} after retries: {error}");
            None
        }
        outcome => Some(outcome),
    }
}
