use std::convert::TryFrom;

use async_trait::async_trait;
use futures::future::join_all;

use super::{absorb_exhausted, FetchStrategy, StrategyKind};
use crate::{Client, Outcome, RateLimiter, RetryPolicy, Target};

/// Launches one task per target on a single execution context.
///
/// All tasks are started before any is required to finish (fan-out, then
/// fan-in); they interleave cooperatively at I/O boundaries rather than
/// running in parallel. Each task acquires the shared [`RateLimiter`]
/// and holds the admission for its whole attempt sequence, so this is
/// the only strategy that enforces the global requests-per-second
/// ceiling across all in-flight targets.
///
/// Retries run in absorb-to-null mode: exhausted targets are filtered
/// from the output, matching [`WorkerPool`](super::WorkerPool).
#[derive(Debug)]
pub struct Concurrent {
    client: Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl Concurrent {
    #[must_use]
    pub const fn new(client: Client, limiter: RateLimiter, retry: RetryPolicy) -> Self {
        Self {
            client,
            limiter,
            retry,
        }
    }

    async fn fetch_one(&self, raw: &str) -> Option<Outcome> {
        let target = match Target::try_from(raw) {
            Ok(target) => target,
            Err(error) => {
                // Rejected before any admission is consumed
                log::warn!("Invalid target: {error}");
                return Some(Outcome::Failure {
                    target: raw.to_owned(),
                    error,
                });
            }
        };

        let admission = self.limiter.acquire().await;
        let outcome = self.retry.run(|| self.client.fetch(&target)).await;
        drop(admission);

        absorb_exhausted(outcome)
    }
}

#[async_trait]
impl FetchStrategy for Concurrent {
    async fn crawl(&self, targets: &[String]) -> Vec<Outcome> {
        let tasks = targets.iter().map(|raw| self.fetch_one(raw));
        join_all(tasks).await.into_iter().flatten().collect()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Concurrent
    }
}
