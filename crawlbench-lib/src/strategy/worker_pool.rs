use std::convert::TryFrom;

use async_trait::async_trait;
use futures::{future, stream, StreamExt};

use super::{absorb_exhausted, FetchStrategy, StrategyKind};
use crate::{Client, Outcome, RetryPolicy, Target};

/// Dispatches all targets to a bounded pool of workers.
///
/// Each worker is spawned onto the runtime as its own task, so workers
/// run in parallel across runtime threads rather than interleaving
/// inside the caller's task. At most `pool_size` workers are in flight;
/// a slow request in one worker does not block the others. Each worker
/// performs the retry-wrapped fetch in absorb-to-null mode: targets
/// whose transient failures exhausted all attempts are silently dropped
/// from the output, so callers must not assume
/// `len(output) == len(input)`. A worker that panics is treated like a
/// dropped target. No output order is guaranteed beyond each target
/// appearing at most once.
///
/// This strategy is rate-limited only by the per-request timeout; it does
/// not share the async rate limiter with [`Concurrent`](super::Concurrent).
/// That non-uniformity is intentional and covered by tests.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    client: Client,
    retry: RetryPolicy,
    pool_size: usize,
}

impl WorkerPool {
    #[must_use]
    pub const fn new(client: Client, retry: RetryPolicy, pool_size: usize) -> Self {
        Self {
            client,
            retry,
            pool_size,
        }
    }
}

#[async_trait]
impl FetchStrategy for WorkerPool {
    async fn crawl(&self, targets: &[String]) -> Vec<Outcome> {
        // The stream is lazy, so at most `pool_size` workers are spawned
        // but not yet joined at any time
        stream::iter(targets.to_vec())
            .map(|raw| {
                let client = self.client.clone();
                let retry = self.retry;
                tokio::spawn(async move {
                    let target = match Target::try_from(raw.as_str()) {
                        Ok(target) => target,
                        Err(error) => {
                            log::warn!("Invalid target: {error}");
                            return Some(Outcome::Failure { target: raw, error });
                        }
                    };
                    let outcome = retry.run(|| client.fetch(&target)).await;
                    absorb_exhausted(outcome)
                })
            })
            .buffer_unordered(self.pool_size)
            .filter_map(|worker| future::ready(worker.ok().flatten()))
            .collect()
            .await
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::WorkerPool
    }
}
