use std::convert::TryFrom;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{FetchStrategy, StrategyKind};
use crate::{Client, Outcome, Target};

/// The performance floor: fetches targets one at a time.
///
/// Each target is validated, then fetched with exactly one attempt, no
/// retry. Requests are paced by a fixed inter-request sleep rather than
/// the shared async rate limiter; this is a deliberate simplification
/// baseline.
///
/// Unlike the other strategies, every target produces an outcome, so
/// `crawl` returns exactly one entry per input, failures included.
#[derive(Debug, Clone)]
pub struct Sequential {
    client: Client,
    delay: Duration,
}

impl Sequential {
    #[must_use]
    pub const fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }
}

#[async_trait]
impl FetchStrategy for Sequential {
    async fn crawl(&self, targets: &[String]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        let mut first_request = true;

        for raw in targets {
            let target = match Target::try_from(raw.as_str()) {
                Ok(target) => target,
                Err(error) => {
                    log::warn!("Invalid target: {error}");
                    outcomes.push(Outcome::Failure {
                        target: raw.clone(),
                        error,
                    });
                    continue;
                }
            };

            // Rejected targets above consume no delay budget
            if !first_request {
                sleep(self.delay).await;
            }
            first_request = false;

            outcomes.push(self.client.fetch(&target).await);
        }

        outcomes
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{mock_server, ClientBuilder, ErrorKind};

    fn strategy(delay: Duration) -> Sequential {
        Sequential::new(ClientBuilder::default().client().unwrap(), delay)
    }

    #[tokio::test]
    async fn test_one_outcome_per_target() {
        let mock_server = mock_server!(StatusCode::OK);
        let ok = format!("{}/x", mock_server.uri());
        let targets = vec![ok.clone(), "not a url".to_string(), ok];

        let outcomes = strategy(Duration::ZERO).crawl(&targets).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 2);
        assert!(matches!(
            outcomes[1].error(),
            Some(&ErrorKind::InvalidTarget(_, _))
        ));
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_dropped() {
        let mock_server = mock_server!(StatusCode::INTERNAL_SERVER_ERROR);
        let targets = vec![format!("{}/a", mock_server.uri())];

        let outcomes = strategy(Duration::ZERO).crawl(&targets).await;

        // Single attempt, no retry; the 500 shows up as a failure
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].error(),
            Some(&ErrorKind::RejectedStatusCode(
                StatusCode::INTERNAL_SERVER_ERROR
            ))
        );
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inter_request_delay() {
        let mock_server = mock_server!(StatusCode::OK);
        let targets: Vec<_> = (0..3).map(|i| format!("{}/{i}", mock_server.uri())).collect();

        let start = Instant::now();
        let outcomes = strategy(Duration::from_millis(100)).crawl(&targets).await;

        // Two inter-request gaps for three targets
        assert_eq!(outcomes.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
