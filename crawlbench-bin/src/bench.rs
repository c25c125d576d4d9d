use std::fmt;
use std::time::Instant;

use anyhow::Result;
use crawlbench_lib::{CrawlConfig, StrategyKind};
use serde::Serialize;

/// Wall-clock timings of one strategy over repeated runs.
#[derive(Debug, Serialize)]
pub(crate) struct BenchReport {
    pub(crate) strategy: StrategyKind,
    pub(crate) runs: usize,
    pub(crate) mean_secs: f64,
    pub(crate) std_dev_secs: f64,
    pub(crate) min_secs: f64,
    pub(crate) max_secs: f64,
}

impl BenchReport {
    fn from_times(strategy: StrategyKind, times: &[f64]) -> Self {
        let runs = times.len();
        let mean = times.iter().sum::<f64>() / runs as f64;
        let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / runs as f64;

        Self {
            strategy,
            runs,
            mean_secs: mean,
            std_dev_secs: variance.sqrt(),
            min_secs: times.iter().copied().fold(f64::INFINITY, f64::min),
            max_secs: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} mean {:.3}s \u{00b1} {:.3}s (min {:.3}s, max {:.3}s, {} runs)",
            self.strategy, self.mean_secs, self.std_dev_secs, self.min_secs, self.max_secs, self.runs
        )
    }
}

/// Run one strategy `runs` times over the same targets and report its
/// timing distribution. The outcomes themselves are discarded; only the
/// wall-clock time per run is kept.
pub(crate) async fn benchmark_strategy(
    kind: StrategyKind,
    config: &CrawlConfig,
    targets: &[String],
    runs: usize,
) -> Result<BenchReport> {
    let strategy = kind.build(config)?;
    let mut times = Vec::with_capacity(runs);

    for run in 1..=runs {
        let start = Instant::now();
        let outcomes = strategy.crawl(targets).await;
        let elapsed = start.elapsed().as_secs_f64();
        log::info!(
            "{kind} run {run}/{runs}: {elapsed:.4}s, {} outcomes",
            outcomes.len()
        );
        times.push(elapsed);
    }

    Ok(BenchReport::from_times(kind, &times))
}
