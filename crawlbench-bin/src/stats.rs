use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crawlbench_lib::{Outcome, StrategyKind};
use serde::Serialize;

/// Summary of a single crawl run.
///
/// `dropped` counts targets that produced no outcome at all, which
/// happens when a strategy absorbs exhausted retries.
#[derive(Debug, Serialize)]
pub(crate) struct CrawlStats {
    pub(crate) strategy: StrategyKind,
    pub(crate) requested: usize,
    pub(crate) successes: usize,
    pub(crate) failures: usize,
    pub(crate) dropped: usize,
    pub(crate) failures_by_kind: BTreeMap<String, usize>,
    pub(crate) duration_secs: f64,
}

impl CrawlStats {
    pub(crate) fn new(
        strategy: StrategyKind,
        requested: usize,
        outcomes: &[Outcome],
        duration: Duration,
    ) -> Self {
        let successes = outcomes.iter().filter(|o| o.is_success()).count();
        let failures = outcomes.len() - successes;
        let mut failures_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for error in outcomes.iter().filter_map(Outcome::error) {
            *failures_by_kind.entry(error.label().to_string()).or_default() += 1;
        }

        Self {
            strategy,
            requested,
            successes,
            failures,
            dropped: requested.saturating_sub(outcomes.len()),
            failures_by_kind,
            duration_secs: duration.as_secs_f64(),
        }
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n\u{1f4dd} Summary ({})", self.strategy)?;
        writeln!(f, "---------------------")?;
        writeln!(f, "\u{1f50d} Requested.....{}", self.requested)?;
        writeln!(f, "\u{2705} Successful....{}", self.successes)?;
        write!(f, "\u{26a0}\u{fe0f} Failed........{}", self.failures)?;
        if !self.failures_by_kind.is_empty() {
            let kinds: Vec<_> = self
                .failures_by_kind
                .iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect();
            write!(f, " ({})", kinds.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "\u{1f6ab} Dropped.......{}", self.dropped)?;
        write!(f, "\u{23f1}\u{fe0f} Duration......{:.2}s", self.duration_secs)
    }
}
