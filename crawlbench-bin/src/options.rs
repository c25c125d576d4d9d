use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crawlbench_lib::{CrawlConfig, StrategyKind};
use strum::{Display, EnumString};

/// Default name of the configuration file, looked up in the working
/// directory when `--config` is not given.
pub(crate) const CRAWLBENCH_CONFIG_FILE: &str = "crawlbench.toml";

/// The format to use for the final summary
#[derive(Debug, Default, Clone, Copy, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub(crate) enum OutputFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "crawlbench",
    version,
    about = "Compare sequential, worker-pool and concurrent fetch strategies"
)]
pub(crate) struct Opts {
    /// Target URLs to fetch (absolute http/https URLs)
    #[arg(value_name = "URL")]
    pub(crate) targets: Vec<String>,

    /// Read additional targets from a file, one URL per line
    /// (empty lines and lines starting with `#` are skipped)
    #[arg(short, long, value_name = "FILE")]
    pub(crate) input: Option<PathBuf>,

    /// Fetch strategy to run
    #[arg(short, long, default_value = "concurrent", value_name = "STRATEGY")]
    pub(crate) strategy: StrategyKind,

    /// Benchmark all strategies over the same input instead of crawling once
    #[arg(long)]
    pub(crate) bench: bool,

    /// Number of benchmark runs per strategy
    #[arg(long, default_value_t = 5, value_name = "N")]
    pub(crate) runs: usize,

    /// Output format for the summary
    #[arg(short, long, default_value = "compact", value_name = "FORMAT")]
    pub(crate) format: OutputFormat,

    /// Configuration file to use
    #[arg(short, long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Print every individual outcome in addition to the summary
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Maximum requests per second admitted by the shared rate limiter
    #[arg(long, env = "CRAWLBENCH_MAX_RATE", value_name = "RATE")]
    max_rate: Option<f64>,

    /// Cap on concurrently admitted requests
    #[arg(long, env = "CRAWLBENCH_MAX_CONCURRENT", value_name = "N")]
    max_concurrent: Option<NonZeroUsize>,

    /// Total attempts per target, including the first
    #[arg(long, value_name = "N")]
    max_attempts: Option<usize>,

    /// Initial wait time between attempts, e.g. `1s` or `500ms`
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    initial_delay: Option<Duration>,

    /// Multiplier applied to the wait time after each attempt
    #[arg(long, value_name = "FACTOR")]
    backoff_factor: Option<f64>,

    /// Timeout per request attempt
    #[arg(short, long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    timeout: Option<Duration>,

    /// Number of workers in the worker-pool strategy
    #[arg(long, value_name = "N")]
    pool_size: Option<usize>,

    /// Fixed delay between requests of the sequential baseline
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    sequential_delay: Option<Duration>,
}

impl Opts {
    /// Assemble the crawl configuration: start from the TOML config file
    /// (explicit `--config`, or `crawlbench.toml` if present), then layer
    /// the given CLI flags on top.
    pub(crate) fn crawl_config(&self) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => parse_config(path)?,
            None => {
                let default = PathBuf::from(CRAWLBENCH_CONFIG_FILE);
                if default.is_file() {
                    parse_config(&default)?
                } else {
                    CrawlConfig::default()
                }
            }
        };

        if let Some(max_rate) = self.max_rate {
            config.max_rate = max_rate;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent = Some(max_concurrent);
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(initial_delay) = self.initial_delay {
            config.initial_delay = initial_delay;
        }
        if let Some(backoff_factor) = self.backoff_factor {
            config.backoff_factor = backoff_factor;
        }
        if let Some(timeout) = self.timeout {
            config.per_request_timeout = timeout;
        }
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(sequential_delay) = self.sequential_delay {
            config.sequential_delay = sequential_delay;
        }

        Ok(config)
    }
}

fn parse_config(path: &Path) -> Result<CrawlConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file `{}`", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse configuration file `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let opts = Opts::parse_from([
            "crawlbench",
            "--max-rate",
            "2.5",
            "--max-attempts",
            "7",
            "--timeout",
            "3s",
            "https://example.com",
        ]);
        let config = opts.crawl_config().unwrap();

        assert_eq!(config.max_rate, 2.5);
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.per_request_timeout, Duration::from_secs(3));
        // Untouched values keep their defaults
        assert_eq!(config.backoff_factor, crawlbench_lib::DEFAULT_BACKOFF_FACTOR);
    }

    #[test]
    fn test_config_file_layered_under_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        write!(file, "max_rate = 1.5\npool_size = 9").unwrap();

        let opts = Opts::parse_from([
            "crawlbench",
            "--config",
            file.path().to_str().unwrap(),
            "--max-rate",
            "4.0",
            "https://example.com",
        ]);
        let config = opts.crawl_config().unwrap();

        // The flag wins over the file, the file wins over the default
        assert_eq!(config.max_rate, 4.0);
        assert_eq!(config.pool_size, 9);
    }

    #[test]
    fn test_strategy_parsing() {
        let opts = Opts::parse_from(["crawlbench", "--strategy", "worker-pool"]);
        assert_eq!(opts.strategy, StrategyKind::WorkerPool);

        let opts = Opts::parse_from(["crawlbench"]);
        assert_eq!(opts.strategy, StrategyKind::Concurrent);
    }
}
