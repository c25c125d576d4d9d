use std::fs;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crawlbench_lib::StrategyKind;
use strum::IntoEnumIterator;

mod bench;
mod options;
mod stats;

use options::{Opts, OutputFormat};
use stats::CrawlStats;

/// Exit code of the whole program. `1` is reserved for unexpected
/// errors, which `main` produces by returning `Err`.
#[derive(Debug, Clone, Copy)]
enum ExitCode {
    Success = 0,
    FetchFailure = 2,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let filter = if opts.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let exit_code = run(&opts)?;
    std::process::exit(exit_code as i32);
}

#[tokio::main]
async fn run(opts: &Opts) -> Result<ExitCode> {
    let targets = collect_targets(opts)?;
    if targets.is_empty() {
        bail!("No targets given. Pass URLs as arguments or via --input");
    }
    let config = opts.crawl_config()?;

    if opts.bench {
        if opts.runs == 0 {
            bail!("--runs must be at least 1");
        }
        for kind in StrategyKind::iter() {
            let report = bench::benchmark_strategy(kind, &config, &targets, opts.runs).await?;
            match opts.format {
                OutputFormat::Compact => println!("{report}"),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        return Ok(ExitCode::Success);
    }

    let strategy = opts.strategy.build(&config)?;
    let start = Instant::now();
    let outcomes = strategy.crawl(&targets).await;
    let stats = CrawlStats::new(opts.strategy, targets.len(), &outcomes, start.elapsed());

    if opts.verbose {
        for outcome in &outcomes {
            println!("{outcome}");
        }
    }
    match opts.format {
        OutputFormat::Compact => println!("{stats}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    if stats.failures > 0 || stats.dropped > 0 {
        Ok(ExitCode::FetchFailure)
    } else {
        Ok(ExitCode::Success)
    }
}

/// Positional targets first, then the optional input file. Within the
/// file, empty lines and `#` comments are skipped.
fn collect_targets(opts: &Opts) -> Result<Vec<String>> {
    let mut targets = opts.targets.clone();
    if let Some(path) = &opts.input {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file `{}`", path.display()))?;
        targets.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(ToOwned::to_owned),
        );
    }
    Ok(targets)
}
