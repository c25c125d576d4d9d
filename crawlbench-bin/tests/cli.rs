//! Network-free end-to-end tests for the `crawlbench` binary.

use std::error::Error;
use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::NamedTempFile;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn main_command() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).expect("Couldn't find test binary");
    // Keep the test independent of any crawlbench.toml in the tree
    cmd.current_dir(env!("CARGO_TARGET_TMPDIR"));
    cmd
}

#[test]
fn test_exclusive_help() -> Result<()> {
    main_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--strategy"))
        .stdout(contains("--bench"));
    Ok(())
}

#[test]
fn test_no_targets_is_an_error() -> Result<()> {
    main_command()
        .assert()
        .failure()
        .code(1)
        .stderr(contains("No targets given"));
    Ok(())
}

#[test]
fn test_malformed_target_exits_with_fetch_failure() -> Result<()> {
    // Malformed targets are rejected before any network access, so
    // this runs offline and must exit with the fetch-failure code
    main_command()
        .args(["--strategy", "sequential", "not a url"])
        .assert()
        .code(2)
        .stdout(contains("Failed........1"));
    Ok(())
}

#[test]
fn test_json_summary_shape() -> Result<()> {
    let output = main_command()
        .args(["--strategy", "sequential", "--format", "json", "not a url"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(json["strategy"], "sequential");
    assert_eq!(json["requested"], 1);
    assert_eq!(json["failures"], 1);
    assert_eq!(json["failures_by_kind"]["invalid_target"], 1);
    Ok(())
}

#[test]
fn test_verbose_prints_individual_outcomes() -> Result<()> {
    main_command()
        .args(["--strategy", "sequential", "--verbose", "not a url"])
        .assert()
        .code(2)
        .stdout(contains("\u{2717} not a url"));
    Ok(())
}

#[test]
fn test_input_file_with_comments() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "# fixtures")?;
    writeln!(file)?;
    writeln!(file, "not a url")?;
    writeln!(file, "also not a url")?;

    main_command()
        .args(["--strategy", "sequential", "--input"])
        .arg(file.path())
        .assert()
        .code(2)
        .stdout(contains("Requested.....2"));
    Ok(())
}

#[test]
fn test_missing_input_file() -> Result<()> {
    main_command()
        .args(["--input", "no-such-file.txt", "https://example.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to read input file"));
    Ok(())
}

#[test]
fn test_unknown_strategy_is_rejected() -> Result<()> {
    main_command()
        .args(["--strategy", "warp", "https://example.com"])
        .assert()
        .failure()
        .stderr(contains("invalid value"));
    Ok(())
}

#[test]
fn test_invalid_config_value_is_rejected() -> Result<()> {
    main_command()
        .args(["--max-rate", "0", "https://example.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("rate"));
    Ok(())
}

#[test]
fn test_config_file_is_read() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    // An invalid value in the file proves it was parsed and applied
    writeln!(file, "max_rate = -3.0")?;

    main_command()
        .args(["--config"])
        .arg(file.path())
        .arg("https://example.com")
        .assert()
        .failure()
        .code(1);
    Ok(())
}

#[test]
fn test_zero_runs_is_rejected() -> Result<()> {
    main_command()
        .args(["--bench", "--runs", "0", "not a url"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("--runs"));
    Ok(())
}
