// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

mod config;
mod simulate;

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use crate::{
    config::{AppConfig, ConfigError},
    simulate::SimulationError,
};

#[derive(Parser, Debug)]
#[command(name = "bay-alloc", version, about = "Pallet-to-bay allocation simulator")]
struct Cli {
    /// TOML configuration file; defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a scenario, run every scan through a session and write a
    /// JSON report.
    Simulate(SimulateArgs),
    /// Print the effective configuration as TOML.
    ShowConfig,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    trucks: Option<u32>,
    /// Overrides `report_path` from the configuration.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to encode configuration: {0}")]
    EncodeConfig(#[from] toml::ser::Error),
}

fn enable_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

fn write_report(path: &Path, report: &simulate::SimulationReport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|source| AppError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}

fn simulate(mut config: AppConfig, args: SimulateArgs) -> Result<(), AppError> {
    if let Some(seed) = args.seed {
        config.scenario = config.scenario.with_seed(seed);
    }
    if let Some(trucks) = args.trucks {
        config.scenario = config.scenario.with_trucks(trucks);
    }
    config.scenario.validate().map_err(ConfigError::from)?;
    if let Some(report) = args.report {
        config.report_path = report;
    }

    let report = simulate::run(&config)?;
    write_report(&config.report_path, &report)?;
    tracing::info!(path = %config.report_path.display(), "report written");
    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    enable_tracing(&config.log_filter);
    match cli.command {
        Command::Simulate(args) => simulate(config, args),
        Command::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_simulate_overrides() {
        let cli = Cli::try_parse_from([
            "bay-alloc",
            "--config",
            "dock.toml",
            "simulate",
            "--seed",
            "7",
            "--trucks",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("dock.toml")));
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.trucks, Some(3));
                assert!(args.report.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_simulate_writes_report_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let args = SimulateArgs {
            seed: Some(5),
            trucks: Some(3),
            report: Some(path.clone()),
        };
        simulate(AppConfig::default(), args).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["seed"].as_u64(), Some(5));
        assert_eq!(json["trucks"].as_u64(), Some(3));
    }

    #[test]
    fn test_simulate_rejects_invalid_overrides() {
        let args = SimulateArgs {
            seed: None,
            trucks: Some(0),
            report: None,
        };
        assert!(matches!(
            simulate(AppConfig::default(), args),
            Err(AppError::Config(ConfigError::Scenario(_)))
        ));
    }
}
