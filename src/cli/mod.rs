//! Command-line parsing for the delay-time inversion tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the inversion/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dt", version, about = "Station/event delay-time inversion")]
pub struct Cli {
    /// Enable debug logging (otherwise `RUST_LOG` decides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Invert station delay logs for per-station and per-event delay terms.
    Invert(InvertArgs),
    /// Generate synthetic observations with known terms and invert them.
    Simulate(SimulateArgs),
}

/// Where to find station logs.
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Extension tag; logs are read from `<EXT>_stations_data`.
    #[arg(short = 'e', long)]
    pub ext: Option<String>,

    /// Read logs from this directory instead.
    #[arg(short = 'd', long)]
    pub dir: Option<PathBuf>,
}

/// Options shared by every command that runs an inversion.
#[derive(Debug, Args, Clone)]
pub struct SolveArgs {
    /// Also compute and report fitted observations.
    #[arg(long)]
    pub fitted: bool,

    /// Relative singular-value cutoff for rank detection (default: (n+m)·ε).
    #[arg(long)]
    pub rcond: Option<f64>,

    /// Write the JSON result bundle.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct InvertArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub solve: SolveArgs,

    /// Rows shown per term table (0 = all).
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Write station and event terms to CSV.
    #[arg(long = "terms-csv", value_name = "CSV")]
    pub terms_csv: Option<PathBuf>,

    /// Write observed/fitted/residual rows to CSV.
    #[arg(long = "fitted-csv", value_name = "CSV")]
    pub fitted_csv: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub solve: SolveArgs,

    /// Number of stations.
    #[arg(long, default_value_t = 12)]
    pub stations: usize,

    /// Number of events.
    #[arg(long, default_value_t = 40)]
    pub events: usize,

    /// Probability that a station recorded a given event.
    #[arg(long, default_value_t = 0.7)]
    pub coverage: f64,

    /// Standard deviation of the true terms.
    #[arg(long, default_value_t = 0.5)]
    pub term_sigma: f64,

    /// Observation noise standard deviation.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Random seed (trial `t` uses `seed + t`).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Independent data sets to invert (in parallel).
    #[arg(long, default_value_t = 1)]
    pub trials: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_invert_with_ext() {
        let cli = Cli::try_parse_from(["dt", "invert", "-e", "ttp", "--fitted", "--top", "5"]).unwrap();
        match cli.command {
            Command::Invert(args) => {
                assert_eq!(args.source.ext.as_deref(), Some("ttp"));
                assert!(args.solve.fitted);
                assert_eq!(args.top, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn invert_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["dt", "invert"]).is_err());
        assert!(Cli::try_parse_from(["dt", "invert", "-e", "x", "-d", "y"]).is_err());
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["dt", "-v", "simulate"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!((args.stations, args.events, args.trials), (12, 40, 1));
                assert!(!args.solve.fitted);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
