//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - reads station logs or generates synthetic data
//! - runs the inversion
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, InvertArgs, SimulateArgs, SolveArgs};
use crate::data::SyntheticConfig;
use crate::domain::InversionConfig;
use crate::error::AppError;
use crate::io::ingest::stations_dir_for_ext;

pub mod pipeline;

/// Entry point for the `dt` binary.
pub fn run() -> Result<(), AppError> {
    // Lets `RUST_LOG` live in a local `.env`.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Invert(args) => handle_invert(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_invert(args: InvertArgs) -> Result<(), AppError> {
    let config = inversion_config_from_args(&args.solve)?;
    let dir = match (&args.source.dir, &args.source.ext) {
        (Some(dir), _) => dir.clone(),
        (None, Some(ext)) => stations_dir_for_ext(ext),
        (None, None) => return Err(AppError::io("Either --ext or --dir is required.")),
    };

    let run = pipeline::run_invert(&dir, &config)?;
    let inv = &run.inversion;

    println!("{}", crate::report::format_run_summary(inv));
    println!(
        "Input: {} station log(s) read, {} other entries skipped, {} line(s) rejected\n",
        run.ingest.files_read,
        run.ingest.files_skipped,
        run.ingest.row_errors.len()
    );
    println!("{}", crate::report::format_terms_table("Stations", &inv.named_stations(), args.top));
    println!("{}", crate::report::format_terms_table("Events", &inv.named_events(), args.top));

    if let Some(path) = &args.terms_csv {
        crate::io::export::write_terms_csv(path, inv)?;
    }
    if let Some(path) = &args.fitted_csv {
        crate::io::export::write_fitted_csv(path, inv)?;
    }
    if let Some(path) = &args.solve.json {
        crate::io::bundle::write_terms_json(path, inv, config.want_fitted)?;
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = inversion_config_from_args(&args.solve)?;
    let synthetic = synthetic_config_from_args(&args);

    let outcomes = pipeline::run_simulation(&synthetic, args.trials, &config)?;

    for o in &outcomes {
        println!(
            "seed={:<6} k={:<6} method={:<16} max|fit-truth|={:.6}",
            o.seed,
            o.inversion.data.n_observations(),
            o.inversion.diagnostics.method.display_name(),
            o.max_fit_error
        );
    }

    if let Some(first) = outcomes.first() {
        if outcomes.len() == 1 {
            println!("\n{}", crate::report::format_run_summary(&first.inversion));
        }
        if let Some(path) = &args.solve.json {
            crate::io::bundle::write_terms_json(path, &first.inversion, config.want_fitted)?;
        }
    }

    Ok(())
}

pub fn inversion_config_from_args(args: &SolveArgs) -> Result<InversionConfig, AppError> {
    if let Some(rcond) = args.rcond {
        if !(rcond.is_finite() && rcond >= 0.0) {
            return Err(AppError::io("--rcond must be finite and >= 0."));
        }
    }
    Ok(InversionConfig {
        want_fitted: args.fitted,
        rcond: args.rcond,
    })
}

pub fn synthetic_config_from_args(args: &SimulateArgs) -> SyntheticConfig {
    SyntheticConfig {
        n_stations: args.stations,
        n_events: args.events,
        coverage: args.coverage,
        term_sigma: args.term_sigma,
        noise_sigma: args.noise,
        seed: args.seed,
    }
}
