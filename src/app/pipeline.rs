//! Shared "inversion pipeline" logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read/generate observations -> index -> invert
//!
//! The commands can then focus on presentation and exports.

use std::path::Path;

use crate::data::{SyntheticConfig, SyntheticData, generate};
use crate::domain::InversionConfig;
use crate::error::AppError;
use crate::inversion::{Inversion, assign_indices, invert, invert_many};
use crate::io::ingest::{IngestedData, load_station_logs};

/// All computed outputs of a single `dt invert` run.
#[derive(Debug, Clone)]
pub struct InvertRun {
    pub ingest: IngestedData,
    pub inversion: Inversion,
}

/// One synthetic trial and how well it was recovered.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub seed: u64,
    pub data: SyntheticData,
    pub inversion: Inversion,
    pub max_fit_error: f64,
}

/// Read station logs from `dir` and invert them.
pub fn run_invert(dir: &Path, config: &InversionConfig) -> Result<InvertRun, AppError> {
    let ingest = load_station_logs(dir)?;
    tracing::info!(
        files = ingest.files_read,
        skipped = ingest.files_skipped,
        observations = ingest.observations.n_observations(),
        row_errors = ingest.row_errors.len(),
        "loaded station logs"
    );

    let inversion = invert(&ingest.observations, config)?;
    Ok(InvertRun { ingest, inversion })
}

/// Generate `trials` synthetic data sets and invert them in parallel.
///
/// Fails on the first trial (in seed order) that cannot be inverted.
pub fn run_simulation(
    synthetic: &SyntheticConfig,
    trials: usize,
    config: &InversionConfig,
) -> Result<Vec<TrialOutcome>, AppError> {
    if trials == 0 {
        return Err(AppError::io("Trial count must be > 0."));
    }

    let mut datasets = Vec::with_capacity(trials);
    for t in 0..trials {
        let seed = synthetic.seed.wrapping_add(t as u64);
        let data = generate(&SyntheticConfig {
            seed,
            ..synthetic.clone()
        })?;
        datasets.push((seed, data));
    }

    let indexed: Vec<_> = datasets
        .iter()
        .map(|(_, data)| assign_indices(data.records.iter().cloned()))
        .collect();
    let results = invert_many(&indexed, config);

    let mut outcomes = Vec::with_capacity(trials);
    for ((seed, data), result) in datasets.into_iter().zip(results) {
        let inversion = result?;
        let max_fit_error = data.max_fit_error(&inversion);
        tracing::debug!(seed, max_fit_error, "trial inverted");
        outcomes.push(TrialOutcome {
            seed,
            data,
            inversion,
            max_fit_error,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_run_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("XA.S1.stdmean.of.stddelay.20240101.txt"),
            "e1 0.1 1.0\ne2 0.1 2.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("XA.S2.stdmean.of.stddelay.20240101.txt"),
            "e1 0.1 3.0\ne2 0.1 4.0\n",
        )
        .unwrap();

        let run = run_invert(dir.path(), &InversionConfig::default()).unwrap();
        let fitted = run.inversion.fitted.unwrap();
        assert!((fitted[3] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn empty_directory_has_nothing_to_solve() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_invert(dir.path(), &InversionConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn simulation_trials_use_consecutive_seeds() {
        let synthetic = SyntheticConfig {
            n_stations: 4,
            n_events: 8,
            coverage: 1.0,
            noise_sigma: 0.0,
            seed: 7,
            ..SyntheticConfig::default()
        };
        let outcomes = run_simulation(&synthetic, 3, &InversionConfig::default()).unwrap();
        let seeds: Vec<u64> = outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, vec![7, 8, 9]);
        assert!(outcomes.iter().all(|o| o.max_fit_error < 1e-9));
    }
}
