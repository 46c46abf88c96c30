//! Read/write the JSON result bundle.
//!
//! The bundle is the "portable" representation of an inversion run:
//! - solve diagnostics (method, rank, condition number)
//! - named station and event terms
//! - optionally the observation-level fitted values
//!
//! The schema is defined by `domain::TermsFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::domain::TermsFile;
use crate::error::AppError;
use crate::inversion::Inversion;

/// Assemble the bundle for an inversion.
pub fn terms_file(inversion: &Inversion, include_fitted: bool) -> TermsFile {
    let cond = inversion.diagnostics.condition_number;
    TermsFile {
        tool: "dt".to_string(),
        created: Local::now(),
        n_observations: inversion.data.n_observations(),
        method: inversion.diagnostics.method,
        rank: inversion.diagnostics.rank,
        condition_number: cond.is_finite().then_some(cond),
        stations: inversion.named_stations(),
        events: inversion.named_events(),
        fitted: include_fitted.then(|| inversion.fitted_observations()),
    }
}

/// Write a JSON bundle.
pub fn write_terms_json(path: &Path, inversion: &Inversion, include_fitted: bool) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create terms JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &terms_file(inversion, include_fitted))
        .map_err(|e| AppError::io(format!("Failed to write terms JSON: {e}")))?;

    Ok(())
}

/// Read a JSON bundle.
pub fn read_terms_json(path: &Path) -> Result<TermsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open terms JSON '{}': {e}", path.display())))?;
    let terms: TermsFile =
        serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid terms JSON: {e}")))?;
    Ok(terms)
}
