//! Export inversion results to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::inversion::Inversion;

/// Write station and event terms to a CSV file.
///
/// One row per station (in index order), then one row per event.
pub fn write_terms_csv(path: &Path, inversion: &Inversion) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create terms CSV '{}': {e}", path.display())))?;
    write_terms(&mut file, inversion).map_err(|e| AppError::io(format!("Failed to write terms CSV: {e}")))
}

/// Write observed/fitted/residual rows to a CSV file.
pub fn write_fitted_csv(path: &Path, inversion: &Inversion) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create fitted CSV '{}': {e}", path.display())))?;
    write_fitted(&mut file, inversion).map_err(|e| AppError::io(format!("Failed to write fitted CSV: {e}")))
}

fn write_terms<W: Write>(out: &mut W, inversion: &Inversion) -> std::io::Result<()> {
    writeln!(out, "kind,index,name,delay,n_obs")?;
    for t in inversion.named_stations() {
        writeln!(out, "station,{},{},{:.10},{}", t.index, t.name, t.delay, t.n_obs)?;
    }
    for t in inversion.named_events() {
        writeln!(out, "event,{},{},{:.10},{}", t.index, t.name, t.delay, t.n_obs)?;
    }
    Ok(())
}

fn write_fitted<W: Write>(out: &mut W, inversion: &Inversion) -> std::io::Result<()> {
    writeln!(out, "index,station,event,observed,fitted,residual")?;
    for r in inversion.fitted_observations() {
        writeln!(
            out,
            "{},{},{},{:.10},{:.10},{:.10}",
            r.index, r.station, r.event, r.observed, r.fitted, r.residual
        )?;
    }
    Ok(())
}
