//! Reporting utilities: residual statistics and formatted terminal output.

use crate::domain::FittedObservation;

pub mod format;

pub use format::*;

/// Summary of observation residuals (`observed - fitted`).
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualStats {
    pub n: usize,
    pub mean: f64,
    pub rms: f64,
    pub max_abs: f64,
}

/// Compute residual statistics; `None` for an empty slice.
pub fn residual_stats(rows: &[FittedObservation]) -> Option<ResidualStats> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len();
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut max_abs = 0.0_f64;
    for r in rows {
        sum += r.residual;
        sum_sq += r.residual * r.residual;
        max_abs = max_abs.max(r.residual.abs());
    }
    Some(ResidualStats {
        n,
        mean: sum / n as f64,
        rms: (sum_sq / n as f64).sqrt(),
        max_abs,
    })
}
