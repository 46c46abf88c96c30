//! Normal-equations solver with a pseudoinverse fallback.
//!
//! We solve `G m = d` in the least-squares sense through the normal equations:
//!
//! ```text
//! A = Gᵗ G        b = Gᵗ d        A m = b
//! ```
//!
//! For the station + event model `A` is singular whenever there is at least
//! one station and one event: adding a constant to every station term and
//! subtracting it from every event term leaves all predictions unchanged.
//! So the singular case is the normal case here, not an error.
//!
//! Implementation choices:
//! - `G` is anything implementing [`NormalOperator`]. A dense `DMatrix` forms
//!   `A` and `b` with `tr_mul`; the indicator design matrix assembles them in
//!   O(k) from its nonzeros.
//! - `A` is symmetric positive semidefinite, so one symmetric eigendecomposition
//!   gives both the numerical rank / condition number (`|λ|` are the singular
//!   values of `A`) and the Moore–Penrose pseudoinverse `V · diag(1/λ) · Vᵗ`.
//! - Rank uses the usual relative cutoff `rcond · λ_max`, with
//!   `rcond = cols · ε` unless the caller overrides it.
//! - Full-rank `A` is inverted directly. If that fails, or `A` is rank
//!   deficient, the pseudoinverse picks the minimum-norm model.
//! - Non-finite input is rejected before any decomposition runs, and a model
//!   that does not satisfy `A m = b` is rejected after it.

use nalgebra::{DMatrix, DVector, Dyn, SymmetricEigen};

use crate::domain::SolveMethod;
use crate::inversion::errors::{InversionError, InversionResult};

/// Relative tolerance on `‖A m − b‖` against `‖A‖·‖m‖ + ‖b‖`.
const RESIDUAL_RTOL: f64 = 1e-8;

/// A design operator `G` that can be reduced to normal equations.
pub trait NormalOperator {
    /// `(rows, cols)` of `G`.
    fn shape(&self) -> (usize, usize);

    fn all_finite(&self) -> bool;

    /// `(Gᵗ G, Gᵗ d)`. `d` has one entry per row of `G`.
    fn normal_equations(&self, d: &DVector<f64>) -> (DMatrix<f64>, DVector<f64>);

    /// `G · x`.
    fn apply(&self, x: &DVector<f64>) -> DVector<f64>;
}

impl NormalOperator for DMatrix<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }

    fn normal_equations(&self, d: &DVector<f64>) -> (DMatrix<f64>, DVector<f64>) {
        (self.tr_mul(self), self.tr_mul(d))
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        self * x
    }
}

/// Model vector plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalSolution {
    pub model: DVector<f64>,
    pub method: SolveMethod,
    /// Numerical rank of `GᵗG`.
    pub rank: usize,
    /// `λ_max / λ_min` of `GᵗG`; infinite when numerically rank deficient.
    pub condition_number: f64,
}

impl NormalSolution {
    /// Reconstructed observations `G · model`.
    pub fn fitted<G: NormalOperator + ?Sized>(&self, g: &G) -> DVector<f64> {
        g.apply(&self.model)
    }
}

/// Solve the normal equations for `G m = d`.
pub fn solve_normal_equations<G: NormalOperator + ?Sized>(
    g: &G,
    d: &DVector<f64>,
    rcond: Option<f64>,
) -> InversionResult<NormalSolution> {
    let (rows, cols) = g.shape();
    if rows == 0 {
        return Err(InversionError::EmptyObservationSet);
    }
    if d.len() != rows {
        return Err(InversionError::DimensionMismatch {
            rows,
            values: d.len(),
        });
    }

    let ill = |reason: &str| InversionError::IllConditionedSystem {
        rows,
        cols,
        reason: reason.to_string(),
    };

    if cols == 0 {
        return Err(ill("design matrix has no unknowns"));
    }
    // Eigen iteration on NaN/inf input does not converge, so check up front.
    if !g.all_finite() {
        return Err(ill("design matrix contains non-finite entries"));
    }
    if !d.iter().all(|v| v.is_finite()) {
        return Err(ill("observation vector contains non-finite values"));
    }

    let (a, b) = g.normal_equations(d);

    let eigen = a.clone().symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().map(|l| l.abs()).fold(0.0_f64, f64::max);
    let lambda_min = eigen
        .eigenvalues
        .iter()
        .map(|l| l.abs())
        .fold(f64::INFINITY, f64::min);

    let rcond = rcond.unwrap_or(cols as f64 * f64::EPSILON);
    let tol = rcond * lambda_max;
    let rank = eigen.eigenvalues.iter().filter(|l| l.abs() > tol).count();
    let condition_number = if rank == cols && lambda_min > 0.0 {
        lambda_max / lambda_min
    } else {
        f64::INFINITY
    };

    let direct = if rank == cols { a.clone().try_inverse() } else { None };
    let (model, method) = match direct {
        Some(inv) => (inv * &b, SolveMethod::DirectInverse),
        None => {
            tracing::debug!(rank, cols, condition_number, "normal matrix is singular; using pseudoinverse");
            (pseudo_inverse_solve(&eigen, &b, tol), SolveMethod::PseudoInverse)
        }
    };

    if !model.iter().all(|v| v.is_finite()) {
        return Err(ill("solution contains non-finite values"));
    }

    let residual = (&a * &model - &b).norm();
    let scale = a.norm() * model.norm() + b.norm();
    if residual > RESIDUAL_RTOL * scale {
        return Err(ill(&format!(
            "solution misses the normal equations (residual {residual:.3e}, scale {scale:.3e})"
        )));
    }

    Ok(NormalSolution {
        model,
        method,
        rank,
        condition_number,
    })
}

/// `V · diag(1/λ) · Vᵗ · b`, dropping eigenvalues with `|λ| <= tol`.
fn pseudo_inverse_solve(eigen: &SymmetricEigen<f64, Dyn>, b: &DVector<f64>, tol: f64) -> DVector<f64> {
    let mut coeffs = eigen.eigenvectors.tr_mul(b);
    for (c, &lambda) in coeffs.iter_mut().zip(eigen.eigenvalues.iter()) {
        *c = if lambda.abs() > tol { *c / lambda } else { 0.0 };
    }
    &eigen.eigenvectors * coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rank_system_uses_direct_inverse() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let g = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let d = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let sol = solve_normal_equations(&g, &d, None).unwrap();
        assert_eq!(sol.method, SolveMethod::DirectInverse);
        assert_eq!(sol.rank, 2);
        assert!(sol.condition_number.is_finite());
        assert!((sol.model[0] - 2.0).abs() < 1e-10);
        assert!((sol.model[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn single_station_single_event_takes_minimum_norm_split() {
        let g = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let d = DVector::from_row_slice(&[3.0]);

        let sol = solve_normal_equations(&g, &d, None).unwrap();
        assert_eq!(sol.method, SolveMethod::PseudoInverse);
        assert_eq!(sol.rank, 1);
        assert!(sol.condition_number.is_infinite());
        assert!((sol.model[0] - 1.5).abs() < 1e-12);
        assert!((sol.model[1] - 1.5).abs() < 1e-12);
        assert!((sol.fitted(&g)[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn pseudoinverse_matches_closed_form_on_singular_block() {
        // Two stations, one event: A = [[1,0,1],[0,1,1],[1,1,2]], rank 2.
        let g = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        let d = DVector::from_row_slice(&[1.0, 3.0]);

        let sol = solve_normal_equations(&g, &d, None).unwrap();
        assert_eq!(sol.rank, 2);
        // Minimum-norm model: the null direction (1, 1, -1) is projected out.
        let null = DVector::from_row_slice(&[1.0, 1.0, -1.0]);
        assert!(sol.model.dot(&null).abs() < 1e-12);
        let fitted = sol.fitted(&g);
        assert!((fitted[0] - 1.0).abs() < 1e-12);
        assert!((fitted[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn cutoff_that_drops_signal_is_ill_conditioned() {
        // A = diag(1, 1e-4); rcond 1e-2 throws away a direction that carries data.
        let g = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.01]);
        let d = DVector::from_row_slice(&[1.0, 1.0]);

        match solve_normal_equations(&g, &d, Some(1e-2)) {
            Err(InversionError::IllConditionedSystem { reason, .. }) => {
                assert!(reason.contains("residual"), "{reason}");
            }
            other => panic!("expected IllConditionedSystem, got {other:?}"),
        }
        assert!(solve_normal_equations(&g, &d, None).is_ok());
    }

    #[test]
    fn empty_system_is_rejected() {
        let g = DMatrix::<f64>::zeros(0, 2);
        let d = DVector::<f64>::zeros(0);
        assert_eq!(
            solve_normal_equations(&g, &d, None),
            Err(InversionError::EmptyObservationSet)
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let g = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let d = DVector::from_row_slice(&[1.0]);
        assert_eq!(
            solve_normal_equations(&g, &d, None),
            Err(InversionError::DimensionMismatch { rows: 2, values: 1 })
        );
    }

    #[test]
    fn non_finite_values_are_ill_conditioned() {
        let g = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let d = DVector::from_row_slice(&[f64::NAN]);
        match solve_normal_equations(&g, &d, None) {
            Err(InversionError::IllConditionedSystem { rows, cols, .. }) => {
                assert_eq!((rows, cols), (1, 2));
            }
            other => panic!("expected IllConditionedSystem, got {other:?}"),
        }
    }
}
