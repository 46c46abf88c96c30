//! Error type for the delay-time inversion engine.
//!
//! Every variant carries enough context (dimensions, the failing index) to
//! diagnose the problem without re-running. A singular normal matrix is not
//! an error: it is handled by the pseudoinverse path in the solver.

use crate::domain::Axis;

/// Failures surfaced by the assigner, design-matrix builder and solver.
#[derive(Debug, Clone, PartialEq)]
pub enum InversionError {
    /// No observations: there is nothing to solve.
    EmptyObservationSet,

    /// An observation references an index missing from its index table.
    IndexOutOfRange {
        /// Position of the offending observation.
        observation: usize,
        axis: Axis,
        index: usize,
        /// Length of the index table on `axis`.
        len: usize,
    },

    /// The observation vector does not match the design-matrix row count.
    DimensionMismatch { rows: usize, values: usize },

    /// Neither the direct inverse nor the pseudoinverse produced a usable model.
    IllConditionedSystem {
        rows: usize,
        cols: usize,
        reason: String,
    },
}

pub type InversionResult<T> = Result<T, InversionError>;

impl std::fmt::Display for InversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InversionError::EmptyObservationSet => {
                write!(f, "Empty observation set: at least one delay observation is required.")
            }
            InversionError::IndexOutOfRange {
                observation,
                axis,
                index,
                len,
            } => write!(
                f,
                "Observation {observation} references {} index {index}, but only {len} {}(s) are known.",
                axis.display_name(),
                axis.display_name()
            ),
            InversionError::DimensionMismatch { rows, values } => write!(
                f,
                "Design matrix has {rows} row(s) but {values} observation value(s) were supplied."
            ),
            InversionError::IllConditionedSystem { rows, cols, reason } => write!(
                f,
                "Ill-conditioned system ({rows}x{cols} design matrix): {reason}"
            ),
        }
    }
}

impl std::error::Error for InversionError {}
