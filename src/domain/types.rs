//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - produced by any upstream reader (files, synthetic data, tests)
//! - consumed by the inversion engine
//! - exported to JSON/CSV and reloaded later

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One raw delay measurement as delivered by an upstream reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub station: String,
    pub event: String,
    pub value: f64,
}

impl RawRecord {
    pub fn new(station: impl Into<String>, event: impl Into<String>, value: f64) -> Self {
        Self {
            station: station.into(),
            event: event.into(),
            value,
        }
    }
}

/// An indexed observation: `value ≈ station_term[station] + event_term[event]`.
///
/// The value is payload only. Two observations may carry the same value and
/// still refer to different station/event pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub value: f64,
    pub station: usize,
    pub event: usize,
}

/// Which index table an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Station,
    Event,
}

impl Axis {
    pub fn display_name(self) -> &'static str {
        match self {
            Axis::Station => "station",
            Axis::Event => "event",
        }
    }
}

/// How the normal equations were solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMethod {
    /// `GᵗG` had full numerical rank and was inverted directly.
    DirectInverse,
    /// `GᵗG` was rank deficient (or the direct inverse failed); the
    /// Moore–Penrose pseudoinverse picked the minimum-norm model.
    PseudoInverse,
}

impl SolveMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            SolveMethod::DirectInverse => "direct inverse",
            SolveMethod::PseudoInverse => "pseudoinverse",
        }
    }
}

/// Engine settings for a single inversion.
#[derive(Debug, Clone)]
pub struct InversionConfig {
    /// Also compute the fitted observation vector `G · model`.
    pub want_fitted: bool,
    /// Relative singular-value cutoff for rank detection.
    ///
    /// `None` uses `(n + m) · f64::EPSILON`.
    pub rcond: Option<f64>,
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self {
            want_fitted: true,
            rcond: None,
        }
    }
}

/// A named delay term (one entry of the model vector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTerm {
    pub index: usize,
    pub name: String,
    pub delay: f64,
    /// Number of observations that constrain this term.
    pub n_obs: usize,
}

/// A single observation next to its reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedObservation {
    pub index: usize,
    pub station: String,
    pub event: String,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Portable JSON representation of an inversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsFile {
    pub tool: String,
    pub created: DateTime<Local>,
    pub n_observations: usize,
    pub method: SolveMethod,
    pub rank: usize,
    /// `None` when the condition number is infinite (JSON has no infinity).
    pub condition_number: Option<f64>,
    pub stations: Vec<NamedTerm>,
    pub events: Vec<NamedTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitted: Option<Vec<FittedObservation>>,
}
