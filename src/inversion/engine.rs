//! Assigner → builder → solver pipeline.
//!
//! `invert` takes already-indexed observations and returns an `Inversion`
//! holding the model vector (station terms first, then event terms) and,
//! when requested, the fitted observation vector. `invert_many` runs several
//! independent observation sets in parallel.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{FittedObservation, InversionConfig, NamedTerm, Observation, RawRecord, SolveMethod};
use crate::inversion::assigner::{IndexedObservations, assign_indices};
use crate::inversion::design::DesignMatrix;
use crate::inversion::errors::{InversionError, InversionResult};
use crate::math::solve_normal_equations;

/// Solve path and numerical health of one inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveDiagnostics {
    pub method: SolveMethod,
    pub rank: usize,
    pub condition_number: f64,
    /// Stations with no observations (their term is 0 in the minimum-norm model).
    pub unobserved_stations: Vec<usize>,
    /// Events with no observations.
    pub unobserved_events: Vec<usize>,
}

/// Result of one delay-time inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Inversion {
    pub data: IndexedObservations,
    /// Length `n + m`: station terms then event terms.
    pub model: DVector<f64>,
    /// Length `k`, present when `InversionConfig::want_fitted` was set.
    pub fitted: Option<DVector<f64>>,
    pub diagnostics: SolveDiagnostics,
}

impl Inversion {
    pub fn station_terms(&self) -> &[f64] {
        &self.model.as_slice()[..self.data.n_stations()]
    }

    pub fn event_terms(&self) -> &[f64] {
        &self.model.as_slice()[self.data.n_stations()..]
    }

    /// Predicted value for observation `d` (computed from the model even when
    /// the fitted vector was not requested).
    pub fn predict(&self, d: usize) -> Option<f64> {
        self.data.observations.get(d).map(|obs| self.model_value(obs))
    }

    /// `station term + event term` for one observation.
    fn model_value(&self, obs: &Observation) -> f64 {
        self.model[obs.station] + self.model[self.data.n_stations() + obs.event]
    }

    pub fn named_stations(&self) -> Vec<NamedTerm> {
        named_terms(&self.data.stations, self.station_terms(), &self.data.station_counts())
    }

    pub fn named_events(&self) -> Vec<NamedTerm> {
        named_terms(&self.data.events, self.event_terms(), &self.data.event_counts())
    }

    /// Observation-level view (observed, fitted, residual).
    pub fn fitted_observations(&self) -> Vec<FittedObservation> {
        self.data
            .observations
            .iter()
            .enumerate()
            .map(|(d, obs)| {
                let fitted = match &self.fitted {
                    Some(f) => f[d],
                    None => self.model_value(obs),
                };
                FittedObservation {
                    index: d,
                    station: self.data.stations[obs.station].clone(),
                    event: self.data.events[obs.event].clone(),
                    observed: obs.value,
                    fitted,
                    residual: obs.value - fitted,
                }
            })
            .collect()
    }
}

fn named_terms(names: &[String], delays: &[f64], counts: &[usize]) -> Vec<NamedTerm> {
    names
        .iter()
        .zip(delays)
        .zip(counts)
        .enumerate()
        .map(|(index, ((name, &delay), &n_obs))| NamedTerm {
            index,
            name: name.clone(),
            delay,
            n_obs,
        })
        .collect()
}

/// Run the inversion on indexed observations.
pub fn invert(data: &IndexedObservations, config: &InversionConfig) -> InversionResult<Inversion> {
    if data.is_empty() {
        return Err(InversionError::EmptyObservationSet);
    }

    let design = DesignMatrix::build(data.n_stations(), data.n_events(), &data.observations)?;
    tracing::debug!(
        k = design.rows(),
        n = design.n_stations(),
        m = design.n_events(),
        "built design matrix"
    );

    let unobserved_stations = design.unobserved_stations();
    let unobserved_events = design.unobserved_events();
    if !unobserved_stations.is_empty() {
        let names: Vec<&str> = unobserved_stations
            .iter()
            .map(|&i| data.stations[i].as_str())
            .collect();
        tracing::warn!(stations = ?names, "stations without observations");
    }
    if !unobserved_events.is_empty() {
        tracing::warn!(count = unobserved_events.len(), "events without observations");
    }

    let d = DVector::from_vec(data.values());
    let solution = solve_normal_equations(&design, &d, config.rcond)?;
    tracing::debug!(
        method = solution.method.display_name(),
        rank = solution.rank,
        condition_number = solution.condition_number,
        "solved normal equations"
    );

    let fitted = config.want_fitted.then(|| solution.fitted(&design));

    Ok(Inversion {
        data: data.clone(),
        model: solution.model,
        fitted,
        diagnostics: SolveDiagnostics {
            method: solution.method,
            rank: solution.rank,
            condition_number: solution.condition_number,
            unobserved_stations,
            unobserved_events,
        },
    })
}

/// Index raw records and run the inversion.
pub fn invert_records<I>(records: I, config: &InversionConfig) -> InversionResult<Inversion>
where
    I: IntoIterator<Item = RawRecord>,
{
    invert(&assign_indices(records), config)
}

/// Invert independent observation sets in parallel; results keep input order.
pub fn invert_many(sets: &[IndexedObservations], config: &InversionConfig) -> Vec<InversionResult<Inversion>> {
    sets.par_iter().map(|data| invert(data, config)).collect()
}
