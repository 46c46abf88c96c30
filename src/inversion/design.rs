//! Indicator design matrix for the station + event delay model.
//!
//! For `k` observations, `n` stations and `m` events the matrix `G` is
//! `k × (n + m)`. Row `d` has a 1 in column `station(d)` and a 1 in column
//! `n + event(d)`; everything else is 0. Repeated (station, event) pairs each
//! keep their own row.
//!
//! Only the two nonzero columns of each row are stored, so `G` costs O(k)
//! memory and `GᵗG`, `Gᵗd` and `G·x` are assembled in O(k).

use nalgebra::{DMatrix, DVector};

use crate::domain::{Axis, Observation};
use crate::inversion::assigner::check_index;
use crate::inversion::errors::InversionResult;
use crate::math::NormalOperator;

#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// `(station column, event column)` of the two ones in each row.
    nonzeros: Vec<(usize, usize)>,
    n_stations: usize,
    n_events: usize,
    station_counts: Vec<usize>,
    event_counts: Vec<usize>,
}

impl DesignMatrix {
    /// Build `G` from the observation list.
    ///
    /// Fails with `IndexOutOfRange` if an observation points outside
    /// `0..n_stations` or `0..n_events`.
    pub fn build(n_stations: usize, n_events: usize, observations: &[Observation]) -> InversionResult<Self> {
        let mut nonzeros = Vec::with_capacity(observations.len());
        let mut station_counts = vec![0usize; n_stations];
        let mut event_counts = vec![0usize; n_events];
        for (d, obs) in observations.iter().enumerate() {
            check_index(d, Axis::Station, obs.station, n_stations)?;
            check_index(d, Axis::Event, obs.event, n_events)?;
            nonzeros.push((obs.station, n_stations + obs.event));
            station_counts[obs.station] += 1;
            event_counts[obs.event] += 1;
        }
        Ok(Self {
            nonzeros,
            n_stations,
            n_events,
            station_counts,
            event_counts,
        })
    }

    /// Columns holding the ones of row `d`.
    pub fn row(&self, d: usize) -> Option<(usize, usize)> {
        self.nonzeros.get(d).copied()
    }

    pub fn n_stations(&self) -> usize {
        self.n_stations
    }

    pub fn n_events(&self) -> usize {
        self.n_events
    }

    /// Number of observations (`k`).
    pub fn rows(&self) -> usize {
        self.nonzeros.len()
    }

    /// Number of unknowns (`n + m`).
    pub fn cols(&self) -> usize {
        self.n_stations + self.n_events
    }

    /// Station indices whose column is all zeros.
    pub fn unobserved_stations(&self) -> Vec<usize> {
        empty_columns(&self.station_counts)
    }

    /// Event indices whose column is all zeros.
    pub fn unobserved_events(&self) -> Vec<usize> {
        empty_columns(&self.event_counts)
    }

    #[cfg(test)]
    fn to_dense(&self) -> DMatrix<f64> {
        let mut g = DMatrix::<f64>::zeros(self.rows(), self.cols());
        for (d, &(s, e)) in self.nonzeros.iter().enumerate() {
            g[(d, s)] = 1.0;
            g[(d, e)] = 1.0;
        }
        g
    }
}

fn empty_columns(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == 0)
        .map(|(i, _)| i)
        .collect()
}

impl NormalOperator for DesignMatrix {
    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    fn all_finite(&self) -> bool {
        true
    }

    fn normal_equations(&self, d: &DVector<f64>) -> (DMatrix<f64>, DVector<f64>) {
        let cols = self.cols();
        let mut a = DMatrix::<f64>::zeros(cols, cols);
        let mut b = DVector::<f64>::zeros(cols);
        for (&(s, e), &v) in self.nonzeros.iter().zip(d.iter()) {
            a[(s, s)] += 1.0;
            a[(e, e)] += 1.0;
            a[(s, e)] += 1.0;
            a[(e, s)] += 1.0;
            b[s] += v;
            b[e] += v;
        }
        (a, b)
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(self.rows(), self.nonzeros.iter().map(|&(s, e)| x[s] + x[e]))
    }
}
