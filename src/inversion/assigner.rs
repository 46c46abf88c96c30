//! Station/event index assignment.
//!
//! Names are mapped to dense indices in first-seen order. Stations and events
//! have separate index spaces, each starting at 0. The event table is shared
//! across stations: an event first seen under station A and later under
//! station B keeps a single index.
//!
//! Names are compared as exact strings; no trimming or case folding happens
//! here.

use std::collections::HashMap;

use crate::domain::{Axis, Observation, RawRecord};
use crate::inversion::errors::{InversionError, InversionResult};

/// Append-only name → index table.
#[derive(Debug, Clone, Default)]
struct NameTable {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl NameTable {
    fn intern(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.lookup.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), idx);
        idx
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }
}

/// Builds the index tables and the observation list for one inversion.
///
/// A fresh assigner is created per run; nothing is shared between runs.
#[derive(Debug, Clone, Default)]
pub struct IndexAssigner {
    stations: NameTable,
    events: NameTable,
    observations: Vec<Observation>,
}

impl IndexAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a station (if new) and return its index.
    ///
    /// Stations may be registered without observations; they then show up as
    /// unobserved in the solve diagnostics.
    pub fn station(&mut self, name: &str) -> usize {
        self.stations.intern(name)
    }

    /// Register an event (if new) and return its index.
    pub fn event(&mut self, name: &str) -> usize {
        self.events.intern(name)
    }

    pub fn station_index(&self, name: &str) -> Option<usize> {
        self.stations.get(name)
    }

    pub fn event_index(&self, name: &str) -> Option<usize> {
        self.events.get(name)
    }

    /// Record one observation, assigning indices as needed.
    pub fn record(&mut self, station: &str, event: &str, value: f64) -> Observation {
        let obs = Observation {
            value,
            station: self.station(station),
            event: self.event(event),
        };
        self.observations.push(obs);
        obs
    }

    pub fn n_stations(&self) -> usize {
        self.stations.names.len()
    }

    pub fn n_events(&self) -> usize {
        self.events.names.len()
    }

    pub fn n_observations(&self) -> usize {
        self.observations.len()
    }

    pub fn finish(self) -> IndexedObservations {
        IndexedObservations {
            stations: self.stations.names,
            events: self.events.names,
            observations: self.observations,
        }
    }
}

/// Index tables plus the observations that refer to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedObservations {
    /// Station names; position = station index.
    pub stations: Vec<String>,
    /// Event names; position = event index.
    pub events: Vec<String>,
    /// Observations in arrival order.
    pub observations: Vec<Observation>,
}

impl IndexedObservations {
    pub fn n_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn n_events(&self) -> usize {
        self.events.len()
    }

    pub fn n_observations(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observation values in order (the `d` vector of `Gm = d`).
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Check that every observation points into the index tables.
    pub fn validate(&self) -> InversionResult<()> {
        let n = self.n_stations();
        let m = self.n_events();
        for (d, obs) in self.observations.iter().enumerate() {
            check_index(d, Axis::Station, obs.station, n)?;
            check_index(d, Axis::Event, obs.event, m)?;
        }
        Ok(())
    }

    /// Observation count per station index.
    pub fn station_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_stations()];
        for obs in &self.observations {
            if let Some(c) = counts.get_mut(obs.station) {
                *c += 1;
            }
        }
        counts
    }

    /// Observation count per event index.
    pub fn event_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_events()];
        for obs in &self.observations {
            if let Some(c) = counts.get_mut(obs.event) {
                *c += 1;
            }
        }
        counts
    }
}

pub(crate) fn check_index(observation: usize, axis: Axis, index: usize, len: usize) -> InversionResult<()> {
    if index >= len {
        return Err(InversionError::IndexOutOfRange {
            observation,
            axis,
            index,
            len,
        });
    }
    Ok(())
}

/// Assign indices to a stream of raw records in arrival order.
pub fn assign_indices<I>(records: I) -> IndexedObservations
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut assigner = IndexAssigner::new();
    for r in records {
        assigner.record(&r.station, &r.event, r.value);
    }
    assigner.finish()
}
