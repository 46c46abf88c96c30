//! `delay-terms` library crate.
//!
//! Estimates per-station and per-event additive delay terms from delay-time
//! observations by least squares.
//!
//! The binary (`dt`) is a thin wrapper around this library so that:
//!
//! - the inversion engine is testable without spawning processes
//! - the engine can be driven by any reader and feed any writer

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod inversion;
pub mod io;
pub mod math;
pub mod report;
