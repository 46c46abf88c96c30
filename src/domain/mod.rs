//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and indexed delay observations (`RawRecord`, `Observation`)
//! - engine settings (`InversionConfig`)
//! - exportable results (`NamedTerm`, `FittedObservation`, `TermsFile`)

pub mod types;

pub use types::*;
