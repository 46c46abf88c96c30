//! Input/output helpers.
//!
//! - station delay-log ingest (`ingest`)
//! - CSV exports of terms and fitted values (`export`)
//! - JSON result bundle read/write (`bundle`)

pub mod bundle;
pub mod export;
pub mod ingest;

pub use bundle::*;
pub use export::*;
pub use ingest::*;
