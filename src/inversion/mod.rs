//! Delay-time inversion engine.
//!
//! Responsibilities:
//!
//! - assign station/event indices in first-seen order (`assigner`)
//! - build the indicator design matrix (`design`)
//! - solve the normal equations and assemble results (`engine`)
//!
//! Nothing in here touches the filesystem.

pub mod assigner;
pub mod design;
pub mod engine;
pub mod errors;

pub use assigner::*;
pub use design::*;
pub use engine::*;
pub use errors::*;
