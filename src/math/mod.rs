//! Linear algebra: normal equations with a pseudoinverse fallback.

pub mod normal;

pub use normal::*;
