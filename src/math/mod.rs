//! Mathematical utilities: NaN-safe expectations and sample statistics.

pub mod summary;

pub use summary::*;
