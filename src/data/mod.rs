//! Input table acquisition.

pub mod remote;

pub use remote::*;
