//! Input/output helpers.
//!
//! - survey/death table ingest + cleaning (`ingest`)
//! - per-age estimate export to CSV (`export`)
//! - run JSON read/write (`run_file`)

pub mod export;
pub mod ingest;
pub mod run_file;

pub use export::*;
pub use ingest::*;
pub use run_file::*;
