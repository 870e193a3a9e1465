//! Input/output helpers.
//!
//! - source resolution (`sources`)
//! - CSV ingest + normalization into the canonical table (`ingest`)
//! - view exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;
pub mod sources;

pub use export::*;
pub use sources::load_table;
