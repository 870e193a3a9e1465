//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the logical column schema and capability set (`Column`, `ColumnSet`)
//! - normalized sales rows (`SalesRecord`) with derived calendar fields
//! - the immutable `CanonicalTable` and its `LoadSummary`
//! - source/run configuration (`SourceSpec`, `DashboardConfig`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
