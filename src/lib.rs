//! `salesboard` library crate.
//!
//! The binary (`salesboard`) is a thin wrapper around this library so that:
//!
//! - loading and aggregation are testable without spawning processes
//! - the TUI and the CLI pages share one view catalog

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
pub mod views;
