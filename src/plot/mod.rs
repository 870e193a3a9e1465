//! Terminal plots for CLI output.

pub mod ascii;

pub use ascii::{render_bar_chart, render_series_plot};
