//! Mathematical utilities: least squares trend fitting and descriptive stats.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
