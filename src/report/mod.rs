//! Text reports for the CLI: dataset summary, pages, single views.

pub mod format;

pub use format::{format_load_error, format_load_summary, format_output, format_page, format_section, format_table};
