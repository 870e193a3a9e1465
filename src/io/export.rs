//! Export view results to CSV or JSON.
//!
//! The format is chosen by the file extension:
//! - `.json`: the typed result, serialized with serde
//! - anything else: CSV of the view's main table; further tables of
//!   multi-table views go to sibling files named `<stem>_<section>.csv`

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AppError, EXIT_RUNTIME};
use crate::views::{ViewOutput, ViewTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Write `output` to `path`; returns every file written.
pub fn export_view(path: &Path, output: &ViewOutput) -> Result<Vec<PathBuf>, AppError> {
    match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            write_json(path, output)?;
            Ok(vec![path.to_path_buf()])
        }
        ExportFormat::Csv => {
            let tables = output.tables();
            let mut written = Vec::with_capacity(tables.len());
            for (i, table) in tables.iter().enumerate() {
                let target = if i == 0 {
                    path.to_path_buf()
                } else {
                    section_path(path, &table.section)
                };
                write_table_csv(&target, table)?;
                written.push(target);
            }
            Ok(written)
        }
    }
}

fn section_path(path: &Path, section: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{stem}_{section}.csv"))
}

/// Write one table as CSV (header = column names).
pub fn write_table_csv(path: &Path, table: &ViewTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(&table.columns)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write export CSV header: {e}")))?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|c| c.to_csv_field()))
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to flush '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = table.rows.len(), "wrote csv export");
    Ok(())
}

pub fn write_json(path: &Path, output: &ViewOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), output)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write export JSON: {e}")))?;
    info!(path = %path.display(), "wrote json export");
    Ok(())
}
