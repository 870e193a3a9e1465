//! The canonical table and its load summary.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::types::{Column, ColumnSet, DateSource, SalesRecord, SourceStats};

/// The single normalized, concatenated dataset every view reads from.
///
/// Built once per load cycle and never mutated afterwards; front-ends share it
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    records: Vec<SalesRecord>,
    columns: Vec<String>,
    column_set: ColumnSet,
    sources: Vec<SourceStats>,
    date_source: DateSource,
}

impl CanonicalTable {
    pub fn new(
        records: Vec<SalesRecord>,
        columns: Vec<String>,
        column_set: ColumnSet,
        sources: Vec<SourceStats>,
        date_source: DateSource,
    ) -> Self {
        Self {
            records,
            columns,
            column_set,
            sources,
            date_source,
        }
    }

    /// Table holding nothing; what a session falls back to after a failed load.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), ColumnSet::new(), Vec::new(), DateSource::Unresolved)
    }

    /// Convenience constructor for in-memory data (no source bookkeeping).
    ///
    /// Column names are taken from the capability set.
    pub fn from_records(records: Vec<SalesRecord>, column_set: ColumnSet) -> Self {
        let columns = column_set.iter().map(|c| c.name().to_string()).collect();
        let date_source = if column_set.contains(Column::Date) {
            DateSource::DateColumn
        } else {
            DateSource::Unresolved
        };
        Self::new(records, columns, column_set, Vec::new(), date_source)
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Normalized column names (lower-case, trimmed), in first-seen order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_set(&self) -> &ColumnSet {
        &self.column_set
    }

    pub fn has(&self, column: Column) -> bool {
        self.column_set.contains(column)
    }

    pub fn sources(&self) -> &[SourceStats] {
        &self.sources
    }

    pub fn date_source(&self) -> &DateSource {
        &self.date_source
    }

    /// Distinct store ids, ascending.
    pub fn store_ids(&self) -> Vec<i64> {
        let set: BTreeSet<i64> = self.records.iter().filter_map(|r| r.store_nbr).collect();
        set.into_iter().collect()
    }

    /// Distinct state names, ascending.
    pub fn state_names(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().filter_map(|r| r.state.as_deref()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn total_sales(&self) -> f64 {
        self.records.iter().map(|r| r.sales).sum()
    }

    /// Observability summary for the presentation layer.
    pub fn summary(&self) -> LoadSummary {
        let mut date_min: Option<NaiveDate> = None;
        let mut date_max: Option<NaiveDate> = None;
        let mut valid_dates = 0usize;
        let mut stores = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut families = BTreeSet::new();
        let mut months = BTreeSet::new();

        for r in &self.records {
            if let Some(d) = r.date {
                valid_dates += 1;
                date_min = Some(date_min.map_or(d, |m| m.min(d)));
                date_max = Some(date_max.map_or(d, |m| m.max(d)));
            }
            if let Some(cal) = &r.calendar {
                months.insert(cal.month);
            }
            if let Some(s) = r.store_nbr {
                stores.insert(s);
            }
            if let Some(s) = r.state.as_deref() {
                states.insert(s);
            }
            if let Some(f) = r.family.as_deref() {
                families.insert(f);
            }
        }

        LoadSummary {
            rows: self.records.len(),
            valid_dates,
            date_range: date_min.zip(date_max),
            distinct_stores: stores.len(),
            distinct_states: states.len(),
            distinct_families: families.len(),
            distinct_months: months.len(),
            total_sales: self.total_sales(),
            sources: self.sources.clone(),
            date_source: self.date_source.clone(),
            columns: self.column_diagnostic(),
        }
    }

    /// Required-column presence plus "did you mean" suggestions for the missing ones.
    pub fn column_diagnostic(&self) -> ColumnDiagnostic {
        let mut present = Vec::new();
        let mut missing = Vec::new();
        for col in Column::REQUIRED {
            if self.has(col) {
                present.push(col);
            } else {
                missing.push(MissingColumn {
                    column: col,
                    similar: similar_columns(col.name(), &self.columns),
                });
            }
        }
        ColumnDiagnostic {
            available: self.columns.clone(),
            present,
            missing,
        }
    }
}

/// Columns whose name contains the wanted name or its 3-character prefix.
fn similar_columns(wanted: &str, columns: &[String]) -> Vec<String> {
    let prefix: String = wanted.chars().take(3).collect();
    columns
        .iter()
        .filter(|c| c.as_str() != wanted && (c.contains(wanted) || c.contains(&prefix)))
        .cloned()
        .collect()
}

/// Queryable load summary (row/date/distinct counts, sources, column diagnostics).
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub rows: usize,
    pub valid_dates: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub distinct_stores: usize,
    pub distinct_states: usize,
    pub distinct_families: usize,
    pub distinct_months: usize,
    pub total_sales: f64,
    pub sources: Vec<SourceStats>,
    pub date_source: DateSource,
    pub columns: ColumnDiagnostic,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnDiagnostic {
    pub available: Vec<String>,
    pub present: Vec<Column>,
    pub missing: Vec<MissingColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingColumn {
    pub column: Column,
    pub similar: Vec<String>,
}
