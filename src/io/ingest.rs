//! CSV ingest and normalization.
//!
//! This module turns one or more heterogeneous sales CSVs into a single
//! `CanonicalTable`.
//!
//! Design goals:
//! - **Lenient values**: an unparseable date becomes null and a bad number becomes 0.
//!   A bad value never aborts the load and never drops the row.
//! - **Strict framing**: a ragged or non-UTF-8 file is a `MalformedSource`
//! - **Deterministic behavior**: source order and row order are preserved
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{CanonicalTable, Column, ColumnSet, DateSource, SalesRecord, SourceStats};
use crate::error::LoadError;

/// Names of the derived calendar columns, appended when a date was resolved.
pub const DERIVED_COLUMNS: [&str; 5] = ["year", "month", "iso_week", "quarter", "weekday_name"];

/// One parsed source before normalization into records.
#[derive(Debug, Clone)]
pub struct RawSource {
    pub name: String,
    /// Normalized header names, index artifacts already removed.
    pub headers: Vec<String>,
    /// Rows projected onto `headers` (same length, same order).
    pub rows: Vec<StringRecord>,
}

/// Parse one CSV source.
pub fn read_source<R: Read>(name: &str, reader: R) -> Result<RawSource, LoadError> {
    let malformed = |reason: String| LoadError::MalformedSource {
        source_name: name.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let raw_headers = reader
        .headers()
        .map_err(|e| malformed(format!("failed to read header row: {e}")))?
        .clone();

    if raw_headers.is_empty() {
        return Err(malformed("missing header row".to_string()));
    }

    let mut keep = Vec::with_capacity(raw_headers.len());
    let mut headers = Vec::with_capacity(raw_headers.len());
    for (idx, raw) in raw_headers.iter().enumerate() {
        let header = normalize_header_name(raw);
        if is_index_artifact(&header) {
            debug!(source = name, column = idx, "dropping unlabeled index column");
            continue;
        }
        keep.push(idx);
        headers.push(header);
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| malformed(format!("line {line}: {e}")))?;
        let projected: StringRecord = keep.iter().map(|&i| record.get(i).unwrap_or("")).collect();
        rows.push(projected);
    }

    info!(source = name, rows = rows.len(), columns = headers.len(), "parsed source");

    Ok(RawSource {
        name: name.to_string(),
        headers,
        rows,
    })
}

/// Normalize and concatenate parsed sources into the canonical table.
pub fn build_canonical(sources: Vec<RawSource>) -> CanonicalTable {
    let mut columns: Vec<String> = Vec::new();
    for src in &sources {
        for h in &src.headers {
            if !columns.contains(h) {
                columns.push(h.clone());
            }
        }
    }

    let date_source = resolve_date_source(&columns);
    let layout = ColumnLayout::resolve(&columns);

    let mut column_set: ColumnSet = layout.present().collect();
    if date_source != DateSource::Unresolved {
        column_set.insert(Column::Date);
        if !columns.iter().any(|c| c == "date") {
            columns.push("date".to_string());
        }
        for derived in DERIVED_COLUMNS {
            if !columns.iter().any(|c| c == derived) {
                columns.push(derived.to_string());
            }
        }
    } else {
        warn!("no date column could be resolved; calendar views will be skipped");
    }

    let mut stats = Vec::with_capacity(sources.len());
    let mut records = Vec::with_capacity(sources.iter().map(|s| s.rows.len()).sum());
    for src in &sources {
        let index: HashMap<&str, usize> = src
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        for row in &src.rows {
            records.push(layout.record(row, &index, &date_source));
        }
        stats.push(SourceStats {
            name: src.name.clone(),
            rows: src.rows.len(),
            columns: src.headers.len(),
        });
    }

    let valid_dates = records.iter().filter(|r| r.date.is_some()).count();
    info!(
        rows = records.len(),
        valid_dates,
        sources = stats.len(),
        date_source = ?date_source,
        "built canonical table"
    );

    CanonicalTable::new(records, columns, column_set, stats, date_source)
}

pub fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, `date` would not be recognized.
    let name = name.trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

/// Index columns written by dataframe tools without a label.
fn is_index_artifact(normalized: &str) -> bool {
    normalized.is_empty() || normalized.starts_with("unnamed:")
}

fn resolve_date_source(columns: &[String]) -> DateSource {
    if columns.iter().any(|c| c == "date") {
        return DateSource::DateColumn;
    }
    if let Some(col) = columns.iter().find(|c| c.contains("date") || c.contains("fecha")) {
        info!(column = col.as_str(), "using alternative date column");
        return DateSource::Named { column: col.clone() };
    }
    let has = |name: &str| columns.iter().any(|c| c == name);
    if has("year") && has("month") && has("day") {
        info!("synthesizing date from year/month/day columns");
        return DateSource::Components;
    }
    DateSource::Unresolved
}

/// Which source header backs each logical column.
struct ColumnLayout {
    headers: HashMap<Column, String>,
}

impl ColumnLayout {
    fn resolve(columns: &[String]) -> Self {
        let exact = |name: &str| columns.iter().find(|c| *c == name).cloned();
        let mut headers = HashMap::new();
        for col in Column::ALL {
            let header = match col {
                Column::Date => None,
                Column::StoreType => exact("store_type").or_else(|| exact("type")),
                Column::OilPrice => {
                    exact("dcoilwtico").or_else(|| columns.iter().find(|c| c.contains("oil")).cloned())
                }
                other => exact(other.name()),
            };
            if let Some(h) = header {
                headers.insert(col, h);
            }
        }
        Self { headers }
    }

    fn present(&self) -> impl Iterator<Item = Column> + '_ {
        self.headers.keys().copied()
    }

    fn field<'a>(&self, row: &'a StringRecord, index: &HashMap<&str, usize>, col: Column) -> Option<&'a str> {
        let header = self.headers.get(&col)?;
        cell(row, index, header)
    }

    fn record(&self, row: &StringRecord, index: &HashMap<&str, usize>, date_source: &DateSource) -> SalesRecord {
        let field = |col: Column| self.field(row, index, col);

        let date = match date_source {
            DateSource::DateColumn => cell(row, index, "date").and_then(parse_date),
            DateSource::Named { column } => cell(row, index, column).and_then(parse_date),
            DateSource::Components => date_from_components(
                cell(row, index, "year"),
                cell(row, index, "month"),
                cell(row, index, "day"),
            ),
            DateSource::Unresolved => None,
        };

        SalesRecord {
            store_nbr: field(Column::StoreNbr).and_then(parse_store_id),
            family: field(Column::Family).map(str::to_string),
            state: field(Column::State).map(str::to_string),
            city: field(Column::City).map(str::to_string),
            store_type: field(Column::StoreType).map(str::to_string),
            sales: parse_number(field(Column::Sales)).unwrap_or(0.0),
            onpromotion: parse_number(field(Column::OnPromotion)).unwrap_or(0.0),
            transactions: parse_number(field(Column::Transactions)).unwrap_or(0.0),
            oil_price: parse_number(field(Column::OilPrice)),
            ..SalesRecord::default()
        }
        .with_date(date)
    }
}

/// Trimmed, non-empty cell value for `header`, if the source has that column.
fn cell<'a>(row: &'a StringRecord, index: &HashMap<&str, usize>, header: &str) -> Option<&'a str> {
    let idx = index.get(header)?;
    row.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a date leniently; anything unrecognized is `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    let s = s.trim();
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn date_from_components(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> Option<NaiveDate> {
    let year = parse_integral(year?)?;
    let month = parse_integral(month?)?;
    let day = parse_integral(day?)?;
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )
}

/// Parse a numeric cell; booleans count as 1/0, non-finite values are rejected.
pub fn parse_number(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.eq_ignore_ascii_case("true") {
        return Some(1.0);
    }
    if s.eq_ignore_ascii_case("false") {
        return Some(0.0);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse an integer-like store id (`"7"` or `"7.0"`).
pub fn parse_store_id(s: &str) -> Option<i64> {
    parse_integral(s)
}

fn parse_integral(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(name: &str, csv: &str) -> RawSource {
        read_source(name, csv.as_bytes()).unwrap()
    }

    #[test]
    fn concatenation_keeps_every_row_in_order() {
        let a = src("a.csv", "date,store_nbr,sales\n2016-01-01,1,10\n2016-01-02,1,20\n");
        let b = src("b.csv", "date,store_nbr,sales\n2016-01-01,2,5\n2016-01-01,2,5\n2016-01-03,3,1\n");
        let table = build_canonical(vec![a, b]);

        assert_eq!(table.len(), 5);
        let stores: Vec<_> = table.records().iter().map(|r| r.store_nbr.unwrap()).collect();
        assert_eq!(stores, vec![1, 1, 2, 2, 3]);
        assert_eq!(table.sources()[0].rows, 2);
        assert_eq!(table.sources()[1].rows, 3);
    }

    #[test]
    fn headers_are_trimmed_and_lowercased() {
        let a = src("a.csv", "\u{feff} Date ,  STORE_NBR,Sales  ,FaMiLy\n2016-01-01,1,3,BREAD\n");
        let table = build_canonical(vec![a]);
        for name in table.column_names() {
            assert_eq!(name, &name.trim().to_lowercase());
        }
        assert!(table.has(Column::Date));
        assert!(table.has(Column::StoreNbr));
        assert!(table.has(Column::Family));
        assert_eq!(table.records()[0].family.as_deref(), Some("BREAD"));
    }

    #[test]
    fn index_artifacts_are_dropped() {
        let a = src("a.csv", ",Unnamed: 0,date,sales\n0,0,2016-01-01,4\n");
        assert_eq!(a.headers, vec!["date".to_string(), "sales".to_string()]);
        assert_eq!(a.rows[0].get(1), Some("4"));
    }

    #[test]
    fn bad_values_coerce_without_dropping_rows() {
        let a = src(
            "a.csv",
            "date,sales,onpromotion,transactions,dcoilwtico\n\
             2016-01-01,abc,,NaN,\n\
             not-a-date,12.5,true,7,93.1\n",
        );
        let table = build_canonical(vec![a]);
        let r = table.records();
        assert_eq!(r.len(), 2);

        assert!(r[0].date.is_some());
        assert_eq!(r[0].sales, 0.0);
        assert_eq!(r[0].onpromotion, 0.0);
        assert_eq!(r[0].transactions, 0.0);
        assert_eq!(r[0].oil_price, None);

        assert!(r[1].date.is_none());
        assert!(r[1].calendar.is_none());
        assert_eq!(r[1].sales, 12.5);
        assert_eq!(r[1].onpromotion, 1.0);
        assert_eq!(r[1].oil_price, Some(93.1));
    }

    #[test]
    fn missing_columns_in_one_source_become_defaults() {
        let a = src("a.csv", "date,sales,state\n2016-01-01,1,Azuay\n");
        let b = src("b.csv", "date,sales\n2016-01-02,2\n");
        let table = build_canonical(vec![a, b]);
        assert!(table.has(Column::State));
        assert_eq!(table.records()[1].state, None);
        assert_eq!(table.records()[1].sales, 2.0);
    }

    #[test]
    fn alternative_date_column_is_used() {
        let a = src("a.csv", "Fecha,sales\n2016-02-29,1\n");
        let table = build_canonical(vec![a]);
        assert_eq!(
            table.date_source(),
            &DateSource::Named {
                column: "fecha".to_string()
            }
        );
        assert!(table.column_names().contains(&"date".to_string()));
        assert_eq!(table.records()[0].calendar.unwrap().month, 2);
    }

    #[test]
    fn date_synthesized_from_components() {
        let a = src("a.csv", "year,month,day,sales\n2017,8,15,3\n2017,2,30,1\n");
        let table = build_canonical(vec![a]);
        assert_eq!(table.date_source(), &DateSource::Components);
        assert_eq!(table.records()[0].date, NaiveDate::from_ymd_opt(2017, 8, 15));
        assert_eq!(table.records()[1].date, None);
    }

    #[test]
    fn unresolved_date_is_not_fatal() {
        let a = src("a.csv", "store_nbr,sales\n1,2\n");
        let table = build_canonical(vec![a]);
        assert_eq!(table.date_source(), &DateSource::Unresolved);
        assert!(!table.has(Column::Date));
        assert!(!table.column_names().contains(&"year".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let err = read_source("bad.csv", "date,sales\n2016-01-01,1,extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource { ref source_name, .. } if source_name == "bad.csv"));
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = read_source("empty.csv", "".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedSource { .. }));
    }

    #[test]
    fn date_formats() {
        let d = NaiveDate::from_ymd_opt(2015, 7, 4);
        assert_eq!(parse_date("2015-07-04"), d);
        assert_eq!(parse_date("2015/07/04"), d);
        assert_eq!(parse_date("07/04/2015"), d);
        assert_eq!(parse_date("04.07.2015"), d);
        assert_eq!(parse_date("2015-07-04 13:45:00"), d);
        assert_eq!(parse_date("2015-07-04T13:45:00.250"), d);
        assert_eq!(parse_date("July 4th"), None);
    }

    #[test]
    fn store_ids_accept_integral_floats() {
        assert_eq!(parse_store_id("7"), Some(7));
        assert_eq!(parse_store_id("7.0"), Some(7));
        assert_eq!(parse_store_id("7.5"), None);
        assert_eq!(parse_store_id("seven"), None);
    }

    #[test]
    fn store_type_falls_back_to_type_column() {
        let a = src("a.csv", "store_nbr,type,sales\n1,D,1\n");
        let table = build_canonical(vec![a]);
        assert!(table.has(Column::StoreType));
        assert_eq!(table.records()[0].store_type.as_deref(), Some("D"));
    }
}
