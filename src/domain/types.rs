//! Shared domain types.
//!
//! Plain, serializable values: the column schema, normalized rows, source
//! specs and run configuration.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// File names the directory loader looks for before falling back to fuzzy matching.
pub const DEFAULT_EXPECTED_FILES: [&str; 2] = ["parte_1_muestra.csv", "parte_2_muestra.csv"];

/// Weekdays in display order.
pub const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Logical columns of the canonical table.
///
/// Each variant maps to one normalized header name. Views declare the columns
/// they need in terms of this enum, never raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Resolved, parsed date (also gates the derived calendar fields).
    Date,
    StoreNbr,
    Family,
    State,
    City,
    StoreType,
    Sales,
    OnPromotion,
    Transactions,
    OilPrice,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Date,
        Column::StoreNbr,
        Column::Family,
        Column::State,
        Column::City,
        Column::StoreType,
        Column::Sales,
        Column::OnPromotion,
        Column::Transactions,
        Column::OilPrice,
    ];

    /// Columns the dashboard considers essential (reported in load diagnostics).
    pub const REQUIRED: [Column; 5] = [
        Column::Date,
        Column::Sales,
        Column::StoreNbr,
        Column::Family,
        Column::State,
    ];

    /// Normalized header name.
    pub fn name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::StoreNbr => "store_nbr",
            Column::Family => "family",
            Column::State => "state",
            Column::City => "city",
            Column::StoreType => "store_type",
            Column::Sales => "sales",
            Column::OnPromotion => "onpromotion",
            Column::Transactions => "transactions",
            Column::OilPrice => "dcoilwtico",
        }
    }
}

/// Capability set: which logical columns a canonical table actually carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet(BTreeSet<Column>);

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: Column) {
        self.0.insert(column);
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }

    /// First column of `required` that is absent, if any.
    pub fn first_missing(&self, required: &[Column]) -> Option<Column> {
        required.iter().copied().find(|c| !self.contains(*c))
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Calendar fields derived once from a record's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub iso_week: u32,
    pub quarter: u32,
    pub weekday: Weekday,
}

impl CalendarFields {
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        Self {
            year: date.year(),
            month,
            iso_week: date.iso_week().week(),
            quarter: (month - 1) / 3 + 1,
            weekday: date.weekday(),
        }
    }

    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

/// One row of the canonical table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: Option<NaiveDate>,
    /// `None` whenever `date` is `None`.
    pub calendar: Option<CalendarFields>,
    pub store_nbr: Option<i64>,
    pub family: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub store_type: Option<String>,
    pub sales: f64,
    pub onpromotion: f64,
    pub transactions: f64,
    pub oil_price: Option<f64>,
}

impl SalesRecord {
    /// Attach a date and derive its calendar fields.
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self.calendar = date.map(CalendarFields::from_date);
        self
    }

    pub fn is_promoted(&self) -> bool {
        self.onpromotion > 0.0
    }
}

/// How the date column of a canonical table was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSource {
    /// A column literally named `date`.
    DateColumn,
    /// Another column whose name mentions a date (e.g. `fecha`, `sale_date`).
    Named { column: String },
    /// Synthesized from separate `year`/`month`/`day` columns.
    Components,
    /// No usable date; calendar fields are absent.
    Unresolved,
}

/// Row/column counts of one parsed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

/// Where to load sales data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Look for `expected` in `dir`, falling back to fuzzy file-name matching.
    Directory { dir: PathBuf, expected: Vec<String> },
    /// Explicit local files, loaded in the given order.
    Files(Vec<PathBuf>),
    /// Remote CSVs fetched over HTTP, loaded in the given order.
    Remote(Vec<String>),
}

impl SourceSpec {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        SourceSpec::Directory {
            dir: dir.into(),
            expected: DEFAULT_EXPECTED_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Run-wide settings assembled from CLI args + environment.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: SourceSpec,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceSpec::directory("."),
            histogram_bins: 20,
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// English month name for `1..=12`; `"?"` otherwise.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|idx| NAMES.get(idx as usize))
        .copied()
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_fields_follow_iso_rules() {
        // 2017-01-01 is a Sunday belonging to ISO week 52 of 2016.
        let d = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let cal = CalendarFields::from_date(d);
        assert_eq!(cal.year, 2017);
        assert_eq!(cal.month, 1);
        assert_eq!(cal.iso_week, 52);
        assert_eq!(cal.quarter, 1);
        assert_eq!(cal.weekday_name(), "Sunday");

        let cal = CalendarFields::from_date(NaiveDate::from_ymd_opt(2015, 11, 3).unwrap());
        assert_eq!(cal.quarter, 4);
        assert_eq!(cal.weekday_name(), "Tuesday");
    }

    #[test]
    fn null_date_yields_null_calendar() {
        let rec = SalesRecord::default().with_date(None);
        assert!(rec.calendar.is_none());
    }

    #[test]
    fn column_set_reports_first_missing() {
        let set: ColumnSet = [Column::Sales, Column::Family].into_iter().collect();
        assert_eq!(set.first_missing(&[Column::Sales, Column::Family]), None);
        assert_eq!(
            set.first_missing(&[Column::Sales, Column::State, Column::Date]),
            Some(Column::State)
        );
    }

    #[test]
    fn month_names_are_bounded() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "?");
        assert_eq!(month_name(13), "?");
    }
}
