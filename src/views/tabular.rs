//! Flat, tabular rendering of view results.
//!
//! Text reports and CSV exports both go through `ViewTable`s; JSON export
//! serializes the typed result instead.

use std::fmt;

use crate::views::primitives::Pivot;
use crate::views::results::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Num(f64),
    Pct(f64),
    /// Not applicable / no data.
    Missing,
}

impl Cell {
    fn opt_num(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Num)
    }

    fn opt_pct(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Pct)
    }

    fn opt_text(v: Option<&str>) -> Self {
        v.map_or(Cell::Missing, |s| Cell::Text(s.to_string()))
    }

    /// Machine-friendly rendering (full precision, empty for missing).
    pub fn to_csv_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Num(v) | Cell::Pct(v) => v.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Num(v) => write!(f, "{v:.2}"),
            Cell::Pct(v) => write!(f, "{v:.2}%"),
            Cell::Missing => f.write_str("n/a"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Num(v)
    }
}

/// A titled table with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTable {
    /// Short machine name, used for export file suffixes.
    pub section: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ViewTable {
    fn new(section: &str, title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            section: section.to_string(),
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<Cell>>) -> Self {
        self.rows.extend(rows);
        self
    }
}

fn year_table(section: &str, title: &str, value: &str, rows: &[YearValue]) -> ViewTable {
    ViewTable::new(section, title, &["year", value])
        .with_rows(rows.iter().map(|r| vec![Cell::Int(r.year.into()), Cell::Num(r.value)]))
}

fn family_table(section: &str, title: &str, rows: &[FamilySales]) -> ViewTable {
    ViewTable::new(section, title, &["family", "sales"])
        .with_rows(rows.iter().map(|r| vec![r.family.as_str().into(), r.sales.into()]))
}

fn store_table(section: &str, title: &str, rows: &[StoreSales]) -> ViewTable {
    ViewTable::new(section, title, &["store_nbr", "sales"])
        .with_rows(rows.iter().map(|r| vec![r.store_nbr.into(), r.sales.into()]))
}

fn month_year_table(pivot: &Pivot<u32, i32>) -> ViewTable {
    let mut columns = vec!["month".to_string()];
    columns.extend(pivot.columns.iter().map(|y| y.to_string()));
    let mut t = ViewTable {
        section: "month_year".to_string(),
        title: "Sales by month and year".to_string(),
        columns,
        rows: Vec::new(),
    };
    for (i, month) in pivot.rows.iter().enumerate() {
        let mut row = vec![Cell::Int((*month).into())];
        row.extend((0..pivot.columns.len()).map(|j| Cell::opt_num(pivot.get(i, j))));
        t.push(row);
    }
    t
}

/// Key/value facts table.
fn facts(section: &str, title: &str, items: Vec<(&str, Cell)>) -> ViewTable {
    ViewTable::new(section, title, &["metric", "value"])
        .with_rows(items.into_iter().map(|(k, v)| vec![k.into(), v]))
}

impl ViewOutput {
    /// Tables in display order; the first is the view's main table.
    pub fn tables(&self) -> Vec<ViewTable> {
        match self {
            ViewOutput::StoresPerState(v) => vec![
                ViewTable::new("main", "Stores per state", &["state", "stores"]).with_rows(
                    v.states
                        .iter()
                        .map(|s| vec![s.state.as_str().into(), Cell::Int(s.stores as i64)]),
                ),
            ],
            ViewOutput::TopFamilies(v) => vec![family_table("main", "Top families by sales", &v.families)],
            ViewOutput::SalesDistribution(v) => {
                let stats = v
                    .stats
                    .as_ref()
                    .map(|d| {
                        vec![
                            ("stores", Cell::Int(d.count as i64)),
                            ("mean", d.mean.into()),
                            ("median", d.median.into()),
                            ("min", d.min.into()),
                            ("max", d.max.into()),
                        ]
                    })
                    .unwrap_or_default();
                vec![
                    ViewTable::new("main", "Store sales histogram", &["lower", "upper", "stores"]).with_rows(
                        v.histogram
                            .iter()
                            .map(|b| vec![b.lower.into(), b.upper.into(), Cell::Int(b.count as i64)]),
                    ),
                    facts("stats", "Per-store sales statistics", stats),
                    store_table("per_store", "Sales per store", &v.per_store),
                ]
            }
            ViewOutput::PromotionLeaders(v) => vec![
                store_table("main", "Promoted sales by store", &v.leaders),
                facts(
                    "share",
                    "Promotion share",
                    vec![
                        ("promo_sales", v.promo_sales.into()),
                        ("total_sales", v.total_sales.into()),
                        ("promo_share", Cell::opt_pct(v.promo_share_pct)),
                    ],
                ),
            ],
            ViewOutput::WeekdayAverages(v) => vec![
                ViewTable::new("main", "Average sales by weekday", &["weekday", "mean_sales"])
                    .with_rows(v.days.iter().map(|d| vec![d.weekday.into(), d.mean_sales.into()])),
            ],
            ViewOutput::WeeklyAverages(v) => vec![
                ViewTable::new("main", "Average sales by ISO week", &["iso_week", "mean_sales"]).with_rows(
                    v.weeks
                        .iter()
                        .map(|w| vec![Cell::Int(w.iso_week.into()), w.mean_sales.into()]),
                ),
                facts(
                    "extremes",
                    "Week extremes",
                    vec![
                        ("peak_week", v.peak_week.map_or(Cell::Missing, |w| Cell::Int(w.into()))),
                        ("trough_week", v.trough_week.map_or(Cell::Missing, |w| Cell::Int(w.into()))),
                    ],
                ),
            ],
            ViewOutput::MonthlyAverages(v) => vec![
                ViewTable::new("main", "Average sales by month", &["month", "month_name", "mean_sales"]).with_rows(
                    v.months
                        .iter()
                        .map(|m| vec![Cell::Int(m.month.into()), m.month_name.into(), m.mean_sales.into()]),
                ),
            ],
            ViewOutput::StoreDetail(v) => {
                let mut out = vec![facts(
                    "main",
                    &format!("Store {}", v.store_nbr),
                    vec![
                        ("records", Cell::Int(v.records as i64)),
                        ("total_sales", v.total_sales.into()),
                        ("city", Cell::opt_text(v.city.as_deref())),
                        ("state", Cell::opt_text(v.state.as_deref())),
                        ("store_type", Cell::opt_text(v.store_type.as_deref())),
                    ],
                )];
                if let Some(rows) = &v.sales_by_year {
                    out.push(year_table("sales_by_year", "Sales by year", "sales", rows));
                }
                if let Some(rows) = &v.transactions_by_year {
                    out.push(year_table("transactions_by_year", "Transactions by year", "transactions", rows));
                }
                if let Some(rows) = &v.promo_sales_by_year {
                    out.push(year_table("promo_by_year", "Promoted sales by year", "promo_sales", rows));
                }
                if let Some(rows) = &v.top_families {
                    out.push(family_table("top_families", "Top families", rows));
                }
                out
            }
            ViewOutput::StateDetail(v) => {
                let mut out = vec![facts(
                    "main",
                    &format!("State {}", v.state),
                    vec![
                        ("records", Cell::Int(v.records as i64)),
                        ("stores", v.stores.map_or(Cell::Missing, |n| Cell::Int(n as i64))),
                        ("cities", v.cities.map_or(Cell::Missing, |n| Cell::Int(n as i64))),
                        ("total_sales", Cell::opt_num(v.total_sales)),
                        ("top_family", Cell::opt_text(v.top_family.as_ref().map(|f| f.family.as_str()))),
                    ],
                )];
                if let Some(rows) = &v.transactions_by_year {
                    out.push(year_table("transactions_by_year", "Transactions by year", "transactions", rows));
                }
                if let Some(rows) = &v.top_stores {
                    out.push(store_table("top_stores", "Top stores", rows));
                }
                if let Some(pivot) = &v.month_year_sales {
                    out.push(month_year_table(pivot));
                }
                out
            }
            ViewOutput::MonthlyTrend(v) => vec![
                ViewTable::new("main", "Monthly sales trend", &["year", "month", "sales", "trend"]).with_rows(
                    v.periods.iter().map(|p| {
                        vec![
                            Cell::Int(p.year.into()),
                            Cell::Int(p.month.into()),
                            p.sales.into(),
                            Cell::opt_num(p.trend),
                        ]
                    }),
                ),
                facts(
                    "fit",
                    "Trend line",
                    vec![
                        ("slope", Cell::opt_num(v.fit.as_ref().map(|f| f.slope))),
                        ("intercept", Cell::opt_num(v.fit.as_ref().map(|f| f.intercept))),
                        ("change", Cell::opt_pct(v.change_pct)),
                    ],
                ),
            ],
            ViewOutput::StoreComparison(v) => vec![
                ViewTable::new("main", "Monthly sales by store", &["year", "month", "store_nbr", "sales"]).with_rows(
                    v.points.iter().map(|p| {
                        vec![
                            Cell::Int(p.year.into()),
                            Cell::Int(p.month.into()),
                            p.store_nbr.into(),
                            p.sales.into(),
                        ]
                    }),
                ),
            ],
            ViewOutput::PromotionImpact(v) => vec![
                ViewTable::new(
                    "main",
                    "Promotion impact by family",
                    &["family", "promo_sales", "total_sales", "promo_share"],
                )
                .with_rows(v.families.iter().map(|f| {
                    vec![
                        f.family.as_str().into(),
                        f.promo_sales.into(),
                        f.total_sales.into(),
                        Cell::opt_pct(f.promo_share_pct),
                    ]
                })),
            ],
            ViewOutput::Insights(v) => vec![
                ViewTable::new("main", "Insights", &["finding"])
                    .with_rows(v.findings().into_iter().map(|s| vec![Cell::Text(s)])),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_render_as_not_applicable() {
        assert_eq!(Cell::Missing.to_string(), "n/a");
        assert_eq!(Cell::Missing.to_csv_field(), "");
        assert_eq!(Cell::Pct(25.0).to_string(), "25.00%");
        assert_eq!(Cell::Num(1234.5).to_string(), "1234.50");
    }

    #[test]
    fn pivot_table_keeps_gaps() {
        let pivot = Pivot {
            rows: vec![1u32, 2],
            columns: vec![2015, 2016],
            cells: vec![vec![Some(1.0), None], vec![None, Some(2.0)]],
        };
        let out = ViewOutput::StateDetail(StateDetail {
            state: "A".into(),
            records: 2,
            stores: None,
            cities: None,
            total_sales: Some(3.0),
            transactions_by_year: None,
            top_stores: None,
            top_family: None,
            month_year_sales: Some(pivot),
        });
        let tables = out.tables();
        assert_eq!(tables.len(), 2);
        let t = &tables[1];
        assert_eq!(t.columns, vec!["month", "2015", "2016"]);
        assert_eq!(t.rows[0][2], Cell::Missing);
        assert_eq!(t.rows[1][2], Cell::Num(2.0));
    }
}
