//! Aggregation views over the canonical table.
//!
//! - `descriptor`: `ViewKind` / `ViewQuery` and the columns each view needs
//! - `primitives`: group-by, distinct, top-N, pivot
//! - `catalog`: the views themselves
//! - `results` / `tabular`: typed outputs and their flat table rendering
//!
//! `execute` is the single entry point. It checks the view's declared columns
//! against the table before doing any work, so a view that cannot run fails
//! fast with `ViewError::MissingColumn` and the caller can skip it.

pub mod catalog;
pub mod descriptor;
pub mod primitives;
pub mod results;
pub mod tabular;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::CanonicalTable;
use crate::error::ViewError;

pub use descriptor::{ViewKind, ViewQuery};
pub use results::ViewOutput;
pub use tabular::{Cell, ViewTable};

/// Fail with the first declared column the table lacks.
pub fn check_columns(table: &CanonicalTable, kind: ViewKind) -> Result<(), ViewError> {
    match table.column_set().first_missing(kind.required_columns()) {
        Some(column) => Err(ViewError::MissingColumn {
            view: kind.name(),
            column,
        }),
        None => Ok(()),
    }
}

/// Run one view.
pub fn execute(table: &CanonicalTable, query: &ViewQuery) -> Result<ViewOutput, ViewError> {
    let kind = query.kind();
    check_columns(table, kind)?;
    debug!(view = kind.name(), rows = table.len(), "executing view");

    let out = match query {
        ViewQuery::StoresPerState => ViewOutput::StoresPerState(catalog::stores_per_state(table)),
        ViewQuery::TopFamilies => ViewOutput::TopFamilies(catalog::top_families(table)),
        ViewQuery::SalesDistribution { bins } => {
            ViewOutput::SalesDistribution(catalog::sales_distribution(table, *bins))
        }
        ViewQuery::PromotionLeaders => ViewOutput::PromotionLeaders(catalog::promotion_leaders(table)),
        ViewQuery::WeekdayAverages => ViewOutput::WeekdayAverages(catalog::weekday_averages(table)),
        ViewQuery::WeeklyAverages => ViewOutput::WeeklyAverages(catalog::weekly_averages(table)),
        ViewQuery::MonthlyAverages => ViewOutput::MonthlyAverages(catalog::monthly_averages(table)),
        ViewQuery::StoreDetail { store } => ViewOutput::StoreDetail(catalog::store_detail(table, *store)),
        ViewQuery::StateDetail { state } => ViewOutput::StateDetail(catalog::state_detail(table, state)),
        ViewQuery::MonthlyTrend => ViewOutput::MonthlyTrend(catalog::monthly_trend(table)),
        ViewQuery::StoreComparison { stores } => {
            ViewOutput::StoreComparison(catalog::store_comparison(table, stores))
        }
        ViewQuery::PromotionImpact => ViewOutput::PromotionImpact(catalog::promotion_impact(table)),
        ViewQuery::Insights => ViewOutput::Insights(catalog::insights(table)),
    };
    Ok(out)
}

/// Run several views in parallel over the same snapshot; results keep query order.
pub fn execute_batch(table: &CanonicalTable, queries: &[ViewQuery]) -> Vec<Result<ViewOutput, ViewError>> {
    let results: Vec<Result<ViewOutput, ViewError>> = queries.par_iter().map(|q| execute(table, q)).collect();

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        info!(error = %err, "view skipped");
    }
    results
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Column, ColumnSet, SalesRecord};

    fn table_with(columns: &[Column]) -> CanonicalTable {
        let records = (1..=4)
            .map(|i| {
                SalesRecord {
                    store_nbr: Some(i),
                    family: Some(format!("F{}", i % 2)),
                    state: Some("Pichincha".to_string()),
                    sales: 10.0 * i as f64,
                    onpromotion: (i % 2) as f64,
                    ..SalesRecord::default()
                }
                .with_date(NaiveDate::from_ymd_opt(2016, i as u32, 1))
            })
            .collect();
        CanonicalTable::from_records(records, columns.iter().copied().collect::<ColumnSet>())
    }

    #[test]
    fn missing_column_fails_before_running() {
        let t = table_with(&[Column::Sales, Column::StoreNbr]);
        let err = execute(&t, &ViewQuery::TopFamilies).unwrap_err();
        assert_eq!(
            err,
            ViewError::MissingColumn {
                view: "top-families",
                column: Column::Family,
            }
        );
        let err = execute(&t, &ViewQuery::MonthlyTrend).unwrap_err();
        assert!(matches!(err, ViewError::MissingColumn { column: Column::Date, .. }));
    }

    #[test]
    fn every_view_runs_on_a_complete_table() {
        let t = table_with(&Column::ALL);
        let queries = [
            ViewQuery::overview(5),
            vec![
                ViewQuery::StoreDetail { store: 1 },
                ViewQuery::StateDetail {
                    state: "Pichincha".to_string(),
                },
                ViewQuery::MonthlyTrend,
                ViewQuery::StoreComparison { stores: vec![1, 2] },
                ViewQuery::PromotionImpact,
                ViewQuery::Insights,
            ],
        ]
        .concat();
        let kinds: Vec<ViewKind> = queries.iter().map(ViewQuery::kind).collect();
        for kind in ViewKind::ALL {
            assert!(kinds.contains(&kind), "{kind:?} not covered");
        }
        for (q, r) in queries.iter().zip(execute_batch(&t, &queries)) {
            let out = r.unwrap_or_else(|e| panic!("{q:?} failed: {e}"));
            assert!(!out.tables().is_empty());
        }
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let t = table_with(&[Column::Sales, Column::StoreNbr, Column::State]);
        let results = execute_batch(&t, &ViewQuery::overview(5));
        assert_eq!(results.len(), 7);
        assert!(matches!(results[0], Ok(ViewOutput::StoresPerState(_))));
        assert!(results[1].is_err());
        assert!(matches!(results[5], Ok(ViewOutput::SalesDistribution(_))));
        assert!(results[6].is_err());
    }
}
