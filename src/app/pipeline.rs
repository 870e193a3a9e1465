//! Shared page logic used by both the CLI and TUI front-ends.
//!
//! A page is a fixed batch of view queries over one snapshot:
//! Global -> overview batch, Store -> store detail, State -> state detail,
//! Advanced -> trend, comparison, promotion impact, insights.
//!
//! The front-ends then only deal with presentation (printing vs widgets).

use crate::domain::CanonicalTable;
use crate::error::ViewError;
use crate::views::{ViewKind, ViewOutput, ViewQuery, execute, execute_batch};

/// Stores pre-selected for comparison when the user picked none.
pub const DEFAULT_COMPARE_STORES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Global,
    Store,
    State,
    Advanced,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Global, Page::Store, Page::State, Page::Advanced];

    pub fn title(self) -> &'static str {
        match self {
            Page::Global => "Global",
            Page::Store => "Store",
            Page::State => "State",
            Page::Advanced => "Advanced",
        }
    }
}

/// One view's outcome on a page.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: ViewKind,
    pub outcome: Result<ViewOutput, ViewError>,
}

impl Section {
    pub fn output(&self) -> Option<&ViewOutput> {
        self.outcome.as_ref().ok()
    }
}

/// Selections that parameterize the Store/State/Advanced pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    pub store: Option<i64>,
    pub state: Option<String>,
    pub compare: Vec<i64>,
}

fn sections(table: &CanonicalTable, queries: Vec<ViewQuery>) -> Vec<Section> {
    let outcomes = execute_batch(table, &queries);
    queries
        .iter()
        .zip(outcomes)
        .map(|(q, outcome)| Section { kind: q.kind(), outcome })
        .collect()
}

/// Queries for `page`, resolving empty selections against the table.
///
/// Store/State pages with nothing to select return no queries.
pub fn page_queries(table: &CanonicalTable, page: Page, params: &PageParams, bins: usize) -> Vec<ViewQuery> {
    match page {
        Page::Global => ViewQuery::overview(bins),
        Page::Store => {
            let store = params.store.or_else(|| table.store_ids().first().copied());
            store.map(|store| ViewQuery::StoreDetail { store }).into_iter().collect()
        }
        Page::State => {
            let state = params.state.clone().or_else(|| table.state_names().into_iter().next());
            state.map(|state| ViewQuery::StateDetail { state }).into_iter().collect()
        }
        Page::Advanced => {
            let stores = if params.compare.is_empty() {
                table.store_ids().into_iter().take(DEFAULT_COMPARE_STORES).collect()
            } else {
                params.compare.clone()
            };
            vec![
                ViewQuery::MonthlyTrend,
                ViewQuery::StoreComparison { stores },
                ViewQuery::PromotionImpact,
                ViewQuery::Insights,
            ]
        }
    }
}

/// Compute every section of `page`.
pub fn run_page(table: &CanonicalTable, page: Page, params: &PageParams, bins: usize) -> Vec<Section> {
    sections(table, page_queries(table, page, params, bins))
}

/// Run a single view (the `view` subcommand).
pub fn run_view(table: &CanonicalTable, query: &ViewQuery) -> Section {
    Section {
        kind: query.kind(),
        outcome: execute(table, query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, ColumnSet, SalesRecord};

    fn table() -> CanonicalTable {
        let records = [(3, "Guayas"), (1, "Azuay"), (2, "Azuay"), (9, "Guayas")]
            .into_iter()
            .map(|(store, state)| SalesRecord {
                store_nbr: Some(store),
                state: Some(state.to_string()),
                family: Some("EGGS".to_string()),
                sales: 1.0,
                ..SalesRecord::default()
            })
            .collect();
        let columns: ColumnSet = [Column::StoreNbr, Column::State, Column::Family, Column::Sales]
            .into_iter()
            .collect();
        CanonicalTable::from_records(records, columns)
    }

    #[test]
    fn empty_selections_default_to_first_entries() {
        let t = table();
        let params = PageParams::default();
        assert_eq!(
            page_queries(&t, Page::Store, &params, 20),
            vec![ViewQuery::StoreDetail { store: 1 }]
        );
        assert_eq!(
            page_queries(&t, Page::State, &params, 20),
            vec![ViewQuery::StateDetail { state: "Azuay".into() }]
        );
        let advanced = page_queries(&t, Page::Advanced, &params, 20);
        assert!(advanced.contains(&ViewQuery::StoreComparison { stores: vec![1, 2, 3] }));
    }

    #[test]
    fn undated_table_skips_date_views_but_keeps_the_rest() {
        let t = table();
        let global = run_page(&t, Page::Global, &PageParams::default(), 20);
        assert_eq!(global.len(), 7);
        let skipped: Vec<ViewKind> = global.iter().filter(|s| s.outcome.is_err()).map(|s| s.kind).collect();
        assert_eq!(
            skipped,
            vec![
                ViewKind::WeekdayAverages,
                ViewKind::WeeklyAverages,
                ViewKind::MonthlyAverages,
                ViewKind::PromotionLeaders,
            ]
        );
        let state = run_page(&t, Page::State, &PageParams::default(), 20);
        assert!(state[0].output().is_some());
    }

    #[test]
    fn empty_table_has_no_store_page() {
        let t = CanonicalTable::empty();
        assert!(run_page(&t, Page::Store, &PageParams::default(), 20).is_empty());
    }
}
