//! Declarative view descriptors.
//!
//! A `ViewKind` names a view and declares the columns it cannot work without;
//! a `ViewQuery` is a kind plus its parameters (selected store, state, ...).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Column;

/// Rows kept by "top" views.
pub const TOP_N: usize = 10;
/// Stores listed in the per-state ranking.
pub const STATE_TOP_STORES: usize = 5;
/// Upper bound on stores in a comparison.
pub const MAX_COMPARE_STORES: usize = 5;
/// Promo share (percent) above which promotions read as effective.
pub const PROMO_POSITIVE_THRESHOLD_PCT: f64 = 20.0;
/// Family totals at or below this quantile are ignored by the promotion impact view.
pub const PROMO_IMPACT_MIN_QUANTILE: f64 = 0.25;
/// Default histogram resolution for the sales distribution.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    StoresPerState,
    TopFamilies,
    SalesDistribution,
    PromotionLeaders,
    WeekdayAverages,
    WeeklyAverages,
    MonthlyAverages,
    StoreDetail,
    StateDetail,
    MonthlyTrend,
    StoreComparison,
    PromotionImpact,
    Insights,
}

impl ViewKind {
    pub const ALL: [ViewKind; 13] = [
        ViewKind::StoresPerState,
        ViewKind::TopFamilies,
        ViewKind::SalesDistribution,
        ViewKind::PromotionLeaders,
        ViewKind::WeekdayAverages,
        ViewKind::WeeklyAverages,
        ViewKind::MonthlyAverages,
        ViewKind::StoreDetail,
        ViewKind::StateDetail,
        ViewKind::MonthlyTrend,
        ViewKind::StoreComparison,
        ViewKind::PromotionImpact,
        ViewKind::Insights,
    ];

    /// Stable machine name (matches the CLI value).
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::StoresPerState => "stores-per-state",
            ViewKind::TopFamilies => "top-families",
            ViewKind::SalesDistribution => "sales-distribution",
            ViewKind::PromotionLeaders => "promotion-leaders",
            ViewKind::WeekdayAverages => "weekday-averages",
            ViewKind::WeeklyAverages => "weekly-averages",
            ViewKind::MonthlyAverages => "monthly-averages",
            ViewKind::StoreDetail => "store-detail",
            ViewKind::StateDetail => "state-detail",
            ViewKind::MonthlyTrend => "monthly-trend",
            ViewKind::StoreComparison => "store-comparison",
            ViewKind::PromotionImpact => "promotion-impact",
            ViewKind::Insights => "insights",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::StoresPerState => "Stores per state",
            ViewKind::TopFamilies => "Top families by sales",
            ViewKind::SalesDistribution => "Sales distribution per store",
            ViewKind::PromotionLeaders => "Promotion leaders",
            ViewKind::WeekdayAverages => "Average sales by weekday",
            ViewKind::WeeklyAverages => "Average sales by ISO week",
            ViewKind::MonthlyAverages => "Average sales by month",
            ViewKind::StoreDetail => "Store detail",
            ViewKind::StateDetail => "State detail",
            ViewKind::MonthlyTrend => "Monthly sales trend",
            ViewKind::StoreComparison => "Store comparison",
            ViewKind::PromotionImpact => "Promotion impact by family",
            ViewKind::Insights => "Automated insights",
        }
    }

    /// Columns checked before the view runs.
    ///
    /// Sub-results of the detail views and insights have further optional
    /// requirements; those degrade individually instead of failing the view.
    pub fn required_columns(self) -> &'static [Column] {
        use Column::*;
        match self {
            ViewKind::StoresPerState => &[State, StoreNbr],
            ViewKind::TopFamilies => &[Family, Sales],
            ViewKind::SalesDistribution => &[StoreNbr, Sales],
            ViewKind::PromotionLeaders => &[StoreNbr, Sales, OnPromotion],
            ViewKind::WeekdayAverages | ViewKind::WeeklyAverages | ViewKind::MonthlyAverages => &[Date, Sales],
            ViewKind::StoreDetail => &[StoreNbr, Sales],
            ViewKind::StateDetail => &[State],
            ViewKind::MonthlyTrend => &[Date, Sales],
            ViewKind::StoreComparison => &[Date, StoreNbr, Sales],
            ViewKind::PromotionImpact => &[Family, Sales, OnPromotion],
            ViewKind::Insights => &[Sales],
        }
    }
}

/// A view plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum ViewQuery {
    StoresPerState,
    TopFamilies,
    SalesDistribution { bins: usize },
    PromotionLeaders,
    WeekdayAverages,
    WeeklyAverages,
    MonthlyAverages,
    StoreDetail { store: i64 },
    StateDetail { state: String },
    MonthlyTrend,
    StoreComparison { stores: Vec<i64> },
    PromotionImpact,
    Insights,
}

impl ViewQuery {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewQuery::StoresPerState => ViewKind::StoresPerState,
            ViewQuery::TopFamilies => ViewKind::TopFamilies,
            ViewQuery::SalesDistribution { .. } => ViewKind::SalesDistribution,
            ViewQuery::PromotionLeaders => ViewKind::PromotionLeaders,
            ViewQuery::WeekdayAverages => ViewKind::WeekdayAverages,
            ViewQuery::WeeklyAverages => ViewKind::WeeklyAverages,
            ViewQuery::MonthlyAverages => ViewKind::MonthlyAverages,
            ViewQuery::StoreDetail { .. } => ViewKind::StoreDetail,
            ViewQuery::StateDetail { .. } => ViewKind::StateDetail,
            ViewQuery::MonthlyTrend => ViewKind::MonthlyTrend,
            ViewQuery::StoreComparison { .. } => ViewKind::StoreComparison,
            ViewQuery::PromotionImpact => ViewKind::PromotionImpact,
            ViewQuery::Insights => ViewKind::Insights,
        }
    }

    /// The Global page batch, in display order.
    pub fn overview(bins: usize) -> Vec<ViewQuery> {
        vec![
            ViewQuery::StoresPerState,
            ViewQuery::TopFamilies,
            ViewQuery::WeekdayAverages,
            ViewQuery::WeeklyAverages,
            ViewQuery::MonthlyAverages,
            ViewQuery::SalesDistribution { bins },
            ViewQuery::PromotionLeaders,
        ]
    }
}
