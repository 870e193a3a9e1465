//! Typed view results.
//!
//! Results are small, display-ready and serializable as-is for JSON export.
//! Inside the detail views and the insights, each sub-result is an `Option`
//! that stays `None` when the columns it needs are absent.

use serde::Serialize;

use crate::math::{Describe, HistogramBin, LineFit};
use crate::views::primitives::Pivot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateStores {
    pub state: String,
    pub stores: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilySales {
    pub family: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSales {
    pub store_nbr: i64,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSales {
    pub state: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoresPerState {
    /// Descending by store count.
    pub states: Vec<StateStores>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopFamilies {
    pub families: Vec<FamilySales>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesDistribution {
    /// Per-store totals, ascending by store id.
    pub per_store: Vec<StoreSales>,
    pub stats: Option<Describe>,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionLeaders {
    pub leaders: Vec<StoreSales>,
    pub promo_sales: f64,
    pub total_sales: f64,
    /// `None` when total sales are zero.
    pub promo_share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: &'static str,
    pub mean_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverages {
    /// Monday first; weekdays with no rows are left out.
    pub days: Vec<WeekdayAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekAverage {
    pub iso_week: u32,
    pub mean_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyAverages {
    pub weeks: Vec<WeekAverage>,
    pub peak_week: Option<u32>,
    pub trough_week: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthAverage {
    pub month: u32,
    pub month_name: &'static str,
    pub mean_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverages {
    pub months: Vec<MonthAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreDetail {
    pub store_nbr: i64,
    pub records: usize,
    pub total_sales: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub store_type: Option<String>,
    pub sales_by_year: Option<Vec<YearValue>>,
    pub transactions_by_year: Option<Vec<YearValue>>,
    pub promo_sales_by_year: Option<Vec<YearValue>>,
    pub top_families: Option<Vec<FamilySales>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDetail {
    pub state: String,
    pub records: usize,
    pub stores: Option<usize>,
    pub cities: Option<usize>,
    pub total_sales: Option<f64>,
    pub transactions_by_year: Option<Vec<YearValue>>,
    pub top_stores: Option<Vec<StoreSales>>,
    pub top_family: Option<FamilySales>,
    /// Rows are months, columns are years.
    pub month_year_sales: Option<Pivot<u32, i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub sales: f64,
    pub trend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// Chronological.
    pub periods: Vec<TrendPoint>,
    pub fit: Option<LineFit>,
    /// First to last period; `None` with fewer than two periods or a zero start.
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub year: i32,
    pub month: u32,
    pub store_nbr: i64,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreComparison {
    pub stores: Vec<i64>,
    /// Requested ids that were not compared (duplicates or over the limit).
    pub dropped: Vec<i64>,
    pub points: Vec<ComparisonPoint>,
}

impl StoreComparison {
    /// Monthly sales of one store, chronological.
    pub fn series(&self, store_nbr: i64) -> Vec<f64> {
        self.points
            .iter()
            .filter(|p| p.store_nbr == store_nbr)
            .map(|p| p.sales)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyPromo {
    pub family: String,
    pub promo_sales: f64,
    pub total_sales: f64,
    pub promo_share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionImpact {
    /// Family totals must exceed this to be listed.
    pub min_total: Option<f64>,
    pub families: Vec<FamilyPromo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoAssessment {
    Positive,
    Cautionary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromoInsight {
    pub share_pct: f64,
    pub assessment: PromoAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub best_weekday: Option<WeekdayAverage>,
    pub top_family: Option<FamilySales>,
    pub top_state: Option<StateSales>,
    pub promotions: Option<PromoInsight>,
    pub trend_change_pct: Option<f64>,
}

impl Insights {
    /// Human-readable findings, skipping the ones that could not be computed.
    pub fn findings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(day) = &self.best_weekday {
            out.push(format!(
                "{} has the highest average sales ({:.2}).",
                day.weekday, day.mean_sales
            ));
        }
        if let Some(f) = &self.top_family {
            out.push(format!("Top family is {} with {:.2} in sales.", f.family, f.sales));
        }
        if let Some(s) = &self.top_state {
            out.push(format!("Top state is {} with {:.2} in sales.", s.state, s.sales));
        }
        if let Some(p) = &self.promotions {
            let text = match p.assessment {
                PromoAssessment::Positive => "promotions are an effective driver",
                PromoAssessment::Cautionary => "promotion effectiveness should be reviewed",
            };
            out.push(format!("{:.2}% of sales come from promoted rows: {text}.", p.share_pct));
        }
        if let Some(change) = self.trend_change_pct {
            let direction = if change >= 0.0 { "grew" } else { "fell" };
            out.push(format!(
                "Monthly sales {direction} {:.2}% from the first to the last period.",
                change.abs()
            ));
        }
        out
    }
}

/// Result of any view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "result", rename_all = "kebab-case")]
pub enum ViewOutput {
    StoresPerState(StoresPerState),
    TopFamilies(TopFamilies),
    SalesDistribution(SalesDistribution),
    PromotionLeaders(PromotionLeaders),
    WeekdayAverages(WeekdayAverages),
    WeeklyAverages(WeeklyAverages),
    MonthlyAverages(MonthlyAverages),
    StoreDetail(StoreDetail),
    StateDetail(StateDetail),
    MonthlyTrend(MonthlyTrend),
    StoreComparison(StoreComparison),
    PromotionImpact(PromotionImpact),
    Insights(Insights),
}
