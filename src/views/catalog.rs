//! The view catalogue: one function per view over a canonical table.
//!
//! These functions assume the view's required columns were checked by the
//! executor; optional sub-results check their own columns.

use tracing::warn;

use crate::domain::{CanonicalTable, Column, SalesRecord, WEEK_ORDER, month_name, weekday_name};
use crate::math::{describe, fit_line_over_index, histogram, percent, percent_change, quantile};
use crate::views::descriptor::{
    MAX_COMPARE_STORES, PROMO_IMPACT_MIN_QUANTILE, PROMO_POSITIVE_THRESHOLD_PCT, STATE_TOP_STORES, TOP_N,
};
use crate::views::primitives::{
    Metric, arg_max, arg_min, count_distinct, group_by, group_distinct, pivot_sum, sort_desc, top_n,
};
use crate::views::results::*;

fn year(r: &SalesRecord) -> Option<i32> {
    r.calendar.map(|c| c.year)
}

fn year_month(r: &SalesRecord) -> Option<(i32, u32)> {
    r.calendar.map(|c| (c.year, c.month))
}

fn by_year(pairs: Vec<(i32, f64)>) -> Vec<YearValue> {
    pairs.into_iter().map(|(year, value)| YearValue { year, value }).collect()
}

fn family_sales(pairs: Vec<(String, f64)>) -> Vec<FamilySales> {
    pairs.into_iter().map(|(family, sales)| FamilySales { family, sales }).collect()
}

fn store_sales(pairs: Vec<(i64, f64)>) -> Vec<StoreSales> {
    pairs.into_iter().map(|(store_nbr, sales)| StoreSales { store_nbr, sales }).collect()
}

/// First value in table order for which `field` is present.
fn first_with<T>(rows: &[&SalesRecord], field: impl Fn(&SalesRecord) -> Option<T>) -> Option<T> {
    rows.iter().find_map(|r| field(r))
}

pub fn stores_per_state(table: &CanonicalTable) -> StoresPerState {
    let mut counts = group_distinct(table.records(), |r| r.state.clone(), |r| r.store_nbr);
    sort_desc(&mut counts);
    StoresPerState {
        states: counts
            .into_iter()
            .map(|(state, stores)| StateStores { state, stores })
            .collect(),
    }
}

pub fn top_families(table: &CanonicalTable) -> TopFamilies {
    let sums = group_by(table.records(), |r| r.family.clone(), |r| r.sales, Metric::Sum);
    TopFamilies {
        families: family_sales(top_n(sums, TOP_N)),
    }
}

pub fn sales_distribution(table: &CanonicalTable, bins: usize) -> SalesDistribution {
    let per_store = group_by(table.records(), |r| r.store_nbr, |r| r.sales, Metric::Sum);
    let totals: Vec<f64> = per_store.iter().map(|(_, v)| *v).collect();
    SalesDistribution {
        stats: describe(&totals),
        histogram: histogram(&totals, bins),
        per_store: store_sales(per_store),
    }
}

pub fn promotion_leaders(table: &CanonicalTable) -> PromotionLeaders {
    let promoted = table.records().iter().filter(|r| r.is_promoted());
    let leaders = group_by(promoted, |r| r.store_nbr, |r| r.sales, Metric::Sum);
    let promo_sales: f64 = table
        .records()
        .iter()
        .filter(|r| r.is_promoted())
        .map(|r| r.sales)
        .sum();
    let total_sales = table.total_sales();
    PromotionLeaders {
        leaders: store_sales(top_n(leaders, TOP_N)),
        promo_sales,
        total_sales,
        promo_share_pct: percent(promo_sales, total_sales),
    }
}

pub fn weekday_averages(table: &CanonicalTable) -> WeekdayAverages {
    let means = group_by(
        table.records(),
        |r| r.calendar.map(|c| c.weekday.num_days_from_monday()),
        |r| r.sales,
        Metric::Mean,
    );
    // Keys are Monday-based offsets, so ascending key order is WEEK_ORDER.
    let days = means
        .into_iter()
        .filter_map(|(offset, mean_sales)| {
            WEEK_ORDER.get(offset as usize).map(|day| WeekdayAverage {
                weekday: weekday_name(*day),
                mean_sales,
            })
        })
        .collect();
    WeekdayAverages { days }
}

pub fn weekly_averages(table: &CanonicalTable) -> WeeklyAverages {
    let means = group_by(table.records(), |r| r.calendar.map(|c| c.iso_week), |r| r.sales, Metric::Mean);
    WeeklyAverages {
        peak_week: arg_max(&means),
        trough_week: arg_min(&means),
        weeks: means
            .into_iter()
            .map(|(iso_week, mean_sales)| WeekAverage { iso_week, mean_sales })
            .collect(),
    }
}

pub fn monthly_averages(table: &CanonicalTable) -> MonthlyAverages {
    let means = group_by(table.records(), |r| r.calendar.map(|c| c.month), |r| r.sales, Metric::Mean);
    MonthlyAverages {
        months: means
            .into_iter()
            .map(|(month, mean_sales)| MonthAverage {
                month,
                month_name: month_name(month),
                mean_sales,
            })
            .collect(),
    }
}

pub fn store_detail(table: &CanonicalTable, store_nbr: i64) -> StoreDetail {
    let rows: Vec<&SalesRecord> = table
        .records()
        .iter()
        .filter(|r| r.store_nbr == Some(store_nbr))
        .collect();
    let has = |c: Column| table.has(c);
    let dated = has(Column::Date);

    StoreDetail {
        store_nbr,
        records: rows.len(),
        total_sales: rows.iter().map(|r| r.sales).sum(),
        city: first_with(&rows, |r| r.city.clone()),
        state: first_with(&rows, |r| r.state.clone()),
        store_type: first_with(&rows, |r| r.store_type.clone()),
        sales_by_year: dated.then(|| by_year(group_by(rows.iter().copied(), year, |r| r.sales, Metric::Sum))),
        transactions_by_year: (dated && has(Column::Transactions))
            .then(|| by_year(group_by(rows.iter().copied(), year, |r| r.transactions, Metric::Sum))),
        promo_sales_by_year: (dated && has(Column::OnPromotion)).then(|| {
            let promoted = rows.iter().copied().filter(|r| r.is_promoted());
            by_year(group_by(promoted, year, |r| r.sales, Metric::Sum))
        }),
        top_families: has(Column::Family).then(|| {
            let sums = group_by(rows.iter().copied(), |r| r.family.clone(), |r| r.sales, Metric::Sum);
            family_sales(top_n(sums, TOP_N))
        }),
    }
}

pub fn state_detail(table: &CanonicalTable, state: &str) -> StateDetail {
    let rows: Vec<&SalesRecord> = table
        .records()
        .iter()
        .filter(|r| r.state.as_deref() == Some(state))
        .collect();
    let has = |c: Column| table.has(c);
    let dated = has(Column::Date);
    let sales = has(Column::Sales);

    StateDetail {
        state: state.to_string(),
        records: rows.len(),
        stores: has(Column::StoreNbr).then(|| count_distinct(rows.iter().copied(), |r| r.store_nbr)),
        cities: has(Column::City).then(|| count_distinct(rows.iter().copied(), |r| r.city.clone())),
        total_sales: sales.then(|| rows.iter().map(|r| r.sales).sum::<f64>()),
        transactions_by_year: (dated && has(Column::Transactions))
            .then(|| by_year(group_by(rows.iter().copied(), year, |r| r.transactions, Metric::Sum))),
        top_stores: (sales && has(Column::StoreNbr)).then(|| {
            let sums = group_by(rows.iter().copied(), |r| r.store_nbr, |r| r.sales, Metric::Sum);
            store_sales(top_n(sums, STATE_TOP_STORES))
        }),
        top_family: (sales && has(Column::Family))
            .then(|| {
                let sums = group_by(rows.iter().copied(), |r| r.family.clone(), |r| r.sales, Metric::Sum);
                family_sales(top_n(sums, 1)).into_iter().next()
            })
            .flatten(),
        month_year_sales: (sales && dated).then(|| {
            pivot_sum(
                rows.iter().copied(),
                |r| r.calendar.map(|c| c.month),
                year,
                |r| r.sales,
            )
        }),
    }
}

pub fn monthly_trend(table: &CanonicalTable) -> MonthlyTrend {
    let sums = group_by(table.records(), year_month, |r| r.sales, Metric::Sum);
    let values: Vec<f64> = sums.iter().map(|(_, v)| *v).collect();
    let fit = fit_line_over_index(&values);
    let change_pct = match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() >= 2 => percent_change(*first, *last),
        _ => None,
    };

    let periods = sums
        .into_iter()
        .enumerate()
        .map(|(i, ((year, month), sales))| TrendPoint {
            year,
            month,
            sales,
            trend: fit.as_ref().and_then(|f| f.fitted.get(i).copied()),
        })
        .collect();

    MonthlyTrend {
        periods,
        fit,
        change_pct,
    }
}

/// De-duplicate (first occurrence wins) and cap the comparison set.
///
/// Returns `(kept, dropped)`.
pub fn comparison_stores(requested: &[i64]) -> (Vec<i64>, Vec<i64>) {
    let mut kept: Vec<i64> = Vec::new();
    let mut dropped = Vec::new();
    for &id in requested {
        if kept.contains(&id) || kept.len() >= MAX_COMPARE_STORES {
            dropped.push(id);
        } else {
            kept.push(id);
        }
    }
    if !dropped.is_empty() {
        warn!(kept = ?kept, dropped = ?dropped, limit = MAX_COMPARE_STORES, "comparison store list trimmed");
    }
    (kept, dropped)
}

pub fn store_comparison(table: &CanonicalTable, requested: &[i64]) -> StoreComparison {
    let (stores, dropped) = comparison_stores(requested);
    let rows = table
        .records()
        .iter()
        .filter(|r| r.store_nbr.is_some_and(|s| stores.contains(&s)));
    let sums = group_by(
        rows,
        |r| Some((year_month(r)?, r.store_nbr?)),
        |r| r.sales,
        Metric::Sum,
    );
    let points = sums
        .into_iter()
        .map(|(((year, month), store_nbr), sales)| ComparisonPoint {
            year,
            month,
            store_nbr,
            sales,
        })
        .collect();
    StoreComparison {
        stores,
        dropped,
        points,
    }
}

pub fn promotion_impact(table: &CanonicalTable) -> PromotionImpact {
    let totals = group_by(table.records(), |r| r.family.clone(), |r| r.sales, Metric::Sum);
    let promoted = table.records().iter().filter(|r| r.is_promoted());
    let promo = group_by(promoted, |r| r.family.clone(), |r| r.sales, Metric::Sum);

    let total_values: Vec<f64> = totals.iter().map(|(_, v)| *v).collect();
    let min_total = quantile(&total_values, PROMO_IMPACT_MIN_QUANTILE);

    let mut families: Vec<FamilyPromo> = totals
        .into_iter()
        .filter(|(_, total)| min_total.is_some_and(|t| *total > t))
        .map(|(family, total_sales)| {
            // Both lists are ascending by family name.
            let promo_sales = promo
                .binary_search_by(|(f, _)| f.as_str().cmp(family.as_str()))
                .map(|i| promo[i].1)
                .unwrap_or(0.0);
            FamilyPromo {
                promo_share_pct: percent(promo_sales, total_sales),
                family,
                promo_sales,
                total_sales,
            }
        })
        .collect();

    // `None` ratios sort last.
    families.sort_by(|a, b| {
        b.promo_share_pct
            .partial_cmp(&a.promo_share_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    families.truncate(TOP_N);

    PromotionImpact { min_total, families }
}

pub fn insights(table: &CanonicalTable) -> Insights {
    let has = |c: Column| table.has(c);

    let best_weekday = has(Column::Date)
        .then(|| {
            let days = weekday_averages(table).days;
            let pairs: Vec<(usize, f64)> = days.iter().map(|d| d.mean_sales).enumerate().collect();
            arg_max(&pairs).map(|i| days[i].clone())
        })
        .flatten();

    let top_family = has(Column::Family)
        .then(|| top_families(table).families.into_iter().next())
        .flatten();

    let top_state = has(Column::State)
        .then(|| {
            let sums = group_by(table.records(), |r| r.state.clone(), |r| r.sales, Metric::Sum);
            top_n(sums, 1)
                .into_iter()
                .next()
                .map(|(state, sales)| StateSales { state, sales })
        })
        .flatten();

    let promotions = has(Column::OnPromotion)
        .then(|| {
            let share = promotion_leaders(table).promo_share_pct?;
            let assessment = if share > PROMO_POSITIVE_THRESHOLD_PCT {
                PromoAssessment::Positive
            } else {
                PromoAssessment::Cautionary
            };
            Some(PromoInsight {
                share_pct: share,
                assessment,
            })
        })
        .flatten();

    let trend_change_pct = has(Column::Date).then(|| monthly_trend(table).change_pct).flatten();

    Insights {
        best_weekday,
        top_family,
        top_state,
        promotions,
        trend_change_pct,
    }
}
