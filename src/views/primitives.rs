//! Composable aggregation primitives.
//!
//! Every view is assembled from these: a keyed group-by with a metric, a
//! distinct count, a descending top-N, and a two-key pivot. Grouping is done
//! with `BTreeMap`s so outputs start in ascending key order; rows whose key is
//! `None` do not belong to any group.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::SalesRecord;

/// How grouped values are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Sum,
    Mean,
    Count,
}

#[derive(Default)]
struct Acc {
    sum: f64,
    n: usize,
}

/// Group `rows` by `key` and reduce `value` with `metric`, ascending by key.
pub fn group_by<'a, K, I, FK, FV>(rows: I, key: FK, value: FV, metric: Metric) -> Vec<(K, f64)>
where
    K: Ord,
    I: IntoIterator<Item = &'a SalesRecord>,
    FK: Fn(&'a SalesRecord) -> Option<K>,
    FV: Fn(&'a SalesRecord) -> f64,
{
    let mut groups: BTreeMap<K, Acc> = BTreeMap::new();
    for r in rows {
        let Some(k) = key(r) else { continue };
        let acc = groups.entry(k).or_default();
        acc.sum += value(r);
        acc.n += 1;
    }
    groups
        .into_iter()
        .map(|(k, acc)| {
            let v = match metric {
                Metric::Sum => acc.sum,
                Metric::Mean => acc.sum / acc.n as f64,
                Metric::Count => acc.n as f64,
            };
            (k, v)
        })
        .collect()
}

/// Number of distinct `value`s per `key`, ascending by key.
pub fn group_distinct<'a, K, V, I, FK, FV>(rows: I, key: FK, value: FV) -> Vec<(K, usize)>
where
    K: Ord,
    V: Ord,
    I: IntoIterator<Item = &'a SalesRecord>,
    FK: Fn(&'a SalesRecord) -> Option<K>,
    FV: Fn(&'a SalesRecord) -> Option<V>,
{
    let mut groups: BTreeMap<K, BTreeSet<V>> = BTreeMap::new();
    for r in rows {
        let (Some(k), Some(v)) = (key(r), value(r)) else { continue };
        groups.entry(k).or_default().insert(v);
    }
    groups.into_iter().map(|(k, set)| (k, set.len())).collect()
}

/// Count of distinct non-null values.
pub fn count_distinct<'a, V, I, FV>(rows: I, value: FV) -> usize
where
    V: Ord,
    I: IntoIterator<Item = &'a SalesRecord>,
    FV: Fn(&'a SalesRecord) -> Option<V>,
{
    rows.into_iter().filter_map(value).collect::<BTreeSet<V>>().len()
}

/// Stable sort, largest value first. Ties keep their incoming (key) order.
pub fn sort_desc<K, V: PartialOrd>(items: &mut [(K, V)]) {
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}

/// The `n` largest entries, largest first.
pub fn top_n<K, V: PartialOrd>(mut items: Vec<(K, V)>, n: usize) -> Vec<(K, V)> {
    sort_desc(&mut items);
    items.truncate(n);
    items
}

/// First entry with the largest value.
pub fn arg_max<K: Clone>(items: &[(K, f64)]) -> Option<K> {
    let mut best: Option<&(K, f64)> = None;
    for item in items {
        if best.is_none_or(|b| item.1 > b.1) {
            best = Some(item);
        }
    }
    best.map(|(k, _)| k.clone())
}

/// First entry with the smallest value.
pub fn arg_min<K: Clone>(items: &[(K, f64)]) -> Option<K> {
    let mut best: Option<&(K, f64)> = None;
    for item in items {
        if best.is_none_or(|b| item.1 < b.1) {
            best = Some(item);
        }
    }
    best.map(|(k, _)| k.clone())
}

/// Row-key x column-key table of sums.
///
/// Only keys that occur in the data get a row/column; a cell with no
/// contributing rows is `None`, never a silent zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot<R, C> {
    pub rows: Vec<R>,
    pub columns: Vec<C>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl<R, C> Pivot<R, C> {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row)?.get(col).copied().flatten()
    }
}

/// Sum `value` into a pivot keyed by `(row_key, col_key)`.
pub fn pivot_sum<'a, R, C, I, FR, FC, FV>(rows: I, row_key: FR, col_key: FC, value: FV) -> Pivot<R, C>
where
    R: Ord + Clone,
    C: Ord + Clone,
    I: IntoIterator<Item = &'a SalesRecord>,
    FR: Fn(&'a SalesRecord) -> Option<R>,
    FC: Fn(&'a SalesRecord) -> Option<C>,
    FV: Fn(&'a SalesRecord) -> f64,
{
    let mut sums: BTreeMap<(R, C), f64> = BTreeMap::new();
    let mut row_keys = BTreeSet::new();
    let mut col_keys = BTreeSet::new();
    for r in rows {
        let (Some(rk), Some(ck)) = (row_key(r), col_key(r)) else { continue };
        row_keys.insert(rk.clone());
        col_keys.insert(ck.clone());
        *sums.entry((rk, ck)).or_insert(0.0) += value(r);
    }

    let rows: Vec<R> = row_keys.into_iter().collect();
    let columns: Vec<C> = col_keys.into_iter().collect();
    let cells = rows
        .iter()
        .map(|rk| {
            columns
                .iter()
                .map(|ck| sums.get(&(rk.clone(), ck.clone())).copied())
                .collect()
        })
        .collect();

    Pivot { rows, columns, cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(store: Option<i64>, family: &str, sales: f64) -> SalesRecord {
        SalesRecord {
            store_nbr: store,
            family: Some(family.to_string()),
            sales,
            ..SalesRecord::default()
        }
    }

    #[test]
    fn group_by_skips_null_keys_and_sorts_keys() {
        let rows = vec![rec(Some(2), "A", 1.0), rec(None, "A", 100.0), rec(Some(1), "B", 2.0), rec(Some(2), "B", 3.0)];
        let sums = group_by(&rows, |r| r.store_nbr, |r| r.sales, Metric::Sum);
        assert_eq!(sums, vec![(1, 2.0), (2, 4.0)]);
        let means = group_by(&rows, |r| r.store_nbr, |r| r.sales, Metric::Mean);
        assert_eq!(means, vec![(1, 2.0), (2, 2.0)]);
        let counts = group_by(&rows, |r| r.family.clone(), |_| 0.0, Metric::Count);
        assert_eq!(counts, vec![("A".to_string(), 2.0), ("B".to_string(), 2.0)]);
    }

    #[test]
    fn distinct_counts() {
        let rows = vec![rec(Some(1), "A", 0.0), rec(Some(1), "A", 0.0), rec(Some(2), "A", 0.0), rec(Some(3), "B", 0.0)];
        let per_family = group_distinct(&rows, |r| r.family.clone(), |r| r.store_nbr);
        assert_eq!(per_family, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
        assert_eq!(count_distinct(&rows, |r| r.store_nbr), 3);
    }

    #[test]
    fn top_n_is_descending_and_stable() {
        let items = vec![("a", 1.0), ("b", 5.0), ("c", 5.0), ("d", 3.0)];
        let top = top_n(items, 3);
        assert_eq!(top, vec![("b", 5.0), ("c", 5.0), ("d", 3.0)]);
    }

    #[test]
    fn arg_extremes_pick_first_occurrence() {
        let items = vec![(1u32, 2.0), (2, 9.0), (3, 9.0), (4, 1.0), (5, 1.0)];
        assert_eq!(arg_max(&items), Some(2));
        assert_eq!(arg_min(&items), Some(4));
        assert_eq!(arg_max::<u32>(&[]), None);
    }

    #[test]
    fn pivot_leaves_gaps_as_none() {
        let rows = vec![rec(Some(1), "A", 1.0), rec(Some(1), "A", 2.0), rec(Some(2), "B", 5.0)];
        let p = pivot_sum(&rows, |r| r.store_nbr, |r| r.family.clone(), |r| r.sales);
        assert_eq!(p.rows, vec![1, 2]);
        assert_eq!(p.columns, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(p.get(0, 0), Some(3.0));
        assert_eq!(p.get(0, 1), None);
        assert_eq!(p.get(1, 1), Some(5.0));
    }
}
