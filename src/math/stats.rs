//! Small descriptive statistics helpers.
//!
//! All helpers return `None` (or an empty result) instead of dividing by zero.

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// `numerator / denominator * 100`, or `None` when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator * 100.0)
}

/// Relative change from `first` to `last`, in percent.
pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    percent(last - first, first)
}

/// Five-number style description of a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> Option<Describe> {
    let mean = mean(values)?;
    let median = median(values)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(Describe {
        count: values.len(),
        mean,
        median,
        min,
        max,
    })
}

/// One equal-width histogram bucket; `upper` is inclusive only for the last bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]` of the sample.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let bins = bins.max(1);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&v, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((median(&v).unwrap() - 2.5).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn percent_handles_zero_denominator() {
        assert!((percent(250.0, 1000.0).unwrap() - 25.0).abs() < 1e-12);
        assert_eq!(percent(10.0, 0.0), None);
        assert!((percent_change(100.0, 200.0).unwrap() - 100.0).abs() < 1e-12);
        assert_eq!(percent_change(0.0, 50.0), None);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let v = [0.0, 1.0, 2.5, 5.0, 10.0];
        let h = histogram(&v, 4);
        assert_eq!(h.len(), 4);
        assert_eq!(h.iter().map(|b| b.count).sum::<usize>(), v.len());
        assert_eq!(h[0].count, 2);
        assert_eq!(h[3].count, 1);
        assert_eq!(h[3].upper, 10.0);
    }

    #[test]
    fn histogram_of_constant_sample_is_one_bin() {
        let h = histogram(&[3.0, 3.0], 10);
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].count, 2);
        assert!(histogram(&[], 5).is_empty());
    }

    #[test]
    fn describe_basic() {
        let d = describe(&[4.0, 1.0, 7.0]).unwrap();
        assert_eq!(d.count, 3);
        assert!((d.mean - 4.0).abs() < 1e-12);
        assert_eq!(d.median, 4.0);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 7.0);
    }
}
