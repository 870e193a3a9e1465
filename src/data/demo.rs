//! Synthetic demo dataset generation.
//!
//! Produces a reproducible two-part sales sample with the same columns the
//! loader expects from real exports, so the dashboard can be tried without
//! the original data. The generated seasonality is deliberately visible:
//!
//! - weekends sell more than weekdays
//! - December is the strongest month
//! - promoted rows get an uplift

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};
use serde::Serialize;
use tracing::info;

use crate::domain::DEFAULT_EXPECTED_FILES;
use crate::error::{AppError, EXIT_INPUT, EXIT_RUNTIME};

/// Store catalogue: (store_nbr, city, state, store_type).
const STORES: [(i64, &str, &str, &str); 10] = [
    (1, "Quito", "Pichincha", "D"),
    (2, "Quito", "Pichincha", "D"),
    (3, "Quito", "Pichincha", "D"),
    (24, "Guayaquil", "Guayas", "D"),
    (26, "Guayaquil", "Guayas", "D"),
    (27, "Daule", "Guayas", "D"),
    (37, "Cuenca", "Azuay", "D"),
    (39, "Cuenca", "Azuay", "B"),
    (23, "Ambato", "Tungurahua", "D"),
    (5, "Santo Domingo", "Santo Domingo de los Tsachilas", "D"),
];

/// Product families with a typical daily sales level.
const FAMILIES: [(&str, f64); 12] = [
    ("GROCERY I", 3500.0),
    ("BEVERAGES", 2400.0),
    ("PRODUCE", 1500.0),
    ("CLEANING", 1000.0),
    ("DAIRY", 700.0),
    ("BREAD/BAKERY", 450.0),
    ("POULTRY", 350.0),
    ("MEATS", 340.0),
    ("PERSONAL CARE", 270.0),
    ("DELI", 260.0),
    ("EGGS", 170.0),
    ("FROZEN FOODS", 150.0),
];

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub rows: usize,
    pub seed: u64,
    pub start: NaiveDate,
    pub days: i64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            rows: 2000,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2013, 1, 1).unwrap_or_default(),
            days: 365 * 4 + 227,
        }
    }
}

/// One generated row, in the column order of the original exports.
#[derive(Debug, Clone, Serialize)]
pub struct DemoRow {
    pub date: NaiveDate,
    pub store_nbr: i64,
    pub family: &'static str,
    pub sales: f64,
    pub onpromotion: u32,
    pub city: &'static str,
    pub state: &'static str,
    pub store_type: &'static str,
    pub transactions: u32,
    pub dcoilwtico: Option<f64>,
}

pub fn generate_demo_rows(config: &DemoConfig) -> Result<Vec<DemoRow>, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(EXIT_INPUT, "Demo row count must be > 0."));
    }
    if config.days <= 0 {
        return Err(AppError::new(EXIT_INPUT, "Demo date span must be > 0 days."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = LogNormal::new(0.0, 0.35)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Noise distribution error: {e}")))?;
    let oil_step = Normal::new(0.0, 0.8)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.rows);
    let mut oil = 95.0_f64;

    for _ in 0..config.rows {
        let date = config.start + Duration::days(rng.gen_range(0..config.days));
        let (store_nbr, city, state, store_type) = STORES[rng.gen_range(0..STORES.len())];
        let (family, level) = FAMILIES[rng.gen_range(0..FAMILIES.len())];

        let onpromotion = if rng.gen_bool(0.3) { rng.gen_range(1..=40) } else { 0 };
        let promo_uplift = if onpromotion > 0 { 1.25 } else { 1.0 };
        let sales = level * weekday_factor(date.weekday()) * month_factor(date.month()) * promo_uplift
            * noise.sample(&mut rng);

        let transactions = (1500.0 * weekday_factor(date.weekday()) * noise.sample(&mut rng)).round() as u32;

        oil = (oil + oil_step.sample(&mut rng)).clamp(26.0, 110.0);
        // Oil quotes are missing on some days in the real data too.
        let dcoilwtico = if rng.gen_bool(0.05) { None } else { Some(round2(oil)) };

        rows.push(DemoRow {
            date,
            store_nbr,
            family,
            sales: round2(sales),
            onpromotion,
            city,
            state,
            store_type,
            transactions,
            dcoilwtico,
        });
    }

    Ok(rows)
}

/// Write the demo dataset as the two expected part files under `dir`.
pub fn write_demo_dataset(dir: &Path, config: &DemoConfig) -> Result<Vec<PathBuf>, AppError> {
    // Each part needs at least one row, or its CSV gets no header.
    if config.rows < DEFAULT_EXPECTED_FILES.len() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Demo dataset needs at least {} rows (one per part).", DEFAULT_EXPECTED_FILES.len()),
        ));
    }
    let rows = generate_demo_rows(config)?;
    create_dir_all(dir)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create '{}': {e}", dir.display())))?;

    let split = rows.len().div_ceil(2);
    let mut written = Vec::with_capacity(2);
    for (name, chunk) in DEFAULT_EXPECTED_FILES.iter().zip([&rows[..split], &rows[split..]]) {
        let path = dir.join(name);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create '{}': {e}", path.display())))?;
        for row in chunk {
            writer
                .serialize(row)
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write demo row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to flush '{}': {e}", path.display())))?;
        info!(path = %path.display(), rows = chunk.len(), "wrote demo source");
        written.push(path);
    }

    Ok(written)
}

fn weekday_factor(day: Weekday) -> f64 {
    match day {
        Weekday::Sat => 1.35,
        Weekday::Sun => 1.45,
        Weekday::Fri => 1.05,
        Weekday::Thu => 0.85,
        _ => 0.95,
    }
}

fn month_factor(month: u32) -> f64 {
    match month {
        12 => 1.4,
        1 | 2 => 0.9,
        7 | 8 => 1.05,
        _ => 1.0,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
