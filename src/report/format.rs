//! Formatted terminal output.
//!
//! All text rendering for the CLI lives here; views only produce data.

use crate::app::pipeline::Section;
use crate::domain::{DateSource, LoadSummary};
use crate::error::LoadError;
use crate::plot::{render_bar_chart, render_series_plot};
use crate::views::{ViewOutput, ViewTable};

const PLOT_WIDTH: usize = 72;
const PLOT_HEIGHT: usize = 14;
const BAR_WIDTH: usize = 40;

/// Dataset summary: sources, coverage, and column diagnostics.
pub fn format_load_summary(summary: &LoadSummary) -> String {
    let mut out = String::new();

    out.push_str("=== salesboard - dataset summary ===\n");
    for s in &summary.sources {
        out.push_str(&format!("source: {} ({} rows, {} columns)\n", s.name, s.rows, s.columns));
    }
    out.push_str(&format!("rows: {}\n", summary.rows));
    out.push_str(&format!("date: {}\n", fmt_date_source(&summary.date_source)));
    match summary.date_range {
        Some((first, last)) => out.push_str(&format!(
            "dates: {first} .. {last} ({} of {} rows valid)\n",
            summary.valid_dates, summary.rows
        )),
        None => out.push_str("dates: none\n"),
    }
    out.push_str(&format!(
        "stores: {} | states: {} | families: {} | months: {}\n",
        summary.distinct_stores, summary.distinct_states, summary.distinct_families, summary.distinct_months
    ));
    out.push_str(&format!("total sales: {:.2}\n", summary.total_sales));

    out.push_str("\nColumns:\n");
    out.push_str(&format!("- available: {}\n", summary.columns.available.join(", ")));
    let present: Vec<&str> = summary.columns.present.iter().map(|c| c.name()).collect();
    out.push_str(&format!("- recognized: {}\n", present.join(", ")));
    for m in &summary.columns.missing {
        if m.similar.is_empty() {
            out.push_str(&format!("- missing: {}\n", m.column.name()));
        } else {
            out.push_str(&format!(
                "- missing: {} (similar: {})\n",
                m.column.name(),
                m.similar.join(", ")
            ));
        }
    }

    out
}

fn fmt_date_source(source: &DateSource) -> String {
    match source {
        DateSource::DateColumn => "column `date`".to_string(),
        DateSource::Named { column } => format!("column `{column}`"),
        DateSource::Components => "year/month/day columns".to_string(),
        DateSource::Unresolved => "unresolved (date views disabled)".to_string(),
    }
}

/// Explain a failed load, including the candidates that were considered.
pub fn format_load_error(err: &LoadError) -> String {
    let mut out = format!("Load failed: {err}\n");
    match err {
        LoadError::InsufficientSources { .. } => {
            out.push_str("Expected parte_1_muestra.csv and parte_2_muestra.csv, or two CSV files whose names\n");
            out.push_str("contain parte/muestra/sample/test. Try `salesboard demo --out <dir>`.\n");
        }
        LoadError::SourceNotFound { .. } => {
            out.push_str("Check --data-dir / --file / --url.\n");
        }
        LoadError::MalformedSource { .. } => {}
    }
    out
}

/// A page: every section in order, skipped views noted in place.
pub fn format_page(title: &str, sections: &[Section]) -> String {
    let mut out = format!("=== {title} ===\n");
    if sections.is_empty() {
        out.push_str("(nothing to show)\n");
    }
    for section in sections {
        out.push('\n');
        out.push_str(&format_section(section));
    }
    out
}

pub fn format_section(section: &Section) -> String {
    match &section.outcome {
        Ok(output) => format_output(output),
        Err(err) => format!("[{}] skipped: {err}\n", section.kind.title()),
    }
}

/// Tables of one view, plus a plot where one helps.
pub fn format_output(output: &ViewOutput) -> String {
    let mut out = String::new();
    for table in output.tables() {
        out.push_str(&format_table(&table));
        out.push('\n');
    }

    match output {
        ViewOutput::MonthlyTrend(trend) if !trend.periods.is_empty() => {
            let values: Vec<f64> = trend.periods.iter().map(|p| p.sales).collect();
            let fitted = trend.fit.as_ref().map(|f| f.fitted.as_slice());
            out.push_str(&render_series_plot(&values, fitted, PLOT_WIDTH, PLOT_HEIGHT));
        }
        ViewOutput::TopFamilies(top) => {
            let items: Vec<(String, f64)> = top.families.iter().map(|f| (f.family.clone(), f.sales)).collect();
            out.push_str(&render_bar_chart(&items, BAR_WIDTH));
        }
        ViewOutput::Insights(insights) if insights.findings().is_empty() => {
            out.push_str("No insights available for this dataset.\n");
        }
        _ => {}
    }
    out
}

/// Fixed-width text table.
pub fn format_table(table: &ViewTable) -> String {
    let mut out = format!("{}:\n", table.title);

    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(&c.to_string(), 40)).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rendered
                .iter()
                .filter_map(|r| r.get(i))
                .map(|s| s.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{name:<w$}"))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    if rendered.is_empty() {
        out.push_str("(no rows)\n");
    }
    for row in rendered {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CanonicalTable, Column};
    use crate::error::ViewError;
    use crate::views::ViewKind;
    use crate::views::results::{StateStores, StoresPerState};

    #[test]
    fn table_columns_are_aligned() {
        let out = ViewOutput::StoresPerState(StoresPerState {
            states: vec![
                StateStores {
                    state: "Pichincha".into(),
                    stores: 3,
                },
                StateStores {
                    state: "Azuay".into(),
                    stores: 12,
                },
            ],
        });
        let txt = format_table(&out.tables()[0]);
        let expected = concat!(
            "Stores per state:\n",
            "state      stores\n",
            "---------  ------\n",
            "Pichincha  3\n",
            "Azuay      12\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn skipped_section_names_the_missing_column() {
        let section = Section {
            kind: ViewKind::MonthlyTrend,
            outcome: Err(ViewError::MissingColumn {
                view: "monthly-trend",
                column: Column::Date,
            }),
        };
        let txt = format_section(&section);
        assert!(txt.starts_with("[Monthly sales trend] skipped:"));
        assert!(txt.contains("`date`"));
    }

    #[test]
    fn summary_of_empty_table_lists_missing_columns() {
        let txt = format_load_summary(&CanonicalTable::empty().summary());
        assert!(txt.contains("rows: 0"));
        assert!(txt.contains("dates: none"));
        assert!(txt.contains("- missing: sales"));
    }

    #[test]
    fn truncate_marks_clipped_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
