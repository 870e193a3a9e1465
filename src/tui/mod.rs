//! Ratatui-based terminal dashboard.
//!
//! Four tabs mirror the CLI pages (Global, Store, State, Advanced). Each tab
//! shows a selector pane on the left, a Plotters chart and the page's view
//! tables on the right. All views read the session's current snapshot.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use tracing::info;

use crate::app::pipeline::{Page, PageParams, Section, run_page};
use crate::app::session::Session;
use crate::domain::{DashboardConfig, month_name};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::report::{format_load_error, format_table};
use crate::views::ViewOutput;
use crate::views::descriptor::MAX_COMPARE_STORES;

mod plotters_chart;

use plotters_chart::{ChartSeries, PALETTE, SalesPlottersChart, series_bounds};

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: DashboardConfig,
    session: Session,
    page: usize,
    stores: Vec<i64>,
    states: Vec<String>,
    store_cursor: usize,
    state_cursor: usize,
    compare: Vec<i64>,
    sections: Vec<Section>,
    scroll: u16,
    status: String,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        let session = Session::open(&config.source);
        let mut app = Self {
            config,
            session,
            page: 0,
            stores: Vec::new(),
            states: Vec::new(),
            store_cursor: 0,
            state_cursor: 0,
            compare: Vec::new(),
            sections: Vec::new(),
            scroll: 0,
            status: String::new(),
        };
        app.after_load();
        app
    }

    fn current_page(&self) -> Page {
        Page::ALL[self.page % Page::ALL.len()]
    }

    /// Refresh selectors after a (re)load and recompute the page.
    fn after_load(&mut self) {
        let table = self.session.snapshot();
        self.stores = table.store_ids();
        self.states = table.state_names();
        self.store_cursor = self.store_cursor.min(self.stores.len().saturating_sub(1));
        self.state_cursor = self.state_cursor.min(self.states.len().saturating_sub(1));
        self.compare.retain(|id| self.stores.contains(id));

        self.status = match self.session.last_error() {
            Some(err) => format!("load failed: {err}"),
            None => format!("{} rows loaded (v{})", table.len(), self.session.version()),
        };
        self.recompute();
    }

    fn params(&self) -> PageParams {
        PageParams {
            store: self.stores.get(self.store_cursor).copied(),
            state: self.states.get(self.state_cursor).cloned(),
            compare: self.compare.clone(),
        }
    }

    fn recompute(&mut self) {
        let table = self.session.snapshot();
        self.sections = run_page(&table, self.current_page(), &self.params(), self.config.histogram_bins);
        self.scroll = 0;
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Tab => {
                self.page = (self.page + 1) % Page::ALL.len();
                self.recompute();
            }
            KeyCode::Left | KeyCode::BackTab => {
                self.page = (self.page + Page::ALL.len() - 1) % Page::ALL.len();
                self.recompute();
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(5),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(5),
            KeyCode::Char('c') => self.toggle_compare(),
            KeyCode::Char('R') => {
                // A failed reload is reported in the status line; the session
                // already holds the empty table and the diagnostic.
                let _ = self.session.reload(&self.config.source);
                info!(version = self.session.version(), "reloaded from tui");
                self.after_load();
            }
            _ => {}
        }
        false
    }

    fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match self.current_page() {
            Page::State => (&mut self.state_cursor, self.states.len()),
            Page::Store | Page::Advanced => (&mut self.store_cursor, self.stores.len()),
            Page::Global => return,
        };
        if len == 0 {
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
        // The Advanced page only moves the comparison cursor.
        if self.current_page() != Page::Advanced {
            self.recompute();
        }
    }

    fn toggle_compare(&mut self) {
        let Some(&id) = self.stores.get(self.store_cursor) else {
            return;
        };
        if let Some(pos) = self.compare.iter().position(|s| *s == id) {
            self.compare.remove(pos);
            self.status = format!("store {id} removed from comparison");
        } else if self.compare.len() >= MAX_COMPARE_STORES {
            self.status = format!("at most {MAX_COMPARE_STORES} stores can be compared");
            return;
        } else {
            self.compare.push(id);
            self.status = format!("store {id} added to comparison");
        }
        if self.current_page() == Page::Advanced {
            self.recompute();
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_tabs(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Page::ALL.iter().map(|p| Line::from(p.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.page)
            .block(Block::default().title("salesboard").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);
        self.draw_selector(frame, chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_chart(frame, right[0]);
        self.draw_tables(frame, right[1]);
    }

    fn draw_selector(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (title, items, selected): (&str, Vec<ListItem>, Option<usize>) = match self.current_page() {
            Page::Global => {
                let summary = self.session.snapshot().summary();
                let lines = vec![
                    format!("rows: {}", summary.rows),
                    format!("stores: {}", summary.distinct_stores),
                    format!("states: {}", summary.distinct_states),
                    format!("families: {}", summary.distinct_families),
                    format!("months: {}", summary.distinct_months),
                    format!("sales: {:.0}", summary.total_sales),
                ];
                ("Dataset", lines.into_iter().map(ListItem::new).collect(), None)
            }
            Page::Store => (
                "Stores",
                self.stores.iter().map(|s| ListItem::new(format!("store {s}"))).collect(),
                Some(self.store_cursor),
            ),
            Page::State => (
                "States",
                self.states.iter().map(|s| ListItem::new(s.clone())).collect(),
                Some(self.state_cursor),
            ),
            Page::Advanced => (
                "Compare (c)",
                self.stores
                    .iter()
                    .map(|s| {
                        let mark = if self.compare.contains(s) { "[x]" } else { "[ ]" };
                        ListItem::new(format!("{mark} store {s}"))
                    })
                    .collect(),
                Some(self.store_cursor),
            ),
        };

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let spec = chart_for_page(&self.sections);
        let title = match &spec {
            Some(c) => legend_title(c),
            None => "Chart".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(spec) = spec else {
            let msg = Paragraph::new("No chart for this page (missing columns or no data).")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };
        let Some((x_bounds, y_bounds)) = series_bounds(&spec.series) else {
            return;
        };

        let widget = SalesPlottersChart {
            series: &spec.series,
            x_bounds,
            y_bounds,
            x_label: spec.x_label,
            y_label: "sales",
            fmt_x: spec.fmt_x,
            fmt_y: fmt_axis_sales,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_tables(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = match self.session.last_error() {
            Some(err) => Text::from(format_load_error(err)),
            None => Text::from(page_text(&self.sections)),
        };
        let p = Paragraph::new(text)
            .block(Block::default().title("Views (PgUp/PgDn)").borders(Borders::ALL))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ tab  ↑/↓ select  c compare  R reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Tables of every section, skipped views noted in place.
fn page_text(sections: &[Section]) -> String {
    if sections.is_empty() {
        return "Nothing to show.".to_string();
    }
    let mut out = String::new();
    for section in sections {
        match &section.outcome {
            Ok(output) => {
                for table in output.tables() {
                    out.push_str(&format_table(&table));
                    out.push('\n');
                }
            }
            Err(err) => out.push_str(&format!("[{}] skipped: {err}\n\n", section.kind.title())),
        }
    }
    out
}

struct ChartSpec {
    series: Vec<ChartSeries>,
    x_label: &'static str,
    fmt_x: fn(f64) -> String,
}

fn legend_title(spec: &ChartSpec) -> String {
    let labels: Vec<&str> = spec.series.iter().map(|s| s.label.as_str()).collect();
    labels.join(" | ")
}

/// Fractional year for a `(year, month)` period, so periods plot on one axis.
fn period_x(year: i32, month: u32) -> f64 {
    year as f64 + (month.saturating_sub(1)) as f64 / 12.0
}

fn series(label: impl Into<String>, points: Vec<(f64, f64)>, idx: usize, markers: bool) -> ChartSeries {
    ChartSeries {
        label: label.into(),
        points,
        color: PALETTE[idx % PALETTE.len()],
        markers,
    }
}

/// Pick the chart for the current page from its computed sections.
fn chart_for_page(sections: &[Section]) -> Option<ChartSpec> {
    let outputs = || sections.iter().filter_map(Section::output);

    // Advanced: trend plus one line per compared store.
    if let Some(ViewOutput::MonthlyTrend(trend)) = outputs().find(|o| matches!(o, ViewOutput::MonthlyTrend(_))) {
        let mut all = Vec::new();
        let xs: Vec<f64> = trend.periods.iter().map(|p| period_x(p.year, p.month)).collect();
        all.push(series("total", xs.iter().copied().zip(trend.periods.iter().map(|p| p.sales)).collect(), 0, true));
        if let Some(fit) = &trend.fit {
            all.push(series("trend", xs.iter().copied().zip(fit.fitted.iter().copied()).collect(), 1, false));
        }
        if let Some(ViewOutput::StoreComparison(cmp)) =
            outputs().find(|o| matches!(o, ViewOutput::StoreComparison(_)))
        {
            for (i, store) in cmp.stores.iter().enumerate() {
                let points = cmp
                    .points
                    .iter()
                    .filter(|p| p.store_nbr == *store)
                    .map(|p| (period_x(p.year, p.month), p.sales))
                    .collect();
                all.push(series(format!("store {store}"), points, i + 2, false));
            }
        }
        return Some(ChartSpec {
            series: all,
            x_label: "period",
            fmt_x: fmt_axis_period,
        });
    }

    for output in outputs() {
        match output {
            ViewOutput::MonthlyAverages(m) if !m.months.is_empty() => {
                let points = m.months.iter().map(|p| (p.month as f64, p.mean_sales)).collect();
                return Some(ChartSpec {
                    series: vec![series("mean sales by month", points, 0, true)],
                    x_label: "month",
                    fmt_x: fmt_axis_month,
                });
            }
            ViewOutput::StoreDetail(d) => {
                let years = d.sales_by_year.as_ref()?;
                let points = years.iter().map(|y| (y.year as f64, y.value)).collect();
                return Some(ChartSpec {
                    series: vec![series(format!("store {} sales by year", d.store_nbr), points, 0, true)],
                    x_label: "year",
                    fmt_x: fmt_axis_year,
                });
            }
            ViewOutput::StateDetail(d) => {
                let pivot = d.month_year_sales.as_ref()?;
                let lines = pivot
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(j, year)| {
                        let points = pivot
                            .rows
                            .iter()
                            .enumerate()
                            .filter_map(|(i, month)| pivot.get(i, j).map(|v| (*month as f64, v)))
                            .collect();
                        series(year.to_string(), points, j, true)
                    })
                    .collect();
                return Some(ChartSpec {
                    series: lines,
                    x_label: "month",
                    fmt_x: fmt_axis_month,
                });
            }
            _ => {}
        }
    }
    None
}

fn fmt_axis_sales(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v.abs() >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

fn fmt_axis_month(v: f64) -> String {
    let name = month_name(v.round() as u32);
    name.chars().take(3).collect()
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_period(v: f64) -> String {
    let year = v.floor();
    let month = ((v - year) * 12.0).round() as u32 + 1;
    format!("{year:.0}-{month:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewKind;
    use crate::views::results::{MonthAverage, MonthlyAverages};

    #[test]
    fn axis_formatters() {
        assert_eq!(fmt_axis_sales(1_500.0), "1.5k");
        assert_eq!(fmt_axis_sales(2_500_000.0), "2.5M");
        assert_eq!(fmt_axis_month(12.0), "Dec");
        assert_eq!(fmt_axis_period(period_x(2016, 3)), "2016-03");
    }

    #[test]
    fn global_page_charts_monthly_averages() {
        let sections = vec![Section {
            kind: ViewKind::MonthlyAverages,
            outcome: Ok(ViewOutput::MonthlyAverages(MonthlyAverages {
                months: vec![
                    MonthAverage {
                        month: 1,
                        month_name: "January",
                        mean_sales: 10.0,
                    },
                    MonthAverage {
                        month: 2,
                        month_name: "February",
                        mean_sales: 12.0,
                    },
                ],
            })),
        }];
        let spec = chart_for_page(&sections).unwrap();
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].points, vec![(1.0, 10.0), (2.0, 12.0)]);
        assert!(page_text(&sections).contains("Average sales by month"));
    }
}
