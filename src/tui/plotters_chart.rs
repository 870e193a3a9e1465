//! Multi-series sales line chart, drawn by Plotters into a Ratatui buffer
//! through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast palette for terminal rendering.
pub const PALETTE: [RGBColor; 6] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 255, 0),
    RGBColor(0, 255, 0),
    RGBColor(255, 0, 255),
    RGBColor(255, 128, 0),
    RGBColor(128, 160, 255),
];

/// One polyline, optionally with a dot at every observation.
#[derive(Clone)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub markers: bool,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SalesPlottersChart<'a> {
    pub series: &'a [ChartSeries],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SalesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a mesh this small.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 9)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for s in self.series {
                chart.draw_series(LineSeries::new(s.points.iter().copied(), &s.color))?;
                // `Pixel` rather than `Circle`: the backend maps circle radii
                // into canvas units incorrectly, producing huge circles.
                if s.markers {
                    chart.draw_series(s.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Padded bounds over every point of every series.
pub fn series_bounds(series: &[ChartSeries]) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.points.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    if x_max <= x_min {
        x_min -= 0.5;
        x_max += 0.5;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: Vec<(f64, f64)>) -> ChartSeries {
        ChartSeries {
            label: "s".into(),
            points,
            color: PALETTE[0],
            markers: false,
        }
    }

    #[test]
    fn bounds_cover_all_series_with_padding() {
        let (x, y) = series_bounds(&[series(vec![(1.0, 10.0), (3.0, 20.0)]), series(vec![(2.0, 0.0)])]).unwrap();
        assert_eq!(x, [1.0, 3.0]);
        assert!((y[0] + 1.0).abs() < 1e-9);
        assert!((y[1] - 21.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let (x, y) = series_bounds(&[series(vec![(5.0, 7.0)])]).unwrap();
        assert!(x[1] > x[0]);
        assert!(y[1] > y[0]);
        assert!(series_bounds(&[]).is_none());
    }
}
