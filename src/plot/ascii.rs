//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid; the same input always renders the same text.
//!
//! Glyphs:
//! - observed periods: `o`
//! - trend line: `-`
//! - horizontal bars: `#`

/// Render a period series (x = position) with an optional trend overlay.
pub fn render_series_plot(values: &[f64], trend: Option<&[f64]>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(values, trend).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_max = values.len().max(trend.map_or(0, <[f64]>::len)).saturating_sub(1).max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    // Trend first, so observations overlay it.
    if let Some(trend) = trend {
        let mut prev = None;
        for (i, &y) in trend.iter().enumerate() {
            let x = map_x(i as f64, x_max, width);
            let yy = map_y(y, y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, yy, '-'),
                None => grid[yy][x] = '-',
            }
            prev = Some((x, yy));
        }
    }

    for (i, &y) in values.iter().enumerate() {
        let x = map_x(i as f64, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: periods={} | sales=[{y_min:.2}, {y_max:.2}]\n",
        values.len()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Horizontal bar chart; bars scale to the largest positive value.
pub fn render_bar_chart(items: &[(String, f64)], width: usize) -> String {
    let label_width = items
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let bar_width = width.max(10);
    let max = items.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in items {
        let len = if max > 0.0 && *value > 0.0 {
            ((value / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        let line = format!(
            "{:<label_width$} |{} {value:.2}",
            clip(label, label_width),
            "#".repeat(len)
        );
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn y_range(values: &[f64], trend: Option<&[f64]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in values.iter().chain(trend.unwrap_or(&[])) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_plot_golden_snapshot_small() {
        let values = [100.0, 150.0, 200.0];
        let txt = render_series_plot(&values, Some(&values), 12, 5);
        let expected = concat!(
            "Plot: periods=3 | sales=[95.00, 205.00]\n",
            "          -o\n",
            "        --  \n",
            "     -o-    \n",
            "  ---       \n",
            "o-          \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_point_does_not_panic() {
        let txt = render_series_plot(&[42.0], None, 10, 5);
        assert_eq!(txt.lines().count(), 6);
        assert!(txt.contains('o'));
    }

    #[test]
    fn bar_chart_scales_to_max() {
        let items = vec![("EGGS".to_string(), 50.0), ("GROCERY I".to_string(), 100.0)];
        let txt = render_bar_chart(&items, 10);
        assert_eq!(
            txt,
            "EGGS      |##### 50.00\nGROCERY I |########## 100.00\n"
        );
    }
}
