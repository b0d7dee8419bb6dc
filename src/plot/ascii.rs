//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed prices: `o`
//! - rolling mean: `-`
//! - anomalies: `^` (above the mean) and `v` (below)

use chrono::{Datelike, NaiveDate};

use crate::domain::{AnomalyPoint, PriceObservation, RollingStat};

/// Render a price series with its rolling mean and flagged points.
pub fn render_series_plot(
    records: &[PriceObservation],
    rolling: &[RollingStat],
    anomalies: &[AnomalyPoint],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((d_min, d_max)) = date_range(records) else {
        return "Plot: no data\n".to_string();
    };
    let (y_min, y_max) = price_range(records, rolling).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let (x0, x1) = (day_number(d_min), day_number(d_max));

    let mut grid = vec![vec![' '; width]; height];

    // Mean first so observations overlay it.
    for s in rolling {
        let x = map_x(day_number(s.date), x0, x1, width);
        let y = map_y(s.mean, y_min, y_max, height);
        grid[y][x] = '-';
    }
    for o in records {
        let x = map_x(day_number(o.date), x0, x1, width);
        let y = map_y(o.price, y_min, y_max, height);
        grid[y][x] = 'o';
    }
    for a in anomalies {
        let x = map_x(day_number(a.date), x0, x1, width);
        let y = map_y(a.price, y_min, y_max, height);
        grid[y][x] = if a.z_score >= 0.0 { '^' } else { 'v' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{d_min}, {d_max}] | price=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        let line: String = row.into_iter().collect();
        out.push('|');
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push('\n');
    out.push_str("Legend: o price  - rolling mean  ^ high anomaly  v low anomaly\n");
    out
}

fn day_number(d: NaiveDate) -> f64 {
    f64::from(d.num_days_from_ce())
}

fn date_range(records: &[PriceObservation]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|o| o.date).min()?;
    let max = records.iter().map(|o| o.date).max()?;
    Some((min, max))
}

fn price_range(records: &[PriceObservation], rolling: &[RollingStat]) -> Option<(f64, f64)> {
    let values = records
        .iter()
        .map(|o| o.price)
        .chain(rolling.iter().map(|s| s.mean))
        .filter(|v| v.is_finite());

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

fn pad_range(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let span = hi - lo;
    if span.abs() < 1e-12 {
        let pad = lo.abs().max(1.0) * frac;
        return (lo - pad, hi + pad);
    }
    (lo - span * frac, hi + span * frac)
}

fn map_x(x: f64, x0: f64, x1: f64, width: usize) -> usize {
    if (x1 - x0).abs() < 1e-12 {
        return width / 2;
    }
    let u = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y0: f64, y1: f64, height: usize) -> usize {
    if !y.is_finite() || (y1 - y0).abs() < 1e-12 {
        return height / 2;
    }
    let u = ((y - y0) / (y1 - y0)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    height - 1 - (u * (height as f64 - 1.0)).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(month: u32, price: f64) -> PriceObservation {
        PriceObservation {
            date: NaiveDate::from_ymd_opt(2023, month, 1).unwrap(),
            region: "Moscow".to_string(),
            commodity: "Bread".to_string(),
            price,
            unit: "RUB/kg".to_string(),
        }
    }

    #[test]
    fn empty_series_renders_placeholder() {
        assert_eq!(render_series_plot(&[], &[], &[], 40, 10), "Plot: no data\n");
    }

    #[test]
    fn plot_marks_anomalies_and_has_fixed_height() {
        let records = vec![obs(1, 100.0), obs(2, 100.0), obs(3, 100.0), obs(4, 200.0)];
        let anomalies = vec![AnomalyPoint {
            date: records[3].date,
            price: 200.0,
            z_score: 2.5,
        }];
        let text = render_series_plot(&records, &[], &anomalies, 40, 10);
        let lines: Vec<&str> = text.lines().collect();
        // header + rows + axis + legend
        assert_eq!(lines.len(), 1 + 10 + 1 + 1);
        // The top row holds the maximum price at the right edge.
        assert!(lines[1].ends_with('^'));
        let observed: usize = lines[1..11].iter().map(|l| l.matches('o').count()).sum();
        assert_eq!(observed, 3);
    }

    #[test]
    fn map_y_puts_high_values_on_top() {
        assert_eq!(map_y(10.0, 0.0, 10.0, 5), 0);
        assert_eq!(map_y(0.0, 0.0, 10.0, 5), 4);
        assert_eq!(map_x(5.0, 5.0, 5.0, 10), 5);
    }
}
