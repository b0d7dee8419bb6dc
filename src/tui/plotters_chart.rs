//! Plotters-powered price chart widget for Ratatui.
//!
//! Plotters gives us axis + tick rendering for free; the output is drawn into
//! the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// only draws. X values are day numbers (days since the common era).
pub struct PriceChart<'a> {
    /// Observed prices, in date order.
    pub prices: &'a [(f64, f64)],
    /// Rolling mean at each eligible position.
    pub mean: &'a [(f64, f64)],
    /// Flagged points above the rolling mean.
    pub high: &'a [(f64, f64)],
    /// Flagged points below the rolling mean.
    pub low: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: String,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a very small area.
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
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let price_color = WHITE;
            let mean_color = RGBColor(0, 255, 255); // cyan
            let high_color = RGBColor(255, 0, 0); // red
            let low_color = RGBColor(0, 255, 0); // green

            chart.draw_series(LineSeries::new(self.mean.iter().copied(), &mean_color))?;
            chart.draw_series(LineSeries::new(self.prices.iter().copied(), &price_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a colored
            // `Pixel` draws a clean dot on top of the price line.
            chart.draw_series(self.high.iter().map(|&(x, y)| Pixel::new((x, y), high_color)))?;
            chart.draw_series(self.low.iter().map(|&(x, y)| Pixel::new((x, y), low_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
