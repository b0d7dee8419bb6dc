//! Ratatui-based terminal dashboard.
//!
//! A settings panel selects commodity, region, rolling window, z threshold,
//! and time window; the chart shows the price history with its rolling mean
//! and flagged points, next to the anomaly list. Below the chart, the latest
//! price of the commodity in every region is shown next to the session's
//! price alerts.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
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
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::AppConfig;
use crate::app::pipeline::{self, SeriesAnalysis};
use crate::domain::{
    AlertStatus, DetectorParams, MAX_WINDOW, MAX_Z_THRESHOLD, MIN_WINDOW, MIN_Z_THRESHOLD, PriceAlert,
    PriceLevel, PriceObservation, RegionPrice, Severity, SummaryFact,
};
use crate::engine::{
    DatasetStore, PriceDataset, distinct_commodities, distinct_regions, evaluate_alerts, latest_by_region,
    new_alert, summarize,
};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::PriceChart;

/// Time-window choices cycled by the settings panel (`None` = all data).
const TIME_WINDOWS: [Option<i64>; 6] = [None, Some(3), Some(6), Some(12), Some(24), Some(36)];

const FIELD_COUNT: usize = 5;

/// Start the TUI.
pub fn run(config: &AppConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config.data_path.clone());
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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
    store: DatasetStore,
    data_path: PathBuf,
    commodities: Vec<String>,
    regions: Vec<String>,
    commodity_idx: usize,
    region_idx: usize,
    params: DetectorParams,
    selected_field: usize,
    summary: Vec<SummaryFact>,
    analysis: Option<SeriesAnalysis>,
    regional: Vec<RegionPrice>,
    alerts: Vec<PriceAlert>,
    alert_statuses: Vec<AlertStatus>,
    /// Threshold being typed for a new alert.
    alert_input: Option<String>,
    status: String,
}

impl App {
    fn new(data_path: PathBuf) -> Self {
        let dataset = pipeline::load_dataset(&data_path);
        Self::with_dataset(data_path, dataset)
    }

    fn with_dataset(data_path: PathBuf, dataset: PriceDataset) -> Self {
        let mut app = Self {
            store: DatasetStore::new(dataset),
            data_path,
            commodities: Vec::new(),
            regions: Vec::new(),
            commodity_idx: 0,
            region_idx: 0,
            params: DetectorParams::default(),
            selected_field: 0,
            summary: Vec::new(),
            analysis: None,
            regional: Vec::new(),
            alerts: Vec::new(),
            alert_statuses: Vec::new(),
            alert_input: None,
            status: String::new(),
        };
        app.refresh_metadata();
        app.recompute();
        app.status = app.loaded_status();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.alert_input.is_some() {
            self.handle_alert_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('a') => self.begin_alert(),
            KeyCode::Char('x') => self.remove_alert(),
            _ => {}
        }
        false
    }

    /// Start typing a threshold for the selected pair, prefilled with its highest price.
    fn begin_alert(&mut self) {
        let Some(analysis) = &self.analysis else {
            self.status = "Select a commodity and region first.".to_string();
            return;
        };
        let Some((min, max)) = price_range(&analysis.series.records) else {
            self.status = "No prices to set an alert against.".to_string();
            return;
        };
        self.alert_input = Some(format!("{max:.2}"));
        self.status = format!("Current range {min:.2} - {max:.2}");
    }

    fn handle_alert_edit(&mut self, code: KeyCode) {
        let Some(input) = self.alert_input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.alert_input = None;
                self.status = "Alert cancelled.".to_string();
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => input.push(c),
            KeyCode::Enter => {
                let text = input.clone();
                self.alert_input = None;
                self.add_alert(&text);
            }
            _ => {}
        }
    }

    fn add_alert(&mut self, text: &str) {
        let Some(analysis) = &self.analysis else {
            return;
        };
        let today = chrono::Local::now().date_naive();
        let alert = text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|t| new_alert(&analysis.series.commodity, &analysis.series.region, t, today));
        self.status = match alert {
            Some(alert) => {
                let msg = format!("Alert added: {} / {} >= {:.2}", alert.commodity, alert.region, alert.threshold);
                self.alerts.push(alert);
                self.refresh_alerts();
                msg
            }
            None => format!("Invalid threshold: {text}"),
        };
    }

    /// Drop the most recently added alert.
    fn remove_alert(&mut self) {
        self.status = match self.alerts.pop() {
            Some(alert) => format!("Alert removed: {} / {}", alert.commodity, alert.region),
            None => "No alerts.".to_string(),
        };
        self.refresh_alerts();
    }

    fn refresh_alerts(&mut self) {
        self.alert_statuses = evaluate_alerts(&self.store.snapshot(), &self.alerts);
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => self.commodity_idx = cycle(self.commodity_idx, self.commodities.len(), delta),
            1 => self.region_idx = cycle(self.region_idx, self.regions.len(), delta),
            2 => self.params.window = step_window(self.params.window, delta),
            3 => self.params.z_threshold = step_z(self.params.z_threshold, delta),
            4 => self.params.time_window_months = step_time_window(self.params.time_window_months, delta),
            _ => return,
        }
        self.recompute();
        self.status = self.selection_status();
    }

    /// Re-read the CSV and swap it into the store.
    fn reload(&mut self) {
        let dataset = pipeline::load_dataset(&self.data_path);
        self.store.replace(dataset);
        self.refresh_metadata();
        self.recompute();
        self.status = format!("Reloaded. {}", self.loaded_status());
    }

    fn export(&mut self) {
        let Some(analysis) = &self.analysis else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        if analysis.series.records.is_empty() {
            self.status = "No price records to export.".to_string();
            return;
        }

        let today = chrono::Local::now().date_naive();
        let path = export_file_name(&analysis.series.commodity, &analysis.series.region, today);
        self.status = match crate::io::write_analysis_csv(
            Path::new(&path),
            &analysis.series.records,
            &analysis.flags,
        ) {
            Ok(()) => format!("Exported {path}"),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    /// Rebuild the selector lists, keeping the current names when still present.
    fn refresh_metadata(&mut self) {
        let dataset = self.store.snapshot();
        let commodity = self.commodities.get(self.commodity_idx).cloned();
        let region = self.regions.get(self.region_idx).cloned();

        self.commodities = distinct_commodities(&dataset);
        self.regions = distinct_regions(&dataset);
        self.summary = summarize(&dataset);
        self.commodity_idx = index_of(&self.commodities, commodity.as_deref());
        self.region_idx = index_of(&self.regions, region.as_deref());
    }

    fn recompute(&mut self) {
        let dataset = self.store.snapshot();
        self.alert_statuses = evaluate_alerts(&dataset, &self.alerts);
        self.regional = match self.commodities.get(self.commodity_idx) {
            Some(commodity) => latest_by_region(&dataset, commodity),
            None => Vec::new(),
        };

        let (Some(commodity), Some(region)) =
            (self.commodities.get(self.commodity_idx), self.regions.get(self.region_idx))
        else {
            self.analysis = None;
            return;
        };

        match pipeline::analyze(&dataset, commodity, region, &self.params) {
            Ok(analysis) => self.analysis = Some(analysis),
            Err(err) => {
                self.analysis = None;
                self.status = err.to_string();
            }
        }
    }

    fn loaded_status(&self) -> String {
        let rows = self.store.snapshot().len();
        if rows == 0 {
            format!("No data loaded from {}", self.data_path.display())
        } else {
            format!("{rows} rows from {}", self.data_path.display())
        }
    }

    fn selection_status(&self) -> String {
        match &self.analysis {
            Some(a) => format!(
                "{} / {}: {} records, {} anomalies",
                a.series.commodity,
                a.series.region,
                a.series.records.len(),
                a.report.points.len()
            ),
            None => "No selection.".to_string(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("fpa", Style::default().fg(Color::Cyan)),
            Span::raw(" food price anomaly tracker"),
        ]));

        let facts = if self.summary.is_empty() {
            "no data".to_string()
        } else {
            self.summary
                .iter()
                .map(|f| format!("{}: {}", f.label, f.value))
                .collect::<Vec<_>>()
                .join(" | ")
        };
        lines.push(Line::from(Span::styled(facts, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(38)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FIELD_COUNT as u16 + 2), Constraint::Min(0)])
            .split(columns[1]);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(columns[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main[1]);

        self.draw_chart(frame, main[0]);
        self.draw_regions(frame, bottom[0]);
        self.draw_alerts(frame, bottom[1]);
        self.draw_settings(frame, side[0]);
        self.draw_anomalies(frame, side[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match &self.analysis {
            Some(a) => format!("{} / {}", a.series.commodity, a.series.region),
            None => "Prices".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = self.analysis.as_ref().and_then(chart_data) else {
            let msg = Paragraph::new("No price records for this selection.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let unit = self
            .analysis
            .as_ref()
            .map(|a| a.series.unit.clone())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "price".to_string());
        let widget = PriceChart {
            prices: &data.prices,
            mean: &data.mean,
            high: &data.high,
            low: &data.low,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            y_label: unit,
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_price,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let commodity = self.commodities.get(self.commodity_idx).map_or("-", String::as_str);
        let region = self.regions.get(self.region_idx).map_or("-", String::as_str);
        let months = match self.params.time_window_months {
            Some(m) => format!("{m} months"),
            None => "all".to_string(),
        };

        let items = vec![
            ListItem::new(format!("Commodity: {commodity}")),
            ListItem::new(format!("Region: {region}")),
            ListItem::new(format!("Window: {}", self.params.window)),
            ListItem::new(format!("Z threshold: {:.1}", self.params.z_threshold)),
            ListItem::new(format!("Time window: {months}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_anomalies(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let points = self.analysis.as_ref().map(|a| a.report.points.as_slice()).unwrap_or(&[]);
        let title = format!("Anomalies ({})", points.len());

        let items: Vec<ListItem> = if points.is_empty() {
            vec![ListItem::new("none")]
        } else {
            points
                .iter()
                .rev()
                .map(|p| {
                    let severity = p.severity();
                    let style = match severity {
                        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        Severity::High => Style::default().fg(Color::Yellow),
                        Severity::Medium => Style::default(),
                    };
                    ListItem::new(format!(
                        "{} {:>9.2} z={:>+5.2} {}",
                        p.date,
                        p.price,
                        p.z_score,
                        severity.label()
                    ))
                    .style(style)
                })
                .collect()
        };

        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_regions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let commodity = self.commodities.get(self.commodity_idx).map_or("-", String::as_str);
        let title = format!("Latest {commodity} by region");

        let items: Vec<ListItem> = if self.regional.is_empty() {
            vec![ListItem::new("no data")]
        } else {
            self.regional
                .iter()
                .map(|r| {
                    ListItem::new(format!("{:<14} {:>9.2} {}", r.region, r.price, r.date))
                        .style(Style::default().fg(level_color(r.level)))
                })
                .collect()
        };

        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_alerts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("Alerts ({})", self.alert_statuses.len());

        let items: Vec<ListItem> = if self.alert_statuses.is_empty() {
            vec![ListItem::new("none (a to add)")]
        } else {
            self.alert_statuses
                .iter()
                .rev()
                .map(|s| {
                    let latest = s.latest.map_or("-".to_string(), |p| format!("{p:.2}"));
                    let style = if s.triggered {
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(format!(
                        "{} / {} >= {:.2} (now {latest})",
                        s.alert.commodity, s.alert.region, s.alert.threshold
                    ))
                    .style(style)
                })
                .collect()
        };

        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match &self.alert_input {
            Some(input) => format!("Alert threshold: {input}_  Enter add  Esc cancel"),
            None => "↑/↓ select  ←/→ adjust  a alert  x drop alert  r reload  e export  q quit".to_string(),
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart series for one analysis, with x as day numbers.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    prices: Vec<(f64, f64)>,
    mean: Vec<(f64, f64)>,
    high: Vec<(f64, f64)>,
    low: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_data(analysis: &SeriesAnalysis) -> Option<ChartData> {
    let records = &analysis.series.records;
    let first = records.first()?;
    let last = records.last()?;

    let prices: Vec<(f64, f64)> = records.iter().map(|o| (day_number(o.date), o.price)).collect();
    let mean: Vec<(f64, f64)> = analysis
        .rolling
        .iter()
        .map(|s| (day_number(s.date), s.mean))
        .collect();
    let (high, low): (Vec<_>, Vec<_>) = analysis
        .report
        .points
        .iter()
        .partition(|p| p.z_score >= 0.0);
    let high = high.into_iter().map(|p| (day_number(p.date), p.price)).collect();
    let low = low.into_iter().map(|p| (day_number(p.date), p.price)).collect();

    let (mut x0, mut x1) = (day_number(first.date), day_number(last.date));
    if x1 <= x0 {
        x0 -= 15.0;
        x1 += 15.0;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in prices.iter().chain(mean.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(y_max.abs() * 0.01).max(1e-6);

    Some(ChartData {
        prices,
        mean,
        high,
        low,
        x_bounds: [x0, x1],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn level_color(level: PriceLevel) -> Color {
    match level {
        PriceLevel::Critical => Color::Red,
        PriceLevel::High => Color::LightRed,
        PriceLevel::Medium => Color::Yellow,
        PriceLevel::Normal => Color::Green,
    }
}

/// Lowest and highest price of a series.
fn price_range(records: &[PriceObservation]) -> Option<(f64, f64)> {
    records.iter().map(|o| o.price).fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
}

fn day_number(d: NaiveDate) -> f64 {
    use chrono::Datelike;
    f64::from(d.num_days_from_ce())
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_price(v: f64) -> String {
    format!("{v:.0}")
}

/// `price-analysis-<commodity>-<region>-<date>.csv`, whitespace replaced.
fn export_file_name(commodity: &str, region: &str, date: NaiveDate) -> String {
    let clean = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("_");
    format!(
        "price-analysis-{}-{}-{}.csv",
        clean(commodity),
        clean(region),
        date.format("%Y-%m-%d")
    )
}

fn index_of(items: &[String], name: Option<&str>) -> usize {
    name.and_then(|n| items.iter().position(|i| i == n)).unwrap_or(0)
}

fn cycle(idx: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    if delta >= 0 { (idx + 1) % len } else { (idx + len - 1) % len }
}

fn step_window(window: usize, delta: i32) -> usize {
    let next = if delta >= 0 { window.saturating_add(1) } else { window.saturating_sub(1) };
    next.clamp(MIN_WINDOW, MAX_WINDOW)
}

fn step_z(z: f64, delta: i32) -> f64 {
    let next = z + if delta >= 0 { 0.1 } else { -0.1 };
    ((next * 10.0).round() / 10.0).clamp(MIN_Z_THRESHOLD, MAX_Z_THRESHOLD)
}

fn step_time_window(current: Option<i64>, delta: i32) -> Option<i64> {
    let idx = TIME_WINDOWS.iter().position(|w| *w == current).unwrap_or(0);
    TIME_WINDOWS[cycle(idx, TIME_WINDOWS.len(), delta)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> PriceDataset {
        let prices = [100.0, 100.0, 100.0, 100.0, 100.0, 200.0, 101.0];
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PriceObservation {
                date: NaiveDate::from_ymd_opt(2023, i as u32 + 1, 1).unwrap(),
                region: "St Petersburg".to_string(),
                commodity: "Milk".to_string(),
                price,
                unit: "RUB/l".to_string(),
            })
            .collect()
    }

    fn analysis() -> SeriesAnalysis {
        let params = DetectorParams { window: 6, ..DetectorParams::default() };
        pipeline::analyze(&dataset(), "Milk", "St Petersburg", &params).unwrap()
    }

    fn app() -> App {
        App::with_dataset(PathBuf::from("unused.csv"), dataset())
    }

    fn type_keys(app: &mut App, keys: &[KeyCode]) {
        for &key in keys {
            assert!(!app.handle_key(key));
        }
    }

    #[test]
    fn chart_data_splits_high_and_low_points() {
        let a = analysis();
        let data = chart_data(&a).unwrap();
        assert_eq!(data.prices.len(), 7);
        assert_eq!(data.high.len() + data.low.len(), a.report.points.len());
        assert!(data.x_bounds[0] < data.x_bounds[1]);
        assert!(data.y_bounds[0] < 100.0 && data.y_bounds[1] > 200.0);
    }

    #[test]
    fn steppers_respect_bounds() {
        assert_eq!(step_window(MAX_WINDOW, 1), MAX_WINDOW);
        assert_eq!(step_window(MIN_WINDOW, -1), MIN_WINDOW);
        assert!((step_z(2.0, 1) - 2.1).abs() < 1e-12);
        assert_eq!(step_z(MIN_Z_THRESHOLD, -1), MIN_Z_THRESHOLD);
        assert_eq!(step_time_window(None, -1), Some(36));
        assert_eq!(step_time_window(Some(36), 1), None);
        assert_eq!(cycle(0, 0, 1), 0);
        assert_eq!(cycle(0, 3, -1), 2);
    }

    #[test]
    fn export_name_has_no_spaces() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            export_file_name("Milk", "St Petersburg", d),
            "price-analysis-Milk-St_Petersburg-2024-05-01.csv"
        );
    }

    #[test]
    fn alert_prefills_series_maximum() {
        let mut app = app();
        type_keys(&mut app, &[KeyCode::Char('a')]);
        assert_eq!(app.alert_input.as_deref(), Some("200.00"));
        assert_eq!(app.status, "Current range 100.00 - 200.00");

        type_keys(&mut app, &[KeyCode::Enter]);
        assert!(app.alert_input.is_none());
        assert_eq!(app.alerts.len(), 1);
        assert_eq!(app.alerts[0].threshold, 200.0);
        assert_eq!(app.alert_statuses[0].latest, Some(101.0));
        assert!(!app.alert_statuses[0].triggered);
    }

    #[test]
    fn typed_threshold_below_latest_triggers() {
        let mut app = app();
        let mut keys = vec![KeyCode::Char('a')];
        keys.extend(std::iter::repeat_n(KeyCode::Backspace, 6));
        keys.extend([KeyCode::Char('9'), KeyCode::Char('5'), KeyCode::Char('z'), KeyCode::Enter]);
        type_keys(&mut app, &keys);
        assert_eq!(app.alerts[0].threshold, 95.0);
        assert!(app.alert_statuses[0].triggered);
    }

    #[test]
    fn escape_cancels_alert_without_quitting() {
        let mut app = app();
        type_keys(&mut app, &[KeyCode::Char('a'), KeyCode::Esc]);
        assert!(app.alert_input.is_none());
        assert!(app.alerts.is_empty());
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn empty_threshold_is_rejected_and_alerts_can_be_dropped() {
        let mut app = app();
        let mut keys = vec![KeyCode::Char('a')];
        keys.extend(std::iter::repeat_n(KeyCode::Backspace, 6));
        keys.push(KeyCode::Enter);
        type_keys(&mut app, &keys);
        assert!(app.alerts.is_empty());
        assert_eq!(app.status, "Invalid threshold: ");

        type_keys(&mut app, &[KeyCode::Char('a'), KeyCode::Enter, KeyCode::Char('x')]);
        assert!(app.alerts.is_empty());
        assert!(app.alert_statuses.is_empty());
        type_keys(&mut app, &[KeyCode::Char('x')]);
        assert_eq!(app.status, "No alerts.");
    }

    #[test]
    fn regional_panel_follows_selected_commodity() {
        let app = app();
        assert_eq!(app.regional.len(), 1);
        assert_eq!(app.regional[0].region, "St Petersburg");
        assert_eq!(app.regional[0].price, 101.0);
        assert_eq!(level_color(app.regional[0].level), Color::Green);
    }

    #[test]
    fn price_range_of_empty_series_is_none() {
        assert_eq!(price_range(&[]), None);
        assert_eq!(price_range(&analysis().series.records), Some((100.0, 200.0)));
    }

    #[test]
    fn axis_labels_are_months() {
        let d = NaiveDate::from_ymd_opt(2023, 7, 15).unwrap();
        assert_eq!(fmt_axis_date(day_number(d)), "2023-07");
    }
}
