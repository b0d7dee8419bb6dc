//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized

use crate::domain::{AnomalyReport, PriceSeries, RegionPrice, SummaryFact};

/// A titled, one-per-line list (commodities, regions).
pub fn format_list(title: &str, items: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title} ({}):\n", items.len()));
    if items.is_empty() {
        out.push_str("  (no data)\n");
    }
    for item in items {
        out.push_str(&format!("  {item}\n"));
    }
    out
}

/// Summary facts, one aligned line each.
pub fn format_summary(facts: &[SummaryFact]) -> String {
    if facts.is_empty() {
        return "No data loaded.\n".to_string();
    }
    let width = facts.iter().map(|f| f.label.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for fact in facts {
        out.push_str(&format!("{:<width$}  {}\n", fact.label, fact.value));
    }
    out
}

/// Price history table.
pub fn format_price_series(series: &PriceSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} / {} ({}) ===\n",
        series.commodity,
        series.region,
        if series.unit.is_empty() { "-" } else { series.unit.as_str() },
    ));
    if series.records.is_empty() {
        out.push_str("No price records.\n");
        return out;
    }

    out.push_str(&format!("{:<10} {:>12} {:<10}\n", "date", "price", "unit"));
    out.push_str(&format!("{:-<10} {:-<12} {:-<10}\n", "", "", ""));
    for o in &series.records {
        out.push_str(
            format!("{:<10} {:>12.2} {:<10}\n", o.date, o.price, truncate(&o.unit, 10))
                .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Anomaly table for one pair.
pub fn format_anomaly_report(report: &AnomalyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Anomalies: {} / {} | window={} | |z| >= {:.2} ===\n",
        report.commodity, report.region, report.window, report.threshold
    ));
    if report.points.is_empty() {
        out.push_str("No anomalies detected.\n");
        return out;
    }
    out.push_str(&anomaly_rows(report));
    out
}

/// Scan results: one block per flagged pair.
pub fn format_scan(reports: &[AnomalyReport]) -> String {
    if reports.is_empty() {
        return "No anomalies detected in any series.\n".to_string();
    }

    let total: usize = reports.iter().map(|r| r.points.len()).sum();
    let mut out = String::new();
    out.push_str(&format!(
        "{total} anomal{} across {} series (window={}, |z| >= {:.2})\n",
        if total == 1 { "y" } else { "ies" },
        reports.len(),
        reports[0].window,
        reports[0].threshold,
    ));
    for report in reports {
        out.push('\n');
        out.push_str(&format!("{} / {}\n", report.commodity, report.region));
        out.push_str(&anomaly_rows(report));
    }
    out
}

/// Latest regional prices for one commodity, with their min/max band.
pub fn format_latest(commodity: &str, rows: &[RegionPrice]) -> String {
    let mut out = format!("=== Latest {commodity} prices by region ===\n");
    if rows.is_empty() {
        out.push_str("No price records.\n");
        return out;
    }

    out.push_str(&format!("{:<16} {:<10} {:>12} {:<10} {:>5} {:<8}\n", "region", "date", "price", "unit", "rel", "level"));
    out.push_str(&format!("{:-<16} {:-<10} {:-<12} {:-<10} {:-<5} {:-<8}\n", "", "", "", "", "", ""));
    for r in rows {
        out.push_str(
            format!(
                "{:<16} {:<10} {:>12.2} {:<10} {:>5.2} {:<8}\n",
                truncate(&r.region, 16),
                r.date,
                r.price,
                truncate(&r.unit, 10),
                r.relative,
                r.level.label()
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn anomaly_rows(report: &AnomalyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:>12} {:>8} {:<4} {:<8}\n", "date", "price", "z", "dir", "severity").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<10} {:-<12} {:-<8} {:-<4} {:-<8}\n", "", "", "", "", ""));
    for p in &report.points {
        let dir = if p.z_score >= 0.0 { "up" } else { "down" };
        out.push_str(
            format!(
                "{:<10} {:>12.2} {:>8.2} {:<4} {:<8}\n",
                p.date,
                p.price,
                p.z_score,
                dir,
                p.severity().label()
            )
            .trim_end(),
        );
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
    use crate::domain::{AnomalyPoint, PriceObservation};
    use chrono::NaiveDate;

    fn report(points: Vec<AnomalyPoint>) -> AnomalyReport {
        AnomalyReport {
            region: "Moscow".to_string(),
            commodity: "Bread".to_string(),
            window: 12,
            threshold: 2.0,
            points,
        }
    }

    #[test]
    fn summary_aligns_labels() {
        let facts = vec![
            SummaryFact::new("Latest data", "2024-05-01"),
            SummaryFact::new("Regions", "5"),
        ];
        assert_eq!(format_summary(&facts), "Latest data  2024-05-01\nRegions      5\n");
        assert_eq!(format_summary(&[]), "No data loaded.\n");
    }

    #[test]
    fn price_table_lists_every_record() {
        let series = PriceSeries {
            region: "Kazan".to_string(),
            commodity: "Milk".to_string(),
            unit: "RUB/l".to_string(),
            records: vec![PriceObservation {
                date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                region: "Kazan".to_string(),
                commodity: "Milk".to_string(),
                price: 80.5,
                unit: "RUB/l".to_string(),
            }],
        };
        let text = format_price_series(&series);
        assert!(text.starts_with("=== Milk / Kazan (RUB/l) ===\n"));
        assert!(text.contains("2023-01-01        80.50 RUB/l\n"));
    }

    #[test]
    fn anomaly_table_marks_direction() {
        let text = format_anomaly_report(&report(vec![
            AnomalyPoint {
                date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                price: 200.0,
                z_score: 2.04,
            },
            AnomalyPoint {
                date: NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
                price: 10.0,
                z_score: -3.5,
            },
        ]));
        assert!(text.contains("2023-06-01       200.00     2.04 up   High\n"));
        assert!(text.contains("2023-09-01        10.00    -3.50 down Critical\n"));
        assert!(format_anomaly_report(&report(Vec::new())).ends_with("No anomalies detected.\n"));
    }

    #[test]
    fn scan_summary_counts_points() {
        let point = AnomalyPoint {
            date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            price: 200.0,
            z_score: 2.04,
        };
        let text = format_scan(&[report(vec![point.clone()]), report(vec![point.clone(), point])]);
        assert!(text.starts_with("3 anomalies across 2 series (window=12, |z| >= 2.00)\n"));
        assert_eq!(format_scan(&[]), "No anomalies detected in any series.\n");
    }

    #[test]
    fn latest_table_shows_level() {
        let rows = vec![RegionPrice {
            region: "Kazan".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            price: 60.0,
            unit: "RUB/kg".to_string(),
            relative: 1.0,
            level: crate::domain::PriceLevel::Critical,
        }];
        let text = format_latest("Bread", &rows);
        assert!(text.starts_with("=== Latest Bread prices by region ===\n"));
        assert!(text.contains("Kazan            2024-01-02        60.00 RUB/kg      1.00 Critical\n"));
        assert!(format_latest("Eggs", &[]).ends_with("No price records.\n"));
    }

    #[test]
    fn list_reports_empty_state() {
        assert_eq!(format_list("Regions", &[]), "Regions (0):\n  (no data)\n");
    }
}
