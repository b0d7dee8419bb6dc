//! Series selection and time-window truncation.

use chrono::TimeDelta;

use crate::domain::PriceObservation;
use crate::engine::PriceDataset;

/// Days per month used by the time window (not calendar months).
pub const DAYS_PER_MONTH: i64 = 30;

/// Rows for one `(commodity, region)` pair, ascending by date.
///
/// Matching is exact and case-sensitive. Rows sharing a date keep their dataset
/// order. No match is an empty result, not an error.
pub fn select(dataset: &PriceDataset, commodity: &str, region: &str) -> Vec<PriceObservation> {
    let mut series: Vec<PriceObservation> = dataset
        .iter()
        .filter(|o| o.commodity == commodity && o.region == region)
        .cloned()
        .collect();
    // `sort_by_key` is stable.
    series.sort_by_key(|o| o.date);
    series
}

/// Keep the observations within `months * 30` days of the series' own latest date.
///
/// `None`, zero, or negative `months` returns the series unchanged, as does an
/// empty series. A cutoff that falls outside the representable date range keeps
/// everything.
pub fn apply_time_window(series: Vec<PriceObservation>, months: Option<i64>) -> Vec<PriceObservation> {
    let Some(months) = months.filter(|m| *m > 0) else {
        return series;
    };
    let Some(max_date) = series.iter().map(|o| o.date).max() else {
        return series;
    };

    let cutoff = months
        .checked_mul(DAYS_PER_MONTH)
        .and_then(TimeDelta::try_days)
        .and_then(|span| max_date.checked_sub_signed(span));
    let Some(cutoff) = cutoff else {
        return series;
    };

    series.into_iter().filter(|o| o.date >= cutoff).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(date: &str, commodity: &str, region: &str, price: f64) -> PriceObservation {
        PriceObservation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            region: region.to_string(),
            commodity: commodity.to_string(),
            price,
            unit: "RUB/kg".to_string(),
        }
    }

    fn dataset() -> PriceDataset {
        PriceDataset::new(vec![
            row("2023-03-01", "Bread", "Moscow", 3.0),
            row("2023-01-01", "Bread", "Moscow", 1.0),
            row("2023-02-01", "Milk", "Moscow", 90.0),
            row("2023-02-01", "Bread", "Kazan", 50.0),
            row("2023-02-01", "Bread", "Moscow", 2.0),
            row("2023-02-01", "Bread", "Moscow", 2.5),
        ])
    }

    #[test]
    fn select_filters_exactly_and_sorts_stably() {
        let series = select(&dataset(), "Bread", "Moscow");
        let prices: Vec<f64> = series.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn select_is_case_sensitive_and_untrimmed() {
        let ds = dataset();
        assert!(select(&ds, "bread", "Moscow").is_empty());
        assert!(select(&ds, "Bread ", "Moscow").is_empty());
        assert!(select(&ds, "Bread", "Novosibirsk").is_empty());
    }

    #[test]
    fn select_on_empty_dataset_is_empty() {
        assert!(select(&PriceDataset::empty(), "Bread", "Moscow").is_empty());
    }

    #[test]
    fn select_keeps_duplicate_keys() {
        let series = select(&dataset(), "Bread", "Moscow");
        let same_day = series
            .iter()
            .filter(|o| o.date == NaiveDate::from_ymd_opt(2023, 2, 1).unwrap())
            .count();
        assert_eq!(same_day, 2);
    }

    #[test]
    fn time_window_without_positive_months_is_identity() {
        let series = select(&dataset(), "Bread", "Moscow");
        assert_eq!(apply_time_window(series.clone(), None), series);
        assert_eq!(apply_time_window(series.clone(), Some(0)), series);
        assert_eq!(apply_time_window(series.clone(), Some(-3)), series);
        assert!(apply_time_window(Vec::new(), Some(3)).is_empty());
    }

    #[test]
    fn time_window_uses_thirty_day_months_from_series_max() {
        let series = vec![
            row("2023-01-01", "Bread", "Moscow", 1.0),
            row("2023-03-01", "Bread", "Moscow", 2.0),
            row("2023-03-02", "Bread", "Moscow", 3.0),
            row("2023-04-01", "Bread", "Moscow", 4.0),
        ];
        // 2023-04-01 minus 30 days is 2023-03-02 (inclusive).
        let kept = apply_time_window(series.clone(), Some(1));
        let prices: Vec<f64> = kept.iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![3.0, 4.0]);

        // 60 days back is 2023-01-31, so January drops.
        let kept = apply_time_window(series, Some(2));
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|o| o.date >= NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()));
    }

    #[test]
    fn time_window_always_keeps_latest_observation() {
        let series = vec![
            row("2020-01-01", "Bread", "Moscow", 1.0),
            row("2023-06-15", "Bread", "Moscow", 2.0),
        ];
        let kept = apply_time_window(series, Some(1));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].price, 2.0);
    }

    #[test]
    fn huge_time_window_keeps_everything() {
        let series = select(&dataset(), "Bread", "Moscow");
        assert_eq!(apply_time_window(series.clone(), Some(i64::MAX)), series);
    }
}
