//! Dataset-wide metadata: distinct keys and dashboard summary facts.
//!
//! Always computed over the full dataset, never a filtered series.

use std::collections::BTreeSet;

use crate::domain::SummaryFact;
use crate::engine::PriceDataset;

/// Sorted, de-duplicated commodity names.
pub fn distinct_commodities(dataset: &PriceDataset) -> Vec<String> {
    distinct(dataset, |o| &o.commodity)
}

/// Sorted, de-duplicated region names.
pub fn distinct_regions(dataset: &PriceDataset) -> Vec<String> {
    distinct(dataset, |o| &o.region)
}

/// Latest date, commodity count, region count, in that order.
///
/// An empty dataset has no facts.
pub fn summarize(dataset: &PriceDataset) -> Vec<SummaryFact> {
    let Some(latest) = dataset.iter().map(|o| o.date).max() else {
        return Vec::new();
    };

    vec![
        SummaryFact::new("Latest data", latest.format("%Y-%m-%d")),
        SummaryFact::new("Commodities", distinct_commodities(dataset).len()),
        SummaryFact::new("Regions", distinct_regions(dataset).len()),
    ]
}

fn distinct<F>(dataset: &PriceDataset, key: F) -> Vec<String>
where
    F: Fn(&crate::domain::PriceObservation) -> &String,
{
    dataset
        .iter()
        .map(|o| key(o).as_str())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceObservation;
    use chrono::NaiveDate;

    fn row(date: (i32, u32, u32), commodity: &str, region: &str) -> PriceObservation {
        PriceObservation {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            region: region.to_string(),
            commodity: commodity.to_string(),
            price: 1.0,
            unit: "RUB/kg".to_string(),
        }
    }

    #[test]
    fn empty_dataset_has_no_metadata() {
        let ds = PriceDataset::empty();
        assert!(distinct_commodities(&ds).is_empty());
        assert!(distinct_regions(&ds).is_empty());
        assert!(summarize(&ds).is_empty());
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let ds = PriceDataset::new(vec![
            row((2023, 1, 1), "Milk", "Moscow"),
            row((2023, 1, 1), "Bread", "Kazan"),
            row((2023, 2, 1), "Milk", "Kazan"),
            row((2023, 2, 1), "bread", "Moscow"),
        ]);
        assert_eq!(distinct_commodities(&ds), vec!["Bread", "Milk", "bread"]);
        assert_eq!(distinct_regions(&ds), vec!["Kazan", "Moscow"]);
    }

    #[test]
    fn summary_has_three_facts_in_fixed_order() {
        let ds = PriceDataset::new(vec![
            row((2024, 3, 1), "Milk", "Moscow"),
            row((2024, 5, 9), "Bread", "Kazan"),
            row((2023, 12, 1), "Milk", "Kazan"),
        ]);
        let facts = summarize(&ds);
        assert_eq!(
            facts,
            vec![
                SummaryFact::new("Latest data", "2024-05-09"),
                SummaryFact::new("Commodities", "2"),
                SummaryFact::new("Regions", "2"),
            ]
        );
    }
}
