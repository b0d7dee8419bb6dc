//! The price table and its process-wide snapshot holder.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::domain::PriceObservation;

/// Immutable table of price observations.
///
/// Rows keep the order they were ingested in. Duplicate `(date, region,
/// commodity)` keys are legal and are never merged. There are no mutating
/// methods: a refresh builds a new dataset and swaps it in via [`DatasetStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceDataset {
    rows: Vec<PriceObservation>,
}

impl PriceDataset {
    pub fn new(rows: Vec<PriceObservation>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[PriceObservation] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceObservation> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<PriceObservation> for PriceDataset {
    fn from_iter<I: IntoIterator<Item = PriceObservation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PriceDataset {
    type Item = &'a PriceObservation;
    type IntoIter = std::slice::Iter<'a, PriceObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Holds the current dataset snapshot.
///
/// Readers take an `Arc` and query it without holding the lock. `replace`
/// installs a whole new dataset; queries already running keep the snapshot
/// they started with.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Arc<PriceDataset>>,
}

impl DatasetStore {
    pub fn new(dataset: PriceDataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
        }
    }

    /// The dataset visible to new queries.
    pub fn snapshot(&self) -> Arc<PriceDataset> {
        // The guarded value is a single `Arc`, so a poisoned lock still holds a
        // complete dataset.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Swap in a new dataset and return the previous one.
    pub fn replace(&self, dataset: PriceDataset) -> Arc<PriceDataset> {
        let next = Arc::new(dataset);
        let rows = next.len();
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *guard, next);
        info!(rows, previous_rows = previous.len(), "dataset snapshot replaced");
        previous
    }
}
