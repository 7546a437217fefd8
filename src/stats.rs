//! Pair statistics over the sparse count store.

use crate::csr::SparseCountStore;
use crate::error::PmiError;
use crate::pmi;
use crate::snapshot::CountsSnapshot;

/// The four scalars PMI is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub pair_count: f64,
    pub count_1: f64,
    pub count_2: f64,
    pub total: f64,
}

/// Answers pair statistics queries by external key.
#[derive(Debug, Clone)]
pub struct PairwiseCounter {
    store: SparseCountStore,
}

impl PairwiseCounter {
    pub fn new(store: SparseCountStore) -> Self {
        Self { store }
    }

    pub fn from_snapshot(snapshot: CountsSnapshot) -> Result<Self, PmiError> {
        SparseCountStore::from_snapshot(snapshot).map(Self::new)
    }

    pub fn store(&self) -> &SparseCountStore {
        &self.store
    }

    /// Statistics for `(key_1, key_2)`.
    ///
    /// `None` when either key is unknown or either marginal is absent or zero.
    /// An unobserved pair is a valid zero count.
    pub fn get_stats(&self, key_1: &str, key_2: &str) -> Option<Stats> {
        let index_1 = self.store.index_of(key_1)?;
        let index_2 = self.store.index_of(key_2)?;

        let pair_count = self.store.cell_value(index_1, index_2).unwrap_or(0.0);
        let count_1 = self.store.cell_value(index_1, index_1).unwrap_or(0.0);
        let count_2 = self.store.cell_value(index_2, index_2).unwrap_or(0.0);

        if count_1 == 0.0 || count_2 == 0.0 {
            return None;
        }

        Some(Stats {
            pair_count,
            count_1,
            count_2,
            total: self.store.total(),
        })
    }

    /// PMI of `(key_1, key_2)`, `None` when the stats are absent.
    pub fn calculate_pmi(&self, key_1: &str, key_2: &str) -> Option<f64> {
        self.get_stats(key_1, key_2).map(|stats| pmi::pmi(&stats))
    }

    /// Every catalog key except the total key, in snapshot key order.
    pub fn product_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .iter()
            .filter(|k| k.as_str() != self.store.total_key())
            .cloned()
            .collect()
    }
}
