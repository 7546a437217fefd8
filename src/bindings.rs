//! Python Bindings for PMI Neighbors

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::NeighborConfig;
use crate::error::PmiError;
use crate::neighbors::NeighborEngine;
use crate::snapshot;
use crate::stats::PairwiseCounter;

fn to_py_err(err: PmiError) -> PyErr {
    match err {
        PmiError::Config(_) | PmiError::InvalidMatrix(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn load_counter(counts_path: &str) -> PyResult<PairwiseCounter> {
    let snap = snapshot::load_counts(counts_path).map_err(to_py_err)?;
    PairwiseCounter::from_snapshot(snap).map_err(to_py_err)
}

// ============================================================================
// COUNTER
// ============================================================================

/// Read-only pairwise counter loaded from a JSON snapshot.
#[pyclass(name = "PairwiseCounter")]
struct PyPairwiseCounter {
    inner: PairwiseCounter,
}

#[pymethods]
impl PyPairwiseCounter {
    #[new]
    fn new(counts_path: &str) -> PyResult<Self> {
        Ok(Self {
            inner: load_counter(counts_path)?,
        })
    }

    /// (pair_count, count_1, count_2, total) or None
    fn get_stats(&self, key_1: &str, key_2: &str) -> Option<(f64, f64, f64, f64)> {
        self.inner
            .get_stats(key_1, key_2)
            .map(|s| (s.pair_count, s.count_1, s.count_2, s.total))
    }

    fn calculate_pmi(&self, key_1: &str, key_2: &str) -> Option<f64> {
        self.inner.calculate_pmi(key_1, key_2)
    }

    fn product_keys(&self) -> Vec<String> {
        self.inner.product_keys()
    }

    /// Top-K neighbors for every catalog key.
    #[pyo3(signature = (top_k = 10, workers = None))]
    fn top_k_neighbors(
        &self,
        py: Python<'_>,
        top_k: usize,
        workers: Option<usize>,
    ) -> PyResult<Vec<(String, Vec<String>)>> {
        let mut config = NeighborConfig {
            top_k,
            ..NeighborConfig::default()
        };
        if let Some(workers) = workers {
            config.workers = workers;
        }
        let engine = NeighborEngine::new(&self.inner, config).map_err(to_py_err)?;
        let neighbors = py.allow_threads(|| engine.compute_all()).map_err(to_py_err)?;
        Ok(neighbors.into_iter().collect())
    }
}

// ============================================================================
// MODULE EXPORT
// ============================================================================

#[pymodule]
fn pmi_neighbors(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyPairwiseCounter>()?;
    Ok(())
}
