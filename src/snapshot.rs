//! Counter snapshots and neighbor output as JSON.
//!
//! The snapshot layout mirrors a compressed-row matrix dump:
//! `{"counts_matrix": {"data", "indices", "indptr", "shape"}, "index_mapper", "total_key"}`.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PmiError;
use crate::neighbors::NeighborMap;

/// Raw compressed-row arrays of the pairwise count matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    /// Non-zero cell values, parallel to `indices`.
    pub data: Vec<f64>,
    /// Column index of each stored cell.
    pub indices: Vec<usize>,
    /// Row start offsets, length `rows + 1`.
    pub indptr: Vec<usize>,
    /// `(rows, cols)`; must be square.
    pub shape: (usize, usize),
}

/// Serializable record a [`SparseCountStore`](crate::csr::SparseCountStore) is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountsSnapshot {
    pub counts_matrix: MatrixSnapshot,
    /// Key to row/column index. Insertion order is the candidate order of a sweep.
    pub index_mapper: IndexMap<String, usize>,
    /// Key whose diagonal cell holds the grand total.
    pub total_key: String,
}

impl CountsSnapshot {
    /// Build a snapshot from already aggregated `(key, key, count)` entries.
    ///
    /// Row `i` belongs to `keys[i]`. Entries hitting the same cell are summed;
    /// within a row, cells keep first-seen order.
    pub fn from_entries<S: AsRef<str>>(
        keys: &[S],
        total_key: &str,
        entries: &[(&str, &str, f64)],
    ) -> Result<Self, PmiError> {
        let index_mapper: IndexMap<String, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_ref().to_string(), i))
            .collect();
        let lookup = |key: &str| {
            index_mapper
                .get(key)
                .copied()
                .ok_or_else(|| PmiError::InvalidMatrix(format!("entry references unknown key {key}")))
        };

        let n = keys.len();
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for &(k1, k2, count) in entries {
            let (row, col) = (lookup(k1)?, lookup(k2)?);
            match rows[row].iter_mut().find(|(c, _)| *c == col) {
                Some((_, v)) => *v += count,
                None => rows[row].push((col, count)),
            }
        }

        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = Vec::with_capacity(n + 1);
        indptr.push(0);
        for row in rows {
            for (col, value) in row {
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }

        Ok(Self {
            counts_matrix: MatrixSnapshot {
                data,
                indices,
                indptr,
                shape: (n, n),
            },
            index_mapper,
            total_key: total_key.to_string(),
        })
    }
}

/// Load a counter snapshot from a JSON file.
pub fn load_counts(path: impl AsRef<Path>) -> Result<CountsSnapshot, PmiError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save a counter snapshot to a JSON file.
pub fn save_counts(snapshot: &CountsSnapshot, path: impl AsRef<Path>) -> Result<(), PmiError> {
    let json = serde_json::to_string(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write the neighbor mapping as a JSON object `{key: [neighbor, ...]}`.
pub fn save_neighbors(neighbors: &NeighborMap, path: impl AsRef<Path>) -> Result<(), PmiError> {
    let json = serde_json::to_string(neighbors)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a neighbor mapping previously written by [`save_neighbors`].
pub fn load_neighbors(path: impl AsRef<Path>) -> Result<NeighborMap, PmiError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
