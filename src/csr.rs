//! Sparse pairwise count store (compressed-row layout)
//!
//! Rows and columns share one key index: cell `(i, j)` is the number of times
//! items `i` and `j` were observed together, and the diagonal `(i, i)` is the
//! marginal count of item `i`. The total key's diagonal holds the grand total.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::PmiError;
use crate::snapshot::{CountsSnapshot, MatrixSnapshot};

/// Immutable square count matrix addressed by external keys.
#[derive(Debug, Clone)]
pub struct SparseCountStore {
    values: Vec<f64>,
    col_indices: Vec<usize>,
    row_starts: Vec<usize>,
    index_of: IndexMap<String, usize>,
    /// Keys in `index_of` insertion order.
    keys: Vec<String>,
    total_key: String,
    total: f64,
}

impl SparseCountStore {
    /// Validate a snapshot and build the store from it.
    ///
    /// Refuses malformed CSR arrays, out-of-range or shared key indices and a
    /// missing total key. An absent total cell is accepted and yields `total = 0`.
    pub fn from_snapshot(snapshot: CountsSnapshot) -> Result<Self, PmiError> {
        let CountsSnapshot {
            counts_matrix,
            index_mapper,
            total_key,
        } = snapshot;
        let MatrixSnapshot {
            data,
            indices,
            indptr,
            shape,
        } = counts_matrix;

        let rows = validate_csr(&data, &indices, &indptr, shape)?;

        let mut owner: HashMap<usize, &String> = HashMap::with_capacity(index_mapper.len());
        for (key, &index) in &index_mapper {
            if index >= rows {
                return Err(PmiError::IndexOutOfRange {
                    key: key.clone(),
                    index,
                    rows,
                });
            }
            if let Some(first) = owner.insert(index, key) {
                return Err(PmiError::DuplicateIndex {
                    first: first.clone(),
                    second: key.clone(),
                    index,
                });
            }
        }
        let keys: Vec<String> = index_mapper.keys().cloned().collect();

        let total_index = *index_mapper
            .get(&total_key)
            .ok_or_else(|| PmiError::UnknownTotalKey {
                total_key: total_key.clone(),
            })?;

        let mut store = Self {
            values: data,
            col_indices: indices,
            row_starts: indptr,
            index_of: index_mapper,
            keys,
            total_key,
            total: 0.0,
        };
        store.total = store.cell_value(total_index, total_index).unwrap_or(0.0);

        tracing::debug!(
            rows,
            nnz = store.nnz(),
            keys = store.keys.len(),
            total = store.total,
            "Built sparse count store"
        );
        Ok(store)
    }

    /// Value stored at `(row, col)`, or `None` when the cell is empty.
    ///
    /// Linear scan over the row's stored cells.
    #[inline]
    pub fn cell_value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() {
            return None;
        }
        let (start, end) = (self.row_starts[row], self.row_starts[row + 1]);
        self.col_indices[start..end]
            .iter()
            .position(|&c| c == col)
            .map(|offset| self.values[start + offset])
    }

    /// Row/column index of `key`.
    #[inline]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_of.get(key).copied()
    }

    /// All indexed keys, in snapshot order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn total_key(&self) -> &str {
        &self.total_key
    }

    /// Grand total resolved from the total key's diagonal at construction.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn rows(&self) -> usize {
        self.row_starts.len() - 1
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Dump the store back into its snapshot form.
    pub fn to_snapshot(&self) -> CountsSnapshot {
        let rows = self.rows();
        CountsSnapshot {
            counts_matrix: MatrixSnapshot {
                data: self.values.clone(),
                indices: self.col_indices.clone(),
                indptr: self.row_starts.clone(),
                shape: (rows, rows),
            },
            index_mapper: self.index_of.clone(),
            total_key: self.total_key.clone(),
        }
    }
}

/// Check the compressed-row invariants and return the row count.
fn validate_csr(
    data: &[f64],
    indices: &[usize],
    indptr: &[usize],
    shape: (usize, usize),
) -> Result<usize, PmiError> {
    let (rows, cols) = shape;
    if rows != cols {
        return Err(PmiError::InvalidMatrix(format!(
            "matrix must be square, got {rows}x{cols}"
        )));
    }
    if data.len() != indices.len() {
        return Err(PmiError::InvalidMatrix(format!(
            "data has {} values but indices has {}",
            data.len(),
            indices.len()
        )));
    }
    if indptr.len().checked_sub(1) != Some(rows) {
        return Err(PmiError::InvalidMatrix(format!(
            "indptr length {} does not match {rows} rows",
            indptr.len()
        )));
    }
    if indptr[0] != 0 {
        return Err(PmiError::InvalidMatrix(format!(
            "indptr must start at 0, got {}",
            indptr[0]
        )));
    }
    if let Some(row) = indptr.windows(2).position(|w| w[0] > w[1]) {
        return Err(PmiError::InvalidMatrix(format!(
            "indptr decreases at row {row}"
        )));
    }
    if indptr[rows] != indices.len() {
        return Err(PmiError::InvalidMatrix(format!(
            "indptr ends at {} but {} cells are stored",
            indptr[rows],
            indices.len()
        )));
    }
    if let Some(&col) = indices.iter().find(|&&c| c >= cols) {
        return Err(PmiError::InvalidMatrix(format!(
            "column index {col} out of range ({cols} columns)"
        )));
    }
    Ok(rows)
}
