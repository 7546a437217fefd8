//! Sweep configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PmiError;

/// Default number of neighbors kept per key.
pub const MAX_TOP_CANDIDATES: usize = 10;

/// Settings for the all-pairs neighbor sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborConfig {
    /// Neighbors kept per query key (default: 10).
    pub top_k: usize,
    /// Number of contiguous query partitions run in parallel
    /// (default: available parallelism). 1 runs sequentially.
    pub workers: usize,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            top_k: MAX_TOP_CANDIDATES,
            workers: available_workers(),
        }
    }
}

impl NeighborConfig {
    pub fn validate(&self) -> Result<(), PmiError> {
        if self.top_k == 0 {
            return Err(PmiError::Config("top_k must be > 0".to_string()));
        }
        if self.workers == 0 {
            return Err(PmiError::Config("workers must be > 0".to_string()));
        }
        Ok(())
    }

    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PmiError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
