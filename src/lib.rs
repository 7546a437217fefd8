//! PMI Neighbors - top-K co-occurrence neighbors
//!
//! Provides:
//! - Sparse pairwise count store (compressed-row layout)
//! - Pair statistics and PMI scoring
//! - Exhaustive top-K neighbor sweep (sequential or fork-join over rayon)
//! - JSON snapshots and result fingerprints

pub mod config;
pub mod csr;
pub mod error;
pub mod fingerprint;
pub mod neighbors;
pub mod pmi;
pub mod snapshot;
pub mod stats;

#[cfg(feature = "python")]
mod bindings;

pub use config::{NeighborConfig, MAX_TOP_CANDIDATES};
pub use csr::SparseCountStore;
pub use error::PmiError;
pub use neighbors::{NeighborEngine, NeighborMap};
pub use pmi::EPS;
pub use snapshot::CountsSnapshot;
pub use stats::{PairwiseCounter, Stats};
