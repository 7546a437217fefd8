//! Exhaustive top-K PMI neighbors (O(N²))
//!
//! Every query key is scored against every candidate key. The parallel path
//! is a fork-join: split the query keys into contiguous partitions, run the
//! sequential sweep on each against the full candidate set, union the maps.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;

use crate::config::NeighborConfig;
use crate::error::PmiError;
use crate::stats::PairwiseCounter;

/// Query key to its top-K neighbor keys, best first.
pub type NeighborMap = BTreeMap<String, Vec<String>>;

/// Runs neighbor sweeps over a shared, read-only counter.
pub struct NeighborEngine<'a> {
    counter: &'a PairwiseCounter,
    config: NeighborConfig,
}

impl<'a> NeighborEngine<'a> {
    pub fn new(counter: &'a PairwiseCounter, config: NeighborConfig) -> Result<Self, PmiError> {
        config.validate()?;
        Ok(Self { counter, config })
    }

    pub fn config(&self) -> &NeighborConfig {
        &self.config
    }

    /// Neighbors for every catalog key against every other catalog key.
    pub fn compute_all(&self) -> Result<NeighborMap, PmiError> {
        let keys = self.counter.product_keys();
        self.compute(&keys, &keys)
    }

    /// Neighbors for `queries`, drawn from `candidates`.
    ///
    /// The result is identical for every worker count. A panic in any
    /// partition fails the whole sweep.
    #[tracing::instrument(skip_all, fields(queries = queries.len(), candidates = candidates.len()))]
    pub fn compute(&self, queries: &[String], candidates: &[String]) -> Result<NeighborMap, PmiError> {
        let NeighborConfig { top_k, workers } = self.config;
        let start = Instant::now();
        tracing::info!(top_k, workers, "Starting neighbor sweep");

        let neighbors = fork_join(queries, workers, |part| {
            compute_partition(self.counter, part, candidates, top_k)
        })?;

        tracing::info!(
            keys = neighbors.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Neighbor sweep finished"
        );
        Ok(neighbors)
    }
}

/// Run `sweep` over contiguous partitions of `queries` and union the results.
///
/// At most `queries.len()` partitions are spawned; extra ones would be empty.
/// A panic in any partition yields [`PmiError::WorkerFailure`] and no map.
pub fn fork_join<F>(queries: &[String], workers: usize, sweep: F) -> Result<NeighborMap, PmiError>
where
    F: Fn(&[String]) -> NeighborMap + Sync,
{
    let workers = workers.min(queries.len()).max(1);
    let outcome = if workers == 1 {
        panic::catch_unwind(AssertUnwindSafe(|| sweep(queries)))
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| PmiError::WorkerFailure(e.to_string()))?;
        let parts = partition(queries, workers);

        panic::catch_unwind(AssertUnwindSafe(|| {
            let partials = pool.install(|| {
                parts
                    .par_iter()
                    .enumerate()
                    .map(|(id, part)| {
                        tracing::debug!(partition = id, size = part.len(), "Sweeping partition");
                        sweep(part)
                    })
                    .collect::<Vec<_>>()
            });
            merge_partitions(partials)
        }))
    };
    outcome.map_err(|payload| PmiError::WorkerFailure(panic_message(payload.as_ref())))
}

/// Top-K candidates for one query key, best first.
///
/// Candidates with absent stats are skipped. The sort is stable, so equal
/// scores keep candidate order.
pub fn top_k_for_key(
    counter: &PairwiseCounter,
    query: &str,
    candidates: &[String],
    top_k: usize,
) -> Vec<String> {
    let mut scored: Vec<(&str, f64)> = candidates
        .iter()
        .filter(|c| c.as_str() != query)
        .filter_map(|c| counter.calculate_pmi(query, c).map(|pmi| (c.as_str(), pmi)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);
    scored.into_iter().map(|(c, _)| c.to_string()).collect()
}

/// Sequential sweep over one partition of query keys.
pub fn compute_partition(
    counter: &PairwiseCounter,
    queries: &[String],
    candidates: &[String],
    top_k: usize,
) -> NeighborMap {
    queries
        .iter()
        .map(|q| (q.clone(), top_k_for_key(counter, q, candidates, top_k)))
        .collect()
}

/// Split `keys` into `parts` contiguous chunks of `ceil(len / parts)` keys.
///
/// Always returns `parts` slices; trailing ones may be short or empty.
pub fn partition(keys: &[String], parts: usize) -> Vec<&[String]> {
    let parts = parts.max(1);
    let part_len = keys.len().div_ceil(parts);
    (0..parts)
        .map(|k| {
            let start = (part_len * k).min(keys.len());
            let end = (part_len * (k + 1)).min(keys.len());
            &keys[start..end]
        })
        .collect()
}

/// Union of partial maps built from disjoint query partitions.
pub fn merge_partitions(partials: Vec<NeighborMap>) -> NeighborMap {
    let mut merged = NeighborMap::new();
    for partial in partials {
        merged.extend(partial);
    }
    merged
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "partition panicked".to_string()
    }
}
