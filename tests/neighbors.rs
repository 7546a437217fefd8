// Integration tests: full sweeps over fixture counters.

use pmi_neighbors::fingerprint::neighbors_digest_hex;
use pmi_neighbors::neighbors::{compute_partition, top_k_for_key};
use pmi_neighbors::{snapshot, CountsSnapshot, NeighborConfig, NeighborEngine, PairwiseCounter, Stats};

fn counter_from(keys: &[String], entries: &[(String, String, f64)]) -> PairwiseCounter {
    let borrowed: Vec<(&str, &str, f64)> = entries
        .iter()
        .map(|(a, b, v)| (a.as_str(), b.as_str(), *v))
        .collect();
    let snap = CountsSnapshot::from_entries(keys, "TOTAL", &borrowed).unwrap();
    PairwiseCounter::from_snapshot(snap).unwrap()
}

/// Symmetric counter over `n` items, some with zero marginals.
fn synthetic_counter(n: usize) -> PairwiseCounter {
    let mut keys: Vec<String> = (0..n).map(|i| format!("item-{i:03}")).collect();
    keys.push("TOTAL".to_string());

    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };

    let mut entries = Vec::new();
    for i in 0..n {
        // every seventh item never observed on its own
        if i % 7 != 3 {
            entries.push((keys[i].clone(), keys[i].clone(), f64::from(20 + next() % 80)));
        }
        for j in (i + 1)..n {
            let r = next() % 10;
            if r < 4 {
                let count = f64::from(1 + r % 3);
                entries.push((keys[i].clone(), keys[j].clone(), count));
                entries.push((keys[j].clone(), keys[i].clone(), count));
            }
        }
    }
    entries.push(("TOTAL".to_string(), "TOTAL".to_string(), 5000.0));
    counter_from(&keys, &entries)
}

fn sweep(counter: &PairwiseCounter, top_k: usize, workers: usize) -> pmi_neighbors::NeighborMap {
    NeighborEngine::new(counter, NeighborConfig { top_k, workers })
        .unwrap()
        .compute_all()
        .unwrap()
}

#[test]
fn concrete_scenario() {
    let keys: Vec<String> = ["A", "B", "C", "TOTAL"].iter().map(|s| s.to_string()).collect();
    let entries: Vec<(String, String, f64)> = [
        ("A", "A", 10.0),
        ("B", "B", 5.0),
        ("A", "B", 3.0),
        ("TOTAL", "TOTAL", 100.0),
    ]
    .iter()
    .map(|&(a, b, v)| (a.to_string(), b.to_string(), v))
    .collect();
    let counter = counter_from(&keys, &entries);

    assert_eq!(
        counter.get_stats("A", "B"),
        Some(Stats {
            pair_count: 3.0,
            count_1: 10.0,
            count_2: 5.0,
            total: 100.0
        })
    );
    assert_eq!(counter.get_stats("A", "C"), None);

    let candidates = vec!["B".to_string(), "C".to_string()];
    assert_eq!(top_k_for_key(&counter, "A", &candidates, 1), vec!["B".to_string()]);

    // C's only partners need C's marginal, which is zero.
    let neighbors = sweep(&counter, 10, 1);
    assert_eq!(neighbors.len(), 3);
    assert_eq!(neighbors["C"], Vec::<String>::new());
    assert!(!neighbors.contains_key("TOTAL"));
}

#[test]
fn empty_candidate_key_still_present() {
    let keys: Vec<String> = ["A", "Z", "TOTAL"].iter().map(|s| s.to_string()).collect();
    let entries = vec![
        ("A".to_string(), "A".to_string(), 4.0),
        ("TOTAL".to_string(), "TOTAL".to_string(), 10.0),
    ];
    let counter = counter_from(&keys, &entries);

    let neighbors = sweep(&counter, 10, 2);
    assert_eq!(neighbors["A"], Vec::<String>::new());
    assert_eq!(neighbors["Z"], Vec::<String>::new());
}

#[test]
fn truncates_to_top_k_with_stable_ties() {
    let mut keys = vec!["Q".to_string()];
    keys.extend((0..15).map(|i| format!("c{i:02}")));
    keys.push("TOTAL".to_string());

    let mut entries = vec![
        ("Q".to_string(), "Q".to_string(), 10.0),
        ("TOTAL".to_string(), "TOTAL".to_string(), 1000.0),
    ];
    for i in 0..15 {
        let c = format!("c{i:02}");
        entries.push((c.clone(), c.clone(), 10.0));
        entries.push(("Q".to_string(), c, f64::from(i % 5 + 1)));
    }
    let counter = counter_from(&keys, &entries);

    let candidates = counter.product_keys();
    let top = top_k_for_key(&counter, "Q", &candidates, 10);
    assert_eq!(
        top,
        vec!["c04", "c09", "c14", "c03", "c08", "c13", "c02", "c07", "c12", "c01"]
    );

    let scores: Vec<f64> = top
        .iter()
        .map(|c| counter.calculate_pmi("Q", c).unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn parallel_matches_sequential() {
    let counter = synthetic_counter(60);
    let sequential = sweep(&counter, 10, 1);

    for workers in [2, 4, 7, 64] {
        let parallel = sweep(&counter, 10, workers);
        assert_eq!(parallel, sequential, "workers = {workers}");
        assert_eq!(neighbors_digest_hex(&parallel), neighbors_digest_hex(&sequential));
        assert_eq!(
            serde_json::to_vec(&parallel).unwrap(),
            serde_json::to_vec(&sequential).unwrap()
        );
    }
}

#[test]
fn sweep_matches_direct_partition() {
    let counter = synthetic_counter(25);
    let keys = counter.product_keys();
    assert_eq!(sweep(&counter, 5, 3), compute_partition(&counter, &keys, &keys, 5));
}

#[test]
fn pmi_symmetric_on_symmetric_counts() {
    let counter = synthetic_counter(30);
    let keys = counter.product_keys();
    let mut defined = 0;
    for a in &keys {
        for b in &keys {
            match (counter.calculate_pmi(a, b), counter.calculate_pmi(b, a)) {
                (Some(ab), Some(ba)) => {
                    assert!((ab - ba).abs() < 1e-9, "{a} {b}");
                    defined += 1;
                }
                (None, None) => {}
                other => panic!("asymmetric definedness for {a} {b}: {other:?}"),
            }
        }
    }
    assert!(defined > 0);
}

#[test]
fn zero_marginal_absent_for_every_partner() {
    let counter = synthetic_counter(30);
    // item-003 has no diagonal cell
    for other in counter.product_keys() {
        assert!(counter.get_stats("item-003", &other).is_none());
        assert!(counter.get_stats(&other, "item-003").is_none());
    }
}

#[test]
fn neighbor_lists_respect_top_k() {
    let counter = synthetic_counter(40);
    let neighbors = sweep(&counter, 3, 4);
    assert_eq!(neighbors.len(), 40);
    for (key, list) in &neighbors {
        assert!(list.len() <= 3);
        assert!(!list.contains(key));
    }
}

#[test]
fn snapshot_and_output_files_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let counts_path = dir.path().join("counts.json");
    let output_path = dir.path().join("neighbors.json");

    let counter = synthetic_counter(20);
    snapshot::save_counts(&counter.store().to_snapshot(), &counts_path).unwrap();

    let reloaded = PairwiseCounter::from_snapshot(snapshot::load_counts(&counts_path).unwrap()).unwrap();
    let neighbors = sweep(&reloaded, 10, 2);
    assert_eq!(neighbors, sweep(&counter, 10, 1));

    snapshot::save_neighbors(&neighbors, &output_path).unwrap();
    assert_eq!(snapshot::load_neighbors(&output_path).unwrap(), neighbors);
}

#[test]
fn ties_follow_snapshot_key_order() {
    // Key order in the file differs from row order: Y (row 2) comes before X (row 1).
    let json = r#"{
        "counts_matrix": {"data": [10, 2, 2, 5, 2, 5, 2, 100],
                          "indices": [0, 1, 2, 1, 0, 2, 0, 3],
                          "indptr": [0, 3, 5, 7, 8], "shape": [4, 4]},
        "index_mapper": {"Q": 0, "Y": 2, "X": 1, "T": 3},
        "total_key": "T"
    }"#;
    let snap: CountsSnapshot = serde_json::from_str(json).unwrap();
    let counter = PairwiseCounter::from_snapshot(snap).unwrap();

    assert_eq!(counter.product_keys(), vec!["Q", "Y", "X"]);
    assert_eq!(
        counter.calculate_pmi("Q", "X").unwrap().to_bits(),
        counter.calculate_pmi("Q", "Y").unwrap().to_bits()
    );

    for workers in [1, 3] {
        let neighbors = sweep(&counter, 10, workers);
        assert_eq!(neighbors["Q"], vec!["Y", "X"]);
    }
}
