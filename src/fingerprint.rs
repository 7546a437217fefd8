//! Neighbor map fingerprint: canonical SHA-256 identity of a sweep result.
//!
//! Encoding: for each key in map order, `0x00 | len | key`, then
//! `0x01 | len | neighbor` for every neighbor. Lengths are u64 little-endian.
//! Two maps share a fingerprint iff they hold the same keys, lists and order.

use sha2::{Digest, Sha256};

use crate::neighbors::NeighborMap;

const KEY_TAG: u8 = 0x00;
const NEIGHBOR_TAG: u8 = 0x01;

fn update_tagged(hasher: &mut Sha256, tag: u8, s: &str) {
    hasher.update([tag]);
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

/// 64-character hex digest of the whole map.
pub fn neighbors_digest_hex(neighbors: &NeighborMap) -> String {
    let mut hasher = Sha256::new();
    for (key, list) in neighbors {
        update_tagged(&mut hasher, KEY_TAG, key);
        for neighbor in list {
            update_tagged(&mut hasher, NEIGHBOR_TAG, neighbor);
        }
    }
    hex::encode(hasher.finalize())
}
