//! Pair enumeration for the all-play-all tournament.
//!
//! Every built image plays every other image twice, once as master and
//! once as slave, so `n` images produce `n × (n − 1)` ordered pairs.
//! The pending subset (enumerated minus already-completed) is shuffled
//! before dispatch so service load doesn't correlate with artifact-id
//! order.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::types::{BuildRecord, ImageId};

/// A (master, slave) pairing of two built images.
pub type Pair = (ImageId, ImageId);

/// Image ids of the records that actually built.
pub fn image_ids(records: &[BuildRecord]) -> Vec<ImageId> {
    records
        .iter()
        .filter_map(|record| record.image_id.clone())
        .collect()
}

/// Every ordered pair of distinct elements.
pub fn all_pairs(ids: &[ImageId]) -> Vec<Pair> {
    let mut pairs = Vec::with_capacity(ids.len().saturating_mul(ids.len().saturating_sub(1)));
    for (i, master) in ids.iter().enumerate() {
        for (j, slave) in ids.iter().enumerate() {
            if i != j {
                pairs.push((master.clone(), slave.clone()));
            }
        }
    }
    pairs
}

/// Pairs not yet present in the completed set, randomly permuted.
pub fn pending_pairs(all: Vec<Pair>, completed: &HashSet<Pair>) -> Vec<Pair> {
    let mut pending: Vec<Pair> = all
        .into_iter()
        .filter(|pair| !completed.contains(pair))
        .collect();
    pending.shuffle(&mut rand::thread_rng());
    pending
}
