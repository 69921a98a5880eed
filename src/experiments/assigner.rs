use crate::domain::experiment::{TrafficSplit, VariationAssignment};
use sha2::{Digest, Sha256};

/// Maps `visitor_id` into `[0, 100)` for the given experiment.
pub fn bucket_for(visitor_id: &str, experiment_id: &str) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(visitor_id.as_bytes());
    hasher.update(experiment_id.as_bytes());
    let hash = hasher.finalize();

    let prefix = u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]);
    prefix % 100
}

/// Deterministically picks a variation from `split`.
///
/// Entries are walked in declaration order; the first whose cumulative
/// percentage exceeds the visitor's bucket wins. When the split under-sums
/// and no entry covers the bucket, the first declared variation is returned.
/// An empty split yields an empty `variation_id`; callers reject empty
/// splits before calling.
pub fn assign_variation(
    visitor_id: &str,
    experiment_id: &str,
    split: &TrafficSplit,
) -> VariationAssignment {
    let bucket = bucket_for(visitor_id, experiment_id);

    let mut cumulative = 0_u32;
    let chosen = split.entries.iter().find(|entry| {
        cumulative = cumulative.saturating_add(entry.percent);
        cumulative > bucket
    });

    let variation_id = chosen
        .or_else(|| split.entries.first())
        .map(|e| e.variation_id.clone())
        .unwrap_or_default();

    VariationAssignment {
        variation_id,
        bucket,
    }
}
