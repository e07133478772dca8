//! Segmented reduction and broadcast primitives.
//!
//! These two operations carry the whole atom↔molecule aggregation pattern of
//! the crate: a grouped sum from atoms down to their molecule, and the
//! replication of a per-molecule scalar back up to every member atom. They
//! are index-keyed accumulations over a plain membership map, with no
//! assumption about group sizes or ordering — atoms of one molecule may be
//! contiguous or interleaved with atoms of any other.

/// Sums `values` grouped by `segment_ids`.
///
/// Returns one accumulator per segment, initialized to zero, so a segment
/// with no members yields `0.0` — callers that consider empty segments
/// malformed must reject them before aggregating. Accumulation visits the
/// input strictly left to right, which fixes the floating-point rounding
/// order for a given atom layout.
///
/// Every id in `segment_ids` must be `< segment_count`, and the two slices
/// must have equal length; both are upheld by [`Batch`](crate::batch::Batch)
/// construction.
pub fn segment_sum(values: &[f64], segment_ids: &[usize], segment_count: usize) -> Vec<f64> {
    debug_assert_eq!(values.len(), segment_ids.len());

    let mut sums = vec![0.0; segment_count];
    for (&value, &segment) in values.iter().zip(segment_ids.iter()) {
        debug_assert!(segment < segment_count);
        sums[segment] += value;
    }
    sums
}

/// Replicates one value per segment back to every member position.
///
/// The inverse direction of [`segment_sum`]: given a per-segment scalar and
/// the same membership map, produces a per-member vector where each entry
/// holds its segment's value.
pub fn segment_broadcast(per_segment: &[f64], segment_ids: &[usize]) -> Vec<f64> {
    segment_ids
        .iter()
        .map(|&segment| {
            debug_assert!(segment < per_segment.len());
            per_segment[segment]
        })
        .collect()
}
