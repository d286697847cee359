//! Confidence ordering for candidate detections.

use std::cmp::Ordering;

use crate::detection::Detection;

/// Order in which candidates are visited by the suppressor.
///
/// The first box visited in a cluster of overlapping boxes is the one kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SuppressionOrder {
    /// Highest confidence first; keeps the most confident box per cluster.
    #[default]
    Descending,
    /// Lowest confidence first; keeps the least confident box per cluster.
    Ascending,
}

fn cmp_confidence(a: &Detection, b: &Detection, order: SuppressionOrder) -> Ordering {
    match order {
        SuppressionOrder::Ascending => a.confidence.total_cmp(&b.confidence),
        SuppressionOrder::Descending => b.confidence.total_cmp(&a.confidence),
    }
}

/// Stable sort by confidence; equal scores keep their input order.
pub(crate) fn sort_by_confidence(detections: &mut [Detection], order: SuppressionOrder) {
    detections.sort_by(|a, b| cmp_confidence(a, b, order));
}
