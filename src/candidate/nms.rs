//! Greedy IoU non-maximum suppression.

use crate::candidate::order::{sort_by_confidence, SuppressionOrder};
use crate::detection::{Detection, PixelRect};
use crate::trace::{self, Stage};
use crate::util::math::in_unit_interval;
use crate::util::{YoloPostError, YoloPostResult};

/// Default IoU above which two boxes are treated as the same object.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Configuration for [`NonMaxSuppressor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsConfig {
    /// Candidates whose IoU with a kept box exceeds this are discarded.
    pub iou_threshold: f32,
    /// Visiting order, which decides the representative of each cluster.
    pub order: SuppressionOrder,
    /// Only suppress against kept boxes of the same class.
    pub per_class: bool,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            order: SuppressionOrder::Descending,
            per_class: false,
        }
    }
}

impl NmsConfig {
    pub fn validate(&self) -> YoloPostResult<()> {
        if !in_unit_interval(self.iou_threshold) {
            return Err(YoloPostError::InvalidConfiguration(
                "iou_threshold must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Collapses overlapping candidates into one representative per cluster.
#[derive(Clone, Debug)]
pub struct NonMaxSuppressor {
    cfg: NmsConfig,
}

impl NonMaxSuppressor {
    pub fn new(cfg: NmsConfig) -> YoloPostResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &NmsConfig {
        &self.cfg
    }

    /// Sorts candidates by confidence and keeps each one whose IoU with every
    /// previously kept box is at most the threshold.
    ///
    /// The result is in visiting order.
    pub fn suppress(&self, mut candidates: Vec<Detection>) -> Vec<Detection> {
        let _stage = trace::enter(Stage::Suppress, candidates.len());

        sort_by_confidence(&mut candidates, self.cfg.order);
        let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
        let mut kept_rects: Vec<PixelRect> = Vec::with_capacity(candidates.len());

        'outer: for candidate in candidates {
            let rect = candidate.pixel_rect();
            for (existing, existing_rect) in kept.iter().zip(kept_rects.iter()) {
                if self.cfg.per_class && existing.class_id != candidate.class_id {
                    continue;
                }
                if rect.iou(existing_rect) > self.cfg.iou_threshold {
                    continue 'outer;
                }
            }
            kept_rects.push(rect);
            kept.push(candidate);
        }

        trace::finished(Stage::Suppress, kept.len());
        kept
    }
}

/// Validates `cfg` and runs [`NonMaxSuppressor::suppress`].
pub fn nms(candidates: Vec<Detection>, cfg: NmsConfig) -> YoloPostResult<Vec<Detection>> {
    Ok(NonMaxSuppressor::new(cfg)?.suppress(candidates))
}
