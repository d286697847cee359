//! Raw detector output decoding.
//!
//! The detector emits a `(4 + C, A)` tensor flattened row-major by attribute:
//! rows 0..4 hold box center x, center y, width and height for every anchor,
//! followed by one row of scores per class. Boxes are in model input space and
//! are scaled to the original image independently per axis.

use crate::detection::Detection;
use crate::labels::ClassLabelTable;
use crate::preprocess::DEFAULT_INPUT_SIZE;
use crate::trace::{self, Stage};
use crate::util::math::{argmax_first, in_unit_interval};
use crate::util::{YoloPostError, YoloPostResult};

/// Number of box rows preceding the class score rows.
pub const BOX_ROWS: usize = 4;

/// Default minimum class score for an anchor to produce a candidate.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Borrowed model output with its `(4 + C, A)` shape.
#[derive(Clone, Copy, Debug)]
pub struct ModelOutput<'a> {
    data: &'a [f32],
    num_classes: usize,
    num_anchors: usize,
}

/// Box parameters of one anchor, in model input space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawAnchor {
    pub index: usize,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl RawAnchor {
    /// Corner form `(x1, y1, x2, y2)` in model space.
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        let half_w = self.w / 2.0;
        let half_h = self.h / 2.0;
        (
            self.cx - half_w,
            self.cy - half_h,
            self.cx + half_w,
            self.cy + half_h,
        )
    }
}

impl<'a> ModelOutput<'a> {
    /// Wraps `data`, checking that it holds exactly `(4 + C) * A` values.
    pub fn new(data: &'a [f32], num_classes: usize, num_anchors: usize) -> YoloPostResult<Self> {
        if num_classes == 0 {
            return Err(YoloPostError::InvalidConfiguration(
                "num_classes must be positive",
            ));
        }
        if num_anchors == 0 {
            return Err(YoloPostError::InvalidConfiguration(
                "num_anchors must be positive",
            ));
        }
        let expected = (BOX_ROWS + num_classes)
            .checked_mul(num_anchors)
            .ok_or(YoloPostError::InvalidConfiguration("output shape overflows"))?;
        if data.len() != expected {
            return Err(YoloPostError::MalformedOutput {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_classes,
            num_anchors,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_anchors(&self) -> usize {
        self.num_anchors
    }

    /// Returns the `A` values of attribute row `row`.
    fn row(&self, row: usize) -> &'a [f32] {
        let start = row * self.num_anchors;
        &self.data[start..start + self.num_anchors]
    }

    /// Box parameters for anchor `index`.
    pub fn anchor(&self, index: usize) -> Option<RawAnchor> {
        if index >= self.num_anchors {
            return None;
        }
        Some(RawAnchor {
            index,
            cx: self.row(0)[index],
            cy: self.row(1)[index],
            w: self.row(2)[index],
            h: self.row(3)[index],
        })
    }

    /// Score of class `class_id` at anchor `index`.
    pub fn class_score(&self, class_id: usize, index: usize) -> Option<f32> {
        if class_id >= self.num_classes || index >= self.num_anchors {
            return None;
        }
        Some(self.row(BOX_ROWS + class_id)[index])
    }

    /// Best class for anchor `index`; ties resolve to the lowest class id.
    pub fn best_class(&self, index: usize) -> Option<(usize, f32)> {
        if index >= self.num_anchors {
            return None;
        }
        argmax_first((0..self.num_classes).map(|c| self.row(BOX_ROWS + c)[index]))
    }
}

/// Configuration for [`OutputDecoder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Anchors whose best class score is below this are dropped.
    pub confidence_threshold: f32,
    /// Side of the square model input the boxes are expressed in.
    pub input_size: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

impl DecodeConfig {
    pub fn validate(&self) -> YoloPostResult<()> {
        if !in_unit_interval(self.confidence_threshold) {
            return Err(YoloPostError::InvalidConfiguration(
                "confidence_threshold must be in [0, 1]",
            ));
        }
        if self.input_size == 0 {
            return Err(YoloPostError::InvalidConfiguration(
                "input_size must be positive",
            ));
        }
        Ok(())
    }
}

/// Turns raw model output into candidate detections.
#[derive(Clone, Debug)]
pub struct OutputDecoder {
    cfg: DecodeConfig,
}

impl OutputDecoder {
    pub fn new(cfg: DecodeConfig) -> YoloPostResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Decodes every anchor that clears the confidence threshold.
    ///
    /// `image_size` is the original `(width, height)`. Detections come back in
    /// anchor order and are not yet de-duplicated.
    pub fn decode(
        &self,
        output: &ModelOutput<'_>,
        image_size: (usize, usize),
        labels: &ClassLabelTable,
    ) -> YoloPostResult<Vec<Detection>> {
        let (orig_w, orig_h) = image_size;
        if orig_w == 0 || orig_h == 0 {
            return Err(YoloPostError::InvalidConfiguration(
                "original image size must be positive",
            ));
        }
        if labels.len() != output.num_classes() {
            return Err(YoloPostError::InvalidConfiguration(
                "label table size does not match class count",
            ));
        }

        let _stage = trace::enter(Stage::Decode, output.num_anchors());

        // Divide by the input side before multiplying by the original size so
        // truncated pixel edges agree with reference outputs.
        let input_size = self.cfg.input_size as f32;
        let orig_w = orig_w as f32;
        let orig_h = orig_h as f32;
        let mut detections = Vec::new();

        for index in 0..output.num_anchors() {
            let Some((class_id, confidence)) = output.best_class(index) else {
                continue;
            };
            if confidence.is_nan() || confidence < self.cfg.confidence_threshold {
                continue;
            }
            let Some(anchor) = output.anchor(index) else {
                continue;
            };
            let label = labels
                .get(class_id)
                .ok_or(YoloPostError::InvalidConfiguration(
                    "class id outside label table",
                ))?;

            let (x1, y1, x2, y2) = anchor.corners();
            detections.push(Detection {
                label: label.to_owned(),
                class_id,
                confidence,
                x1: x1 / input_size * orig_w,
                y1: y1 / input_size * orig_h,
                x2: x2 / input_size * orig_w,
                y2: y2 / input_size * orig_h,
            });
        }

        trace::finished(Stage::Decode, detections.len());
        Ok(detections)
    }
}
