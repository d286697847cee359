//! Low-level building blocks for custom pipelines.
//!
//! These expose the resize helpers and overlap helpers used by the high-level
//! stages. Most users should prefer [`crate::Pipeline`] or the
//! individual stage types.

pub use crate::decode::{BOX_ROWS, DEFAULT_CONFIDENCE_THRESHOLD};
pub use crate::detection::PixelRect;
pub use crate::image::resize::{resize_square, sample_rgb32f, ResizeFilter};
pub use crate::image::ChannelValue;
pub use crate::labels::COCO_LABELS;
pub use crate::preprocess::DEFAULT_INPUT_SIZE;

/// Intersection-over-union of two `(x1, y1, x2, y2)` boxes on pixel
/// rectangles.
pub fn iou_xyxy(a: [f32; 4], b: [f32; 4]) -> f32 {
    PixelRect::from_corners(a[0], a[1], a[2], a[3])
        .iou(&PixelRect::from_corners(b[0], b[1], b[2], b[3]))
}
