//! yolopost turns images into detector input tensors and raw detector output
//! into de-duplicated, labeled boxes.
//!
//! The crate covers the CPU work around a YOLO-style detector: planar
//! `[1, 3, S, S]` preprocessing with a configurable resampling filter,
//! decoding of the `(4 + C, A)` output tensor, and greedy IoU non-maximum
//! suppression. Model execution is left to the caller behind
//! [`InferenceBackend`]; decoding images from files is available with the
//! `image-io` feature.

mod candidate;
pub mod decode;
pub mod detection;
pub mod image;
pub mod labels;
pub mod lowlevel;
pub mod pipeline;
pub mod preprocess;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use candidate::nms::{nms, NmsConfig, NonMaxSuppressor, DEFAULT_IOU_THRESHOLD};
pub use candidate::order::SuppressionOrder;
pub use decode::{DecodeConfig, ModelOutput, OutputDecoder, RawAnchor};
pub use detection::{Detection, PixelRect};
pub use crate::image::resize::ResizeFilter;
pub use crate::image::{ChannelSampler, OwnedRgbImage, RgbView};
pub use labels::ClassLabelTable;
pub use pipeline::{BatchItem, InferenceBackend, Pipeline, PipelineConfig};
pub use preprocess::{PreprocessConfig, Preprocessor};
pub use util::{YoloPostError, YoloPostResult};
