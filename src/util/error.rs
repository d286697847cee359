//! Error types for yolopost.

use thiserror::Error;

/// Result alias for yolopost operations.
pub type YoloPostResult<T> = std::result::Result<T, YoloPostError>;

/// Errors that can occur while preparing inputs or post-processing outputs.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum YoloPostError {
    /// The source image could not be decoded or read.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },
    /// A caller-supplied buffer is smaller than required.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The model output buffer does not have `(4 + C) * A` elements.
    #[error("malformed model output: expected {expected} values, got {got}")]
    MalformedOutput { expected: usize, got: usize },
    /// A threshold or shape parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// A label file could not be read.
    #[error("cannot read label file {path}: {reason}")]
    LabelFile { path: String, reason: String },
    /// The inference backend failed to produce an output tensor.
    #[error("inference failed: {reason}")]
    Inference { reason: String },
}
