//! Image to model-input tensor conversion.
//!
//! The output is a planar `[1, 3, S, S]` float tensor: all red samples, then
//! all green, then all blue, each plane row-major. Values are normalized to
//! `[0, 1]`; kernels with negative lobes are clamped after resampling.

use crate::image::resize::{resize_square, sample_rgb32f, ResizeFilter};
use crate::image::ChannelSampler;
use crate::trace::{self, Stage};
use crate::util::{YoloPostError, YoloPostResult};

/// Default square model input side.
pub const DEFAULT_INPUT_SIZE: usize = 640;

/// Configuration for [`Preprocessor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreprocessConfig {
    /// Side of the square model input in pixels.
    pub input_size: usize,
    /// Resampling kernel for the resize.
    pub filter: ResizeFilter,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            filter: ResizeFilter::Lanczos3,
        }
    }
}

impl PreprocessConfig {
    /// Checks that the configuration can produce a tensor.
    pub fn validate(&self) -> YoloPostResult<()> {
        if self.input_size == 0 {
            return Err(YoloPostError::InvalidConfiguration(
                "input_size must be positive",
            ));
        }
        u32::try_from(self.input_size)
            .map_err(|_| YoloPostError::InvalidConfiguration("input_size exceeds u32"))?;
        self.input_size
            .checked_mul(self.input_size)
            .and_then(|v| v.checked_mul(3))
            .ok_or(YoloPostError::InvalidConfiguration("input_size overflows"))?;
        Ok(())
    }
}

/// Converts images into planar, normalized model input tensors.
#[derive(Clone, Debug)]
pub struct Preprocessor {
    cfg: PreprocessConfig,
}

impl Preprocessor {
    /// Creates a preprocessor after validating `cfg`.
    pub fn new(cfg: PreprocessConfig) -> YoloPostResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PreprocessConfig {
        &self.cfg
    }

    /// Number of floats in one input tensor (`3 * S * S`).
    pub fn tensor_len(&self) -> usize {
        3 * self.cfg.input_size * self.cfg.input_size
    }

    /// Tensor shape in NCHW order.
    pub fn tensor_shape(&self) -> [usize; 4] {
        [1, 3, self.cfg.input_size, self.cfg.input_size]
    }

    /// Allocates and fills a new input tensor.
    pub fn preprocess<S: ChannelSampler + ?Sized>(&self, src: &S) -> YoloPostResult<Vec<f32>> {
        let mut dst = vec![0.0f32; self.tensor_len()];
        self.preprocess_into(src, &mut dst)?;
        Ok(dst)
    }

    /// Fills the first `3 * S * S` elements of `dst`.
    ///
    /// `dst` is left untouched when an error is returned.
    pub fn preprocess_into<S: ChannelSampler + ?Sized>(
        &self,
        src: &S,
        dst: &mut [f32],
    ) -> YoloPostResult<()> {
        let size = self.cfg.input_size;
        let needed = self.tensor_len();
        if dst.len() < needed {
            return Err(YoloPostError::BufferTooSmall {
                needed,
                got: dst.len(),
            });
        }

        let _stage = trace::enter(Stage::Preprocess, src.width().saturating_mul(src.height()));

        let side = u32::try_from(size)
            .map_err(|_| YoloPostError::InvalidConfiguration("input_size exceeds u32"))?;
        let rgb = sample_rgb32f(src)?;
        let resized = resize_square(&rgb, side, self.cfg.filter);

        let channel_len = size * size;
        let (red, rest) = dst[..needed].split_at_mut(channel_len);
        let (green, blue) = rest.split_at_mut(channel_len);
        for (idx, px) in resized.pixels().enumerate() {
            let [r, g, b] = px.0;
            red[idx] = r.clamp(0.0, 1.0);
            green[idx] = g.clamp(0.0, 1.0);
            blue[idx] = b.clamp(0.0, 1.0);
        }

        trace::finished(Stage::Preprocess, needed);
        Ok(())
    }
}
