//! Image views and channel sampling.
//!
//! The preprocessor reads pixels only through [`ChannelSampler`], which reports
//! the image size and returns an RGB triple already normalized to `[0, 1]`.
//! [`resize`] turns any sampler into an `image` buffer for resampling.
//!
//! `RgbView` is a borrowed view into an interleaved `RGBRGB...` buffer with an
//! explicit stride. The stride counts elements (not pixels) between the starts
//! of consecutive rows, so a stride larger than `3 * width` represents padded
//! rows.

use crate::util::{YoloPostError, YoloPostResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod resize;

/// A channel sample type with a fixed native range.
pub trait ChannelValue: Copy {
    /// Maps the native value into `[0, 1]`.
    fn to_unit(self) -> f32;
}

impl ChannelValue for u8 {
    #[inline]
    fn to_unit(self) -> f32 {
        f32::from(self) / 255.0
    }
}

impl ChannelValue for u16 {
    #[inline]
    fn to_unit(self) -> f32 {
        f32::from(self) / 65535.0
    }
}

impl ChannelValue for f32 {
    #[inline]
    fn to_unit(self) -> f32 {
        if self.is_nan() {
            0.0
        } else {
            self.clamp(0.0, 1.0)
        }
    }
}

/// Read access to an RGB image, one normalized pixel at a time.
pub trait ChannelSampler {
    /// Image width in pixels.
    fn width(&self) -> usize;

    /// Image height in pixels.
    fn height(&self) -> usize;

    /// Returns `[r, g, b]` in `[0, 1]` at `(x, y)`, or `None` outside the image.
    fn sample(&self, x: usize, y: usize) -> Option<[f32; 3]>;
}

impl<S: ChannelSampler + ?Sized> ChannelSampler for &S {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn sample(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        (**self).sample(x, y)
    }
}

/// Borrowed interleaved RGB view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct RgbView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: ChannelValue> RgbView<'a, T> {
    /// Creates a contiguous view with `stride == 3 * width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> YoloPostResult<Self> {
        let stride = width
            .checked_mul(3)
            .ok_or_else(|| invalid_image("image width overflows"))?;
        Self::new(data, width, height, stride)
    }

    /// Creates a view with an explicit row stride in elements.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> YoloPostResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(invalid_image(format!(
                "pixel buffer holds {} values, {needed} needed for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the raw channel triple at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[T; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x.checked_mul(3)?)?;
        let px = self.data.get(idx..idx + 3)?;
        Some([px[0], px[1], px[2]])
    }
}

impl<T: ChannelValue> ChannelSampler for RgbView<'_, T> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sample(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        self.pixel(x, y)
            .map(|[r, g, b]| [r.to_unit(), g.to_unit(), b.to_unit()])
    }
}

/// Owned contiguous interleaved RGB image.
#[derive(Clone, Debug)]
pub struct OwnedRgbImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: ChannelValue> OwnedRgbImage<T> {
    /// Wraps an interleaved buffer of exactly `3 * width * height` values.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> YoloPostResult<Self> {
        let stride = width
            .checked_mul(3)
            .ok_or_else(|| invalid_image("image width overflows"))?;
        let needed = required_len(width, height, stride)?;
        if data.len() != needed {
            return Err(invalid_image(format!(
                "pixel buffer holds {} values, expected {needed} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> YoloPostResult<Self>
    where
        F: FnMut(usize, usize) -> [T; 3],
    {
        let mut data = Vec::with_capacity(width.saturating_mul(height).saturating_mul(3));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> RgbView<'_, T> {
        RgbView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width * 3,
        }
    }

    /// Returns the interleaved pixel data.
    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: ChannelValue> ChannelSampler for OwnedRgbImage<T> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn sample(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        self.view().sample(x, y)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> YoloPostResult<usize> {
    if width == 0 || height == 0 {
        return Err(invalid_image(format!("empty image {width}x{height}")));
    }
    let row_len = width
        .checked_mul(3)
        .ok_or_else(|| invalid_image("image width overflows"))?;
    if stride < row_len {
        return Err(invalid_image(format!(
            "stride {stride} is shorter than a row of {row_len} values"
        )));
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or_else(|| invalid_image("image dimensions overflow"))
}

pub(crate) fn invalid_image(reason: impl Into<String>) -> YoloPostError {
    YoloPostError::InvalidImage {
        reason: reason.into(),
    }
}
