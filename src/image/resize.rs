//! Resizing to the model input size.
//!
//! Resampling is done by `image::imageops::resize`. Pixels are first gathered
//! through [`ChannelSampler`] into an [`Rgb32FImage`], so 8-bit, 16-bit and
//! float sources are all resized at float precision with the same kernel.

use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb32FImage};

use crate::image::{invalid_image, ChannelSampler};
use crate::util::{YoloPostError, YoloPostResult};

/// Resampling kernel used when resizing to the model input size.
///
/// The choice affects downstream confidence values, so it is part of the
/// configuration rather than fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Linear (tent) filter, i.e. bilinear sampling.
    Triangle,
    /// Catmull-Rom cubic spline.
    CatmullRom,
    /// Gaussian kernel.
    Gaussian,
    /// Lanczos windowed sinc with a window of 3.
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub const ALL: [ResizeFilter; 5] = [
        ResizeFilter::Nearest,
        ResizeFilter::Triangle,
        ResizeFilter::CatmullRom,
        ResizeFilter::Gaussian,
        ResizeFilter::Lanczos3,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::CatmullRom => "catmull_rom",
            ResizeFilter::Gaussian => "gaussian",
            ResizeFilter::Lanczos3 => "lanczos3",
        }
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(value: ResizeFilter) -> Self {
        match value {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeFilter {
    type Err = YoloPostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "triangle" | "bilinear" | "linear" => Ok(ResizeFilter::Triangle),
            "catmull_rom" | "catmullrom" | "catmull-rom" | "bicubic" => {
                Ok(ResizeFilter::CatmullRom)
            }
            "gaussian" => Ok(ResizeFilter::Gaussian),
            "lanczos3" | "lanczos" => Ok(ResizeFilter::Lanczos3),
            _ => Err(YoloPostError::InvalidConfiguration("unknown resize filter")),
        }
    }
}

/// Reads every pixel of `src` into a float RGB buffer.
pub fn sample_rgb32f<S: ChannelSampler + ?Sized>(src: &S) -> YoloPostResult<Rgb32FImage> {
    let width = src.width();
    let height = src.height();
    if width == 0 || height == 0 {
        return Err(invalid_image(format!("empty image {width}x{height}")));
    }
    let buf_width =
        u32::try_from(width).map_err(|_| invalid_image(format!("width {width} is too large")))?;
    let buf_height = u32::try_from(height)
        .map_err(|_| invalid_image(format!("height {height} is too large")))?;
    let len = width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(3))
        .ok_or_else(|| invalid_image("image dimensions overflow"))?;

    let mut data = Vec::with_capacity(len);
    for y in 0..height {
        for x in 0..width {
            let px = src
                .sample(x, y)
                .ok_or_else(|| invalid_image(format!("pixel ({x}, {y}) is unreadable")))?;
            data.extend_from_slice(&px);
        }
    }
    ImageBuffer::from_raw(buf_width, buf_height, data)
        .ok_or_else(|| invalid_image("pixel buffer does not match image size"))
}

/// Resizes `src` to `size x size` with `filter`.
pub fn resize_square(src: &Rgb32FImage, size: u32, filter: ResizeFilter) -> Rgb32FImage {
    imageops::resize(src, size, size, filter.into())
}
