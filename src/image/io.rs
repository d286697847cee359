//! Convenience helpers for decoding images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoded images keep their
//! native channel depth: 16-bit and float sources are read as 16-bit so the
//! preprocessor normalizes them by 65535 instead of losing the low byte.

use crate::image::{invalid_image, ChannelSampler, OwnedRgbImage, RgbView};
use crate::util::YoloPostResult;
use image::DynamicImage;
use std::path::Path;

/// RGB image decoded from bytes or disk, at 8 or 16 bits per channel.
#[derive(Clone, Debug)]
pub enum DecodedImage {
    /// 8-bit channels.
    Rgb8(OwnedRgbImage<u8>),
    /// 16-bit channels.
    Rgb16(OwnedRgbImage<u16>),
}

impl DecodedImage {
    /// Returns `(width, height)` in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }
}

impl ChannelSampler for DecodedImage {
    fn width(&self) -> usize {
        match self {
            DecodedImage::Rgb8(img) => img.width(),
            DecodedImage::Rgb16(img) => img.width(),
        }
    }

    fn height(&self) -> usize {
        match self {
            DecodedImage::Rgb8(img) => img.height(),
            DecodedImage::Rgb16(img) => img.height(),
        }
    }

    fn sample(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        match self {
            DecodedImage::Rgb8(img) => img.sample(x, y),
            DecodedImage::Rgb16(img) => img.sample(x, y),
        }
    }
}

/// Creates a borrowed view from an 8-bit RGB image buffer.
pub fn view_from_rgb_image(img: &image::RgbImage) -> YoloPostResult<RgbView<'_, u8>> {
    RgbView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Converts a dynamic image to RGB, keeping 16-bit precision when present.
pub fn decoded_from_dynamic_image(img: &DynamicImage) -> YoloPostResult<DecodedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    match img {
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgb32F(_)
        | DynamicImage::ImageRgba32F(_) => {
            let rgb = img.to_rgb16();
            OwnedRgbImage::new(rgb.into_raw(), width, height).map(DecodedImage::Rgb16)
        }
        _ => {
            let rgb = img.to_rgb8();
            OwnedRgbImage::new(rgb.into_raw(), width, height).map(DecodedImage::Rgb8)
        }
    }
}

/// Decodes an encoded image (PNG, JPEG) from memory.
pub fn decode_rgb_image(bytes: &[u8]) -> YoloPostResult<DecodedImage> {
    let img = image::load_from_memory(bytes).map_err(|err| invalid_image(err.to_string()))?;
    decoded_from_dynamic_image(&img)
}

/// Loads an image from disk.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> YoloPostResult<DecodedImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|err| invalid_image(format!("{}: {err}", path.display())))?;
    decoded_from_dynamic_image(&img)
}
