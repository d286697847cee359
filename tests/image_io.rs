#![cfg(feature = "image-io")]

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use yolopost::io::{decode_rgb_image, load_rgb_image, view_from_rgb_image, DecodedImage};
use yolopost::{ChannelSampler, PreprocessConfig, Preprocessor, ResizeFilter, YoloPostError};

fn encode_png(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

fn make_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x * 20) as u8, (y * 30) as u8, 200]))
}

#[test]
fn png_round_trips_through_decoder() {
    let img = make_rgb(6, 4);
    let decoded = decode_rgb_image(&encode_png(&img)).unwrap();
    assert!(matches!(decoded, DecodedImage::Rgb8(_)));
    assert_eq!(decoded.dimensions(), (6, 4));
    let [r, g, b] = decoded.sample(5, 3).unwrap();
    assert!((r - 100.0 / 255.0).abs() < 1e-6);
    assert!((g - 90.0 / 255.0).abs() < 1e-6);
    assert!((b - 200.0 / 255.0).abs() < 1e-6);
}

#[test]
fn sixteen_bit_png_keeps_precision() {
    let img: ImageBuffer<Rgb<u16>, Vec<u16>> =
        ImageBuffer::from_fn(3, 2, |x, _| Rgb([x as u16 * 1000, 65535, 1]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();

    let decoded = decode_rgb_image(bytes.get_ref()).unwrap();
    assert!(matches!(decoded, DecodedImage::Rgb16(_)));
    let [r, g, b] = decoded.sample(2, 1).unwrap();
    assert!((r - 2000.0 / 65535.0).abs() < 1e-7);
    assert_eq!(g, 1.0);
    assert!(b > 0.0);
}

#[test]
fn garbage_bytes_are_invalid_image() {
    let err = decode_rgb_image(b"definitely not an image").err().unwrap();
    assert!(matches!(err, YoloPostError::InvalidImage { .. }));
}

#[test]
fn missing_file_is_invalid_image() {
    let err = load_rgb_image("/nonexistent/yolopost/input.png").err().unwrap();
    assert!(matches!(err, YoloPostError::InvalidImage { .. }));
}

#[test]
fn decoded_and_borrowed_views_preprocess_identically() {
    let img = make_rgb(12, 9);
    let decoded = decode_rgb_image(&encode_png(&img)).unwrap();
    let view = view_from_rgb_image(&img).unwrap();

    let pre = Preprocessor::new(PreprocessConfig {
        input_size: 16,
        filter: ResizeFilter::Lanczos3,
    })
    .unwrap();
    assert_eq!(
        pre.preprocess(&decoded).unwrap(),
        pre.preprocess(&view).unwrap()
    );
}
