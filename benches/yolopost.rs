use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use yolopost::{
    ClassLabelTable, DecodeConfig, ModelOutput, NmsConfig, NonMaxSuppressor, OutputDecoder,
    OwnedRgbImage, PreprocessConfig, Preprocessor, ResizeFilter,
};

const ANCHORS: usize = 8400;
const CLASSES: usize = 80;

fn make_image(width: usize, height: usize) -> OwnedRgbImage<u8> {
    OwnedRgbImage::from_fn(width, height, |x, y| {
        [
            ((x * 13) ^ (y * 7)) as u8,
            ((x * y) & 0xFF) as u8,
            ((x + y) & 0xFF) as u8,
        ]
    })
    .unwrap()
}

/// Reference-shaped output with a few hundred confident, clustered anchors.
fn make_output() -> Vec<f32> {
    let mut data = vec![0.01f32; (4 + CLASSES) * ANCHORS];
    for anchor in 0..ANCHORS {
        let cluster = (anchor % 40) as f32;
        data[anchor] = 16.0 + cluster * 15.0 + (anchor % 3) as f32;
        data[ANCHORS + anchor] = 16.0 + cluster * 15.0;
        data[2 * ANCHORS + anchor] = 30.0;
        data[3 * ANCHORS + anchor] = 30.0;
        if anchor % 25 == 0 {
            let class_id = anchor % CLASSES;
            data[(4 + class_id) * ANCHORS + anchor] = 0.5 + (anchor % 50) as f32 / 100.0;
        }
    }
    data
}

fn bench_preprocess(c: &mut Criterion) {
    let img = make_image(1280, 720);
    for filter in [ResizeFilter::Triangle, ResizeFilter::Lanczos3] {
        let pre = Preprocessor::new(PreprocessConfig {
            input_size: 640,
            filter,
        })
        .unwrap();
        let mut dst = vec![0.0f32; pre.tensor_len()];
        c.bench_function(&format!("preprocess_1280x720_{filter}"), |b| {
            b.iter(|| pre.preprocess_into(black_box(&img), &mut dst).unwrap());
        });
    }
}

fn bench_postprocess(c: &mut Criterion) {
    let data = make_output();
    let labels = ClassLabelTable::coco();
    let decoder = OutputDecoder::new(DecodeConfig::default()).unwrap();
    let suppressor = NonMaxSuppressor::new(NmsConfig::default()).unwrap();

    c.bench_function("decode_8400x80", |b| {
        b.iter(|| {
            let output = ModelOutput::new(black_box(&data), CLASSES, ANCHORS).unwrap();
            black_box(decoder.decode(&output, (1280, 720), labels).unwrap())
        });
    });

    let output = ModelOutput::new(&data, CLASSES, ANCHORS).unwrap();
    let candidates = decoder.decode(&output, (1280, 720), labels).unwrap();
    c.bench_function("nms_clustered", |b| {
        b.iter(|| black_box(suppressor.suppress(black_box(candidates.clone()))));
    });
}

criterion_group!(benches, bench_preprocess, bench_postprocess);
criterion_main!(benches);
