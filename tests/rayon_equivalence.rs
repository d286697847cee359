#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use yolopost::{BatchItem, ClassLabelTable, Pipeline, PipelineConfig};

const ANCHORS: usize = 400;

fn random_output(rng: &mut StdRng, classes: usize) -> Vec<f32> {
    let mut data = vec![0.0f32; (4 + classes) * ANCHORS];
    for anchor in 0..ANCHORS {
        data[anchor] = rng.random_range(0.0f32..640.0);
        data[ANCHORS + anchor] = rng.random_range(0.0f32..640.0);
        data[2 * ANCHORS + anchor] = rng.random_range(4.0f32..200.0);
        data[3 * ANCHORS + anchor] = rng.random_range(4.0f32..200.0);
    }
    for value in data[4 * ANCHORS..].iter_mut() {
        *value = rng.random_range(0.0f32..1.0);
    }
    data
}

#[test]
fn parallel_batch_matches_sequential_postprocess() {
    let labels = ClassLabelTable::new(["a", "b", "c", "d", "e"]).unwrap();
    let pipeline = Pipeline::new(PipelineConfig::default(), labels, ANCHORS).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    let outputs: Vec<Vec<f32>> = (0..12).map(|_| random_output(&mut rng, 5)).collect();
    let sizes: Vec<(usize, usize)> = (0..12).map(|i| (320 + i * 40, 240 + i * 30)).collect();
    let items: Vec<BatchItem<'_>> = outputs
        .iter()
        .zip(&sizes)
        .map(|(output, size)| BatchItem {
            output,
            image_size: *size,
        })
        .collect();

    let batch = pipeline.postprocess_batch(&items).unwrap();
    for (item, parallel) in items.iter().zip(&batch) {
        let sequential = pipeline.postprocess(item.output, item.image_size).unwrap();
        assert_eq!(&sequential, parallel);
    }
}
