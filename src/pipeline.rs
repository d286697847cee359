//! End-to-end detection pipeline.
//!
//! `Pipeline` owns validated configuration for the three stages and a label
//! table. It holds no per-call state, so one instance can serve any number of
//! images, from any number of threads.

use std::error::Error;

use crate::candidate::nms::{NmsConfig, NonMaxSuppressor};
use crate::decode::{DecodeConfig, ModelOutput, OutputDecoder};
use crate::detection::Detection;
use crate::image::ChannelSampler;
use crate::labels::ClassLabelTable;
use crate::preprocess::{PreprocessConfig, Preprocessor};
use crate::trace::{self, Stage};
use crate::util::{YoloPostError, YoloPostResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Executes the detector on a prepared input tensor.
///
/// Implementations wrap an ML runtime session. The input has
/// [`Pipeline::input_len`] values; the output must be the flat `(4 + C, A)`
/// tensor.
pub trait InferenceBackend {
    fn infer(&mut self, input: &[f32]) -> Result<Vec<f32>, Box<dyn Error + Send + Sync>>;
}

impl<F> InferenceBackend for F
where
    F: FnMut(&[f32]) -> Result<Vec<f32>, Box<dyn Error + Send + Sync>>,
{
    fn infer(&mut self, input: &[f32]) -> Result<Vec<f32>, Box<dyn Error + Send + Sync>> {
        self(input)
    }
}

/// Configuration for all pipeline stages.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub decode: DecodeConfig,
    pub nms: NmsConfig,
}

impl PipelineConfig {
    /// Validates every stage and checks that the decoder expects boxes in the
    /// same input space the preprocessor produces.
    pub fn validate(&self) -> YoloPostResult<()> {
        self.preprocess.validate()?;
        self.decode.validate()?;
        self.nms.validate()?;
        if self.preprocess.input_size != self.decode.input_size {
            return Err(YoloPostError::InvalidConfiguration(
                "preprocess and decode input_size differ",
            ));
        }
        Ok(())
    }
}

/// One model output awaiting post-processing.
#[derive(Clone, Copy, Debug)]
pub struct BatchItem<'a> {
    /// Flat `(4 + C, A)` output tensor.
    pub output: &'a [f32],
    /// Original `(width, height)` of the image the output belongs to.
    pub image_size: (usize, usize),
}

/// Preprocess, decode and suppress with a fixed configuration.
#[derive(Clone, Debug)]
pub struct Pipeline {
    preprocessor: Preprocessor,
    decoder: OutputDecoder,
    suppressor: NonMaxSuppressor,
    labels: ClassLabelTable,
    num_anchors: usize,
}

impl Pipeline {
    /// Builds a pipeline for a model with `num_anchors` anchors and one class
    /// per label.
    pub fn new(
        cfg: PipelineConfig,
        labels: ClassLabelTable,
        num_anchors: usize,
    ) -> YoloPostResult<Self> {
        cfg.validate()?;
        if num_anchors == 0 {
            return Err(YoloPostError::InvalidConfiguration(
                "num_anchors must be positive",
            ));
        }
        Ok(Self {
            preprocessor: Preprocessor::new(cfg.preprocess)?,
            decoder: OutputDecoder::new(cfg.decode)?,
            suppressor: NonMaxSuppressor::new(cfg.nms)?,
            labels,
            num_anchors,
        })
    }

    pub fn labels(&self) -> &ClassLabelTable {
        &self.labels
    }

    pub fn num_anchors(&self) -> usize {
        self.num_anchors
    }

    /// Length of the model input tensor.
    pub fn input_len(&self) -> usize {
        self.preprocessor.tensor_len()
    }

    /// Expected length of the model output tensor.
    pub fn output_len(&self) -> usize {
        (crate::decode::BOX_ROWS + self.labels.len()) * self.num_anchors
    }

    /// Fills `dst` with the model input for `src`.
    pub fn prepare_input<S: ChannelSampler + ?Sized>(
        &self,
        src: &S,
        dst: &mut [f32],
    ) -> YoloPostResult<()> {
        self.preprocessor.preprocess_into(src, dst)
    }

    /// Decodes `output` and removes duplicates.
    pub fn postprocess(
        &self,
        output: &[f32],
        image_size: (usize, usize),
    ) -> YoloPostResult<Vec<Detection>> {
        let _stage = trace::enter(Stage::Postprocess, output.len());
        let output = ModelOutput::new(output, self.labels.len(), self.num_anchors)?;
        let candidates = self.decoder.decode(&output, image_size, &self.labels)?;
        Ok(self.suppressor.suppress(candidates))
    }

    /// Runs the full pipeline on one image through `backend`.
    pub fn detect<S, B>(&self, src: &S, backend: &mut B) -> YoloPostResult<Vec<Detection>>
    where
        S: ChannelSampler + ?Sized,
        B: InferenceBackend + ?Sized,
    {
        let _stage = trace::enter(Stage::Detect, src.width().saturating_mul(src.height()));
        let input = self.preprocessor.preprocess(src)?;
        let output = backend
            .infer(&input)
            .map_err(|err| YoloPostError::Inference {
                reason: err.to_string(),
            })?;
        self.postprocess(&output, (src.width(), src.height()))
    }

    /// Post-processes independent outputs; fails as a whole on the first error.
    ///
    /// Items are processed in parallel with the `rayon` feature. Results keep
    /// the input order either way.
    pub fn postprocess_batch(&self, items: &[BatchItem<'_>]) -> YoloPostResult<Vec<Vec<Detection>>> {
        let _stage = trace::enter(Stage::Batch, items.len());

        #[cfg(feature = "rayon")]
        let results = items
            .par_iter()
            .map(|item| self.postprocess(item.output, item.image_size))
            .collect();

        #[cfg(not(feature = "rayon"))]
        let results = items
            .iter()
            .map(|item| self.postprocess(item.output, item.image_size))
            .collect();

        results
    }
}
