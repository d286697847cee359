//! Stage spans for the detection pipeline.
//!
//! With the `tracing` feature every stage runs inside an info span named
//! `stage` and reports how much it produced. Without the feature the guard is
//! a unit struct and both calls compile away.

/// A unit of work that gets its own span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Preprocess,
    Decode,
    Suppress,
    Postprocess,
    Detect,
    Batch,
}

impl Stage {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::Decode => "decode",
            Stage::Suppress => "nms",
            Stage::Postprocess => "postprocess",
            Stage::Detect => "detect",
            Stage::Batch => "postprocess_batch",
        }
    }
}

#[cfg(feature = "tracing")]
pub(crate) type StageGuard = tracing::span::EnteredSpan;

#[cfg(not(feature = "tracing"))]
pub(crate) struct StageGuard;

/// Enters the span for `stage`.
///
/// `input` is the stage's natural size: source pixels, anchors, candidates or
/// batch items.
#[cfg(feature = "tracing")]
pub(crate) fn enter(stage: Stage, input: usize) -> StageGuard {
    tracing::info_span!("stage", stage = stage.name(), input).entered()
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn enter(_stage: Stage, _input: usize) -> StageGuard {
    StageGuard
}

/// Records how many tensor values or detections `stage` produced.
#[inline]
pub(crate) fn finished(stage: Stage, output: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(stage = stage.name(), output, "stage finished");
    #[cfg(not(feature = "tracing"))]
    let _ = (stage.name(), output);
}
