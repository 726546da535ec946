// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so the
// image source (Burn's MNIST download or local IDX files) can
// be swapped without touching the use cases.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::image::{ImageSample, Split};
use crate::domain::prediction::Prediction;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can load labelled images.
///
/// Implementations:
///   - MnistSource → Burn's vision::MnistDataset (downloads on first use)
///   - IdxSource   → IDX files from a local directory
pub trait ImageSource {
    /// Load every sample of the given split.
    fn load(&self, split: Split) -> Result<Vec<ImageSample>>;

    /// Short name used in log lines
    fn describe(&self) -> String;
}

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// Anything that turns an image into class probabilities.
///
/// Implementations:
///   - Inferencer → the trained MLP restored from a checkpoint
pub trait ImageClassifier {
    fn classify(&self, image: &ImageSample) -> Result<Prediction>;
}
