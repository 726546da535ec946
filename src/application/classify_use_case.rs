// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Loads the trained network from a checkpoint directory and
// classifies one image of the test split.
//
// The data source recorded in train_config.json is reused, so
// the image comes from the same dataset the model was trained
// on.

use anyhow::{Context, Result};

use crate::data::loader::open_source;
use crate::domain::{
    image::{ImageSample, Split},
    prediction::Prediction,
    settings::BackendKind,
    traits::ImageClassifier,
};
use crate::application::train_use_case::TrainConfig;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::load_classifier;

pub struct ClassifyUseCase {
    config:     TrainConfig,
    classifier: Box<dyn ImageClassifier>,
}

impl ClassifyUseCase {
    /// `backend` overrides the backend the model was trained on.
    pub fn new(checkpoint_dir: &str, backend: Option<BackendKind>) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir);
        let config     = ckpt.load_config()?;
        let backend    = backend.unwrap_or(config.backend);
        let classifier = load_classifier(&ckpt, backend)?;
        Ok(Self { config, classifier })
    }

    /// Classify test image number `index`.
    pub fn classify_test_image(&self, index: usize) -> Result<(ImageSample, Prediction)> {
        let source = open_source(self.config.data_source, &self.config.data_dir, Some(index + 1));
        let image  = source
            .load(Split::Test)?
            .into_iter()
            .nth(index)
            .with_context(|| format!("test split has no image at index {index}"))?;

        let prediction = self.classifier.classify(&image)?;
        tracing::info!(
            "Test image {}: label {}, predicted {} ({:.1}%)",
            index,
            image.label,
            prediction.class(),
            prediction.confidence() * 100.0
        );
        Ok((image, prediction))
    }
}
