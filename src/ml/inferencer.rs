// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{bail, Result};
use burn::prelude::*;

use crate::data::batcher::ImageBatcher;
use crate::domain::{
    image::ImageSample,
    prediction::Prediction,
    settings::BackendKind,
    traits::ImageClassifier,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{cpu_device, gpu_device, CpuBackend, GpuBackend};
use crate::ml::model::Mlp;

pub struct Inferencer<B: Backend> {
    model:      Mlp<B>,
    batcher:    ImageBatcher,
    input_size: usize,
    device:     B::Device,
}

/// Restore the latest checkpoint on the requested backend.
pub fn load_classifier(
    ckpt_manager: &CheckpointManager,
    backend:      BackendKind,
) -> Result<Box<dyn ImageClassifier>> {
    Ok(match backend {
        BackendKind::Cpu  => Box::new(Inferencer::<CpuBackend>::from_checkpoint(ckpt_manager, cpu_device())?),
        BackendKind::Wgpu => Box::new(Inferencer::<GpuBackend>::from_checkpoint(ckpt_manager, gpu_device())?),
    })
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = cfg.model_config().init::<B>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self::new(model, ImageBatcher::new(cfg.normalizer), cfg.input_size, device))
    }

    pub fn new(model: Mlp<B>, batcher: ImageBatcher, input_size: usize, device: B::Device) -> Self {
        Self { model, batcher, input_size, device }
    }

    pub fn predict(&self, image: &ImageSample) -> Result<Prediction> {
        if image.feature_count() != self.input_size {
            bail!(
                "image has {} pixels but the model expects {}",
                image.feature_count(),
                self.input_size
            );
        }

        let batch = self.batcher.to_batch::<B>(std::slice::from_ref(image), &self.device);
        let probabilities: Vec<f32> = self
            .model
            .probabilities(batch.images)
            .into_data()
            .iter::<f32>()
            .collect();

        Ok(Prediction::new(probabilities))
    }
}

impl<B: Backend> ImageClassifier for Inferencer<B> {
    fn classify(&self, image: &ImageSample) -> Result<Prediction> {
        self.predict(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use burn::module::Param;

    #[test]
    fn test_checkpoint_round_trip_predictions() {
        let dir = std::env::temp_dir()
            .join(format!("mlp-walkthrough-infer-{}", std::process::id()));
        let ckpt   = CheckpointManager::new(&dir);
        let device = cpu_device();
        let cfg    = TrainConfig {
            input_size: 4, hidden_sizes: vec![5], num_classes: 3,
            ..TrainConfig::default()
        };
        ckpt.save_config(&cfg).unwrap();

        let mut model: Mlp<CpuBackend> = cfg.model_config().init(&device);
        // A clear favourite so the class cannot flip on rounding
        model.output.bias = Some(Param::from_tensor(Tensor::from_floats([0.0, 4.0, 0.0], &device)));
        ckpt.save_model(&model, 1).unwrap();

        let image    = ImageSample::new(vec![0.0, 64.0, 128.0, 255.0], 2, 2, 1);
        let original = Inferencer::new(model, ImageBatcher::new(cfg.normalizer), 4, device)
            .predict(&image)
            .unwrap();

        let restored = load_classifier(&ckpt, BackendKind::Cpu).unwrap();
        let again    = restored.classify(&image).unwrap();

        assert_eq!(again.probabilities.len(), 3);
        let sum: f32 = again.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // Weights come back at half precision
        for (a, b) in original.probabilities.iter().zip(&again.probabilities) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
        assert_eq!(original.class(), 1);
        assert_eq!(again.class(), original.class());

        // Wrong image size is reported, not a tensor panic
        let wrong = ImageSample::new(vec![0.0; 9], 3, 3, 0);
        assert!(restored.classify(&wrong).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
