// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate hyperparameters
//   Step 2: Load the training images        (Layer 4 - data)
//   Step 3: Check labels / infer input size (Layer 4 - data)
//   Step 4: Split train/validation          (Layer 4 - data)
//   Step 5: Build Burn datasets             (Layer 4 - data)
//   Step 6: Save config, open metrics log   (Layer 6 - infra)
//   Step 7: Run training loop               (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ImageDataset,
    loader::open_source,
    preprocessor::Normalizer,
    splitter::split_train_val,
};
use crate::domain::{
    image::{ImageSample, Split},
    settings::{BackendKind, DataSourceKind, LossKind},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::model::MlpConfig;
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoints and
// reloaded to rebuild the model for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_source:    DataSourceKind,
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub max_samples:    Option<usize>,
    pub val_fraction:   f64,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub momentum:       Option<f64>,
    pub input_size:     usize,
    pub hidden_sizes:   Vec<usize>,
    pub num_classes:    usize,
    pub loss:           LossKind,
    pub normalizer:     Normalizer,
    pub backend:        BackendKind,
    pub seed:           u64,
    pub num_workers:    usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_source:    DataSourceKind::Mnist,
            data_dir:       "data/mnist".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            max_samples:    None,
            val_fraction:   0.1,
            batch_size:     64,
            epochs:         5,
            lr:             0.003,
            momentum:       None,
            input_size:     784,
            hidden_sizes:   vec![128, 64],
            num_classes:    10,
            loss:           LossKind::CrossEntropy,
            normalizer:     Normalizer::default(),
            backend:        BackendKind::Cpu,
            seed:           42,
            num_workers:    1,
        }
    }
}

impl TrainConfig {
    /// Architecture part of the config, as a Burn Config
    pub fn model_config(&self) -> MlpConfig {
        MlpConfig::new()
            .with_input_size(self.input_size)
            .with_hidden_sizes(self.hidden_sizes.clone())
            .with_num_classes(self.num_classes)
    }

    /// Reject settings that would make training meaningless or panic.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if !(self.lr > 0.0) || !self.lr.is_finite() {
            bail!("learning rate must be a positive number, got {}", self.lr);
        }
        if let Some(m) = self.momentum {
            if !(0.0..1.0).contains(&m) {
                bail!("momentum must be in [0, 1), got {}", m);
            }
        }
        if !(0.0..=1.0).contains(&self.val_fraction) {
            bail!("validation fraction must be in [0, 1], got {}", self.val_fraction);
        }
        if self.num_classes < 2 {
            bail!("a classifier needs at least 2 classes, got {}", self.num_classes);
        }
        if self.hidden_sizes.iter().any(|&w| w == 0) {
            bail!("hidden layer widths must be non-zero, got {:?}", self.hidden_sizes);
        }
        self.normalizer.validated()?;
        Ok(())
    }
}

/// Every sample must have the same size and a label inside the class range.
/// Returns the shared flattened feature count.
pub fn check_samples(samples: &[ImageSample], num_classes: usize) -> Result<usize> {
    let Some(first) = samples.first() else {
        bail!("no images were loaded");
    };
    let features = first.feature_count();

    for (i, s) in samples.iter().enumerate() {
        if s.feature_count() != features {
            bail!(
                "image {} is {}x{} but image 0 is {}x{}",
                i, s.width, s.height, first.width, first.height
            );
        }
        if s.label as usize >= num_classes {
            bail!("image {} has label {} but only {} classes are configured", i, s.label, num_classes);
        }
    }
    Ok(features)
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingReport> {
        // ── Step 1: Validate ──────────────────────────────────────────────────
        self.config.validate()?;
        let mut cfg = self.config.clone();

        // ── Step 2: Load images ───────────────────────────────────────────────
        let source = open_source(cfg.data_source, &cfg.data_dir, cfg.max_samples);
        tracing::info!("Loading training images from {}", source.describe());
        let samples = source.load(Split::Train)?;
        tracing::info!("Loaded {} images", samples.len());

        // ── Step 3: Check labels, take input size from the data ───────────────
        cfg.input_size = check_samples(&samples, cfg.num_classes)?;

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) =
            split_train_val(samples, 1.0 - cfg.val_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );
        if val_samples.is_empty() {
            tracing::warn!("Validation set is empty; val_loss will be NaN and val_accuracy 0");
        }

        // ── Step 5: Build Burn datasets ───────────────────────────────────────
        let train_dataset = ImageDataset::new(train_samples);
        let val_dataset   = ImageDataset::new(val_samples);

        // ── Step 6: Persist config, open metrics log ──────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        let report = run_training(&cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)?;
        tracing::info!(
            "Checkpoints in '{}', metrics written to '{}'",
            ckpt_manager.dir().display(),
            metrics.csv_path().display()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_hyperparameters() {
        let bad = [
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { lr: 0.0, ..TrainConfig::default() },
            TrainConfig { lr: f64::NAN, ..TrainConfig::default() },
            TrainConfig { momentum: Some(1.0), ..TrainConfig::default() },
            TrainConfig { val_fraction: 1.5, ..TrainConfig::default() },
            TrainConfig { num_classes: 1, ..TrainConfig::default() },
            TrainConfig { hidden_sizes: vec![64, 0], ..TrainConfig::default() },
            serde_json::from_str::<TrainConfig>(
                &serde_json::to_string(&TrainConfig::default())
                    .unwrap()
                    .replace("\"std\":0.5", "\"std\":0.0"),
            )
            .unwrap(),
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "accepted {cfg:?}");
        }
    }

    #[test]
    fn test_check_samples() {
        let ok = vec![
            ImageSample::new(vec![0.0; 4], 2, 2, 0),
            ImageSample::new(vec![0.0; 4], 2, 2, 9),
        ];
        assert_eq!(check_samples(&ok, 10).unwrap(), 4);

        let bad_label = vec![ImageSample::new(vec![0.0; 4], 2, 2, 10)];
        assert!(check_samples(&bad_label, 10).is_err());

        let mixed = vec![
            ImageSample::new(vec![0.0; 4], 2, 2, 0),
            ImageSample::new(vec![0.0; 9], 3, 3, 0),
        ];
        assert!(check_samples(&mixed, 10).is_err());

        assert!(check_samples(&[], 10).is_err());
    }

    #[test]
    fn test_model_config_follows_train_config() {
        let cfg = TrainConfig { input_size: 16, hidden_sizes: vec![8], num_classes: 4, ..TrainConfig::default() };
        let m   = cfg.model_config();
        assert_eq!((m.input_size, m.hidden_sizes.clone(), m.num_classes), (16, vec![8], 4));
    }
}
