// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. Model weights (.mpk.gz file) — all learned parameters
//   2. latest_epoch.json            — which epoch was last saved
//   3. train_config.json            — run configuration
//
// The config is saved separately because the recorder only
// stores parameter values. Inference needs input_size,
// hidden_sizes and num_classes to rebuild an Mlp with the
// right shapes before the weights can be loaded into it.
//
// File naming convention:
//   checkpoints/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz   ← weights after epoch 2
//     ...
//     latest_epoch.json      ← contains the number of latest epoch
//     train_config.json      ← TrainConfig as JSON
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Mlp;

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        // `mkdir -p`; a failure surfaces again on the first write
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Could not create checkpoint dir '{}': {}", dir.display(), e);
        }
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save model weights for a given epoch and point latest_epoch.json at them.
    pub fn save_model<B: Backend>(&self, model: &Mlp<B>, epoch: usize) -> Result<()> {
        // Recorder appends the .mpk.gz extension itself
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest checkpoint into `model`, which must have the
    /// same architecture as the one that was saved.
    pub fn load_model<B: Backend>(&self, model: Mlp<B>, device: &B::Device) -> Result<Mlp<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        model
            .load_file(path.clone(), &CompactRecorder::new(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'classify'.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Epoch number stored in latest_epoch.json.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::backend::{cpu_device, CpuBackend};

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mlp-walkthrough-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = scratch_dir("ckpt-config");
        let ckpt = CheckpointManager::new(&dir);

        let cfg = TrainConfig { hidden_sizes: vec![32], epochs: 3, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();

        assert_eq!(loaded.hidden_sizes, vec![32]);
        assert_eq!(loaded.epochs, 3);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_model_round_trip_restores_weights() {
        let dir    = scratch_dir("ckpt-model");
        let ckpt   = CheckpointManager::new(&dir);
        let device = cpu_device();
        let cfg    = TrainConfig {
            input_size: 6, hidden_sizes: vec![4], num_classes: 3,
            ..TrainConfig::default()
        };

        let trained: Mlp<CpuBackend> = cfg.model_config().init(&device);
        ckpt.save_model(&trained, 1).unwrap();
        ckpt.save_model(&trained, 2).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);

        // A freshly initialised model has different random weights
        let fresh: Mlp<CpuBackend> = cfg.model_config().init(&device);
        let restored = ckpt.load_model(fresh, &device).unwrap();

        let expected: Vec<f32> = trained.first_layer().weight.val().into_data().iter::<f32>().collect();
        let actual:   Vec<f32> = restored.first_layer().weight.val().into_data().iter::<f32>().collect();
        // CompactRecorder stores half precision
        assert_eq!(expected.len(), actual.len());
        for (e, a) in expected.iter().zip(&actual) {
            assert!((e - a).abs() < 1e-3, "saved {e}, restored {a}");
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir  = scratch_dir("ckpt-missing");
        let ckpt = CheckpointManager::new(&dir);
        assert!(ckpt.latest_epoch().is_err());
        assert!(ckpt.load_config().is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
