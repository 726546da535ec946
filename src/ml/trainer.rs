// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop using Burn's DataLoader and the SGD optimiser:
//
//   for each epoch:
//     for each batch:  forward → loss → backward → optim.step
//     validation on model.valid() (inner backend, no autodiff)
//     checkpoint + metrics row
//
// Key Burn insight:
//   - Training uses Autodiff<Backend> for gradients
//   - model.valid() returns the model on the inner backend
//   - The validation loader therefore batches onto the inner
//     backend as well; both share the same device type
//
// Reference: Burn Book §5 (Custom training loop)

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::{AutodiffModule, Module},
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::{ImageBatch, ImageBatcher}, dataset::ImageDataset};
use crate::domain::settings::BackendKind;
use crate::infra::{checkpoint::CheckpointManager, metrics::{EpochMetrics, MetricsLogger}};
use crate::ml::backend::{cpu_device, gpu_device, CpuAutodiff, GpuAutodiff};
use crate::ml::loss::{classification_loss, correct_predictions};
use crate::ml::model::Mlp;

/// Summary of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub parameter_count: usize,
    pub epochs:          Vec<EpochMetrics>,
    /// Epoch with the lowest validation loss; None without validation data
    pub best_epoch:      Option<usize>,
}

impl TrainingReport {
    pub fn final_metrics(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    /// True when the last epoch's training loss is below the first one's
    pub fn loss_decreased(&self) -> bool {
        match (self.epochs.first(), self.epochs.last()) {
            (Some(first), Some(last)) if self.epochs.len() > 1 => last.train_loss < first.train_loss,
            _ => false,
        }
    }
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainingReport> {
    match cfg.backend {
        BackendKind::Cpu => {
            let device = cpu_device();
            tracing::info!("Using NdArray device: {:?}", device);
            train_loop::<CpuAutodiff>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
        }
        BackendKind::Wgpu => {
            let device = gpu_device();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<GpuAutodiff>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
        }
    }
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainingReport> {
    if train_dataset.sample_count() == 0 {
        bail!("training set is empty");
    }

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    if train_dataset.feature_count() != Some(model_cfg.input_size) {
        bail!(
            "model expects {} inputs but training images have {:?} pixels",
            model_cfg.input_size,
            train_dataset.feature_count()
        );
    }
    let mut model: Mlp<B> = model_cfg.init(&device);
    let parameter_count = model.num_params();
    tracing::info!(
        "Model ready: {} -> {:?} -> {} ({} parameters)",
        model_cfg.input_size, model_cfg.hidden_sizes, model_cfg.num_classes, parameter_count
    );

    // ── SGD optimiser ─────────────────────────────────────────────────────────
    // θ = θ - lr * g                       (plain)
    // v = μ*v + (1-d)*g ; θ = θ - lr * v   (with momentum μ, dampening d)
    let mut optim_cfg = SgdConfig::new();
    if let Some(momentum) = cfg.momentum {
        optim_cfg = optim_cfg.with_momentum(Some(
            MomentumConfig::new().with_momentum(momentum).with_dampening(0.0),
        ));
    }
    let mut optim = optim_cfg.init::<B, Mlp<B>>();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let batcher = ImageBatcher::new(cfg.normalizer);

    let train_loader: Arc<dyn DataLoader<B, ImageBatch<B>>> = DataLoaderBuilder::new(batcher.clone())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers.max(1))
        .set_device(device.clone())
        .build(train_dataset);

    let val_loader: Arc<dyn DataLoader<B::InnerBackend, ImageBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(batcher)
            .batch_size(cfg.batch_size)
            .num_workers(cfg.num_workers.max(1))
            .set_device(device.clone())
            .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut history  = Vec::with_capacity(cfg.epochs);
    let mut best_val = f64::INFINITY;
    let mut best_epoch = None;

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut running_loss  = 0.0f64;
        let mut train_batches = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.images, batch.targets, cfg.loss);

            running_loss  += loss.clone().into_scalar().elem::<f64>();
            train_batches += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if train_batches > 0 {
            running_loss / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let (val_loss, val_accuracy) = evaluate(&model.valid(), val_loader.as_ref(), cfg);

        let row = EpochMetrics::new(epoch, train_loss, val_loss, val_accuracy);
        tracing::info!(
            "Epoch {:>3}/{} | Training loss: {:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, train_loss, val_loss, val_accuracy * 100.0,
        );

        if row.is_improvement(best_val) {
            best_val   = row.val_loss;
            best_epoch = Some(epoch);
            tracing::debug!("New best validation loss {:.4} at epoch {}", best_val, epoch);
        }

        ckpt_manager.save_model(&model, epoch)?;
        metrics.log(&row)?;
        history.push(row);
    }

    tracing::info!("Training complete!");
    Ok(TrainingReport { parameter_count, epochs: history, best_epoch })
}

/// Average loss and accuracy over a loader. (NaN, 0.0) when it is empty.
fn evaluate<B: Backend>(
    model:  &Mlp<B>,
    loader: &dyn DataLoader<B, ImageBatch<B>>,
    cfg:    &TrainConfig,
) -> (f64, f64) {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut total    = 0usize;

    for batch in loader.iter() {
        let logits = model.forward(batch.images);
        total += batch.targets.dims()[0];

        loss_sum += classification_loss(cfg.loss, logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        correct  += correct_predictions(logits, batch.targets);
        batches  += 1;
    }

    let loss     = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    let accuracy = if total   > 0 { correct as f64 / total as f64 } else { 0.0 };
    (loss, accuracy)
}
