// ============================================================
// Layer 5 — One Training Step, Inspected
// ============================================================
// Runs exactly one optimisation step on one batch and records
// what happened to the first layer's weights along the way:
//
//   1. forward        → logits → loss
//   2. loss.backward  → gradients (Burn autodiff)
//   3. read dLoss/dW for the first Linear layer
//   4. optim.step     → plain SGD: W ← W − lr · dLoss/dW
//   5. forward again  → loss on the same batch after the step
//
// Burn hands back a fresh gradient container from every
// backward() call, so there is no zero_grad() between steps.
//
// Reference: Burn Book §5 (Custom training loop)

use anyhow::{bail, Context, Result};
use burn::{
    optim::{GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::{ImageBatch, ImageBatcher};
use crate::domain::{image::ImageSample, settings::{BackendKind, LossKind}};
use crate::ml::backend::{cpu_device, gpu_device, CpuAutodiff, GpuAutodiff};
use crate::ml::model::{Mlp, MlpConfig};

/// What the `walkthrough` command shows for the single step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub batch_size:      usize,
    pub logits_shape:    [usize; 2],
    pub loss_before:     f32,
    pub loss_after:      f32,
    pub learning_rate:   f64,
    /// Leading values of the first-layer weight, before the step
    pub weight_before:   Vec<f32>,
    /// Same entries of dLoss/dW
    pub gradient:        Vec<f32>,
    /// Same entries after the step
    pub weight_after:    Vec<f32>,
    pub grad_abs_mean:   f32,
    pub max_weight_step: f32,
    /// max |after − (before − lr·grad)| over the whole weight matrix
    pub max_sgd_error:   f32,
}

pub fn run_single_step(
    backend: BackendKind,
    model:   &MlpConfig,
    items:   &[ImageSample],
    batcher: &ImageBatcher,
    loss:    LossKind,
    lr:      f64,
    preview: usize,
) -> Result<StepReport> {
    match backend {
        BackendKind::Cpu => {
            let device = cpu_device();
            let batch  = batcher.to_batch::<CpuAutodiff>(items, &device);
            single_sgd_step(model.init(&device), batch, loss, lr, preview).map(|(_, r)| r)
        }
        BackendKind::Wgpu => {
            let device = gpu_device();
            let batch  = batcher.to_batch::<GpuAutodiff>(items, &device);
            single_sgd_step(model.init(&device), batch, loss, lr, preview).map(|(_, r)| r)
        }
    }
}

/// Take one plain-SGD step and return the updated model with a report.
pub fn single_sgd_step<B: AutodiffBackend>(
    model:   Mlp<B>,
    batch:   ImageBatch<B>,
    loss:    LossKind,
    lr:      f64,
    preview: usize,
) -> Result<(Mlp<B>, StepReport)> {
    if !(lr > 0.0) {
        bail!("learning rate must be positive, got {}", lr);
    }

    let batch_size = batch.targets.dims()[0];
    let before: Vec<f32> = model.first_layer().weight.val().into_data().iter::<f32>().collect();

    // ── Forward + backward ────────────────────────────────────────────────────
    let (loss_tensor, logits) =
        model.forward_loss(batch.images.clone(), batch.targets.clone(), loss);
    let logits_shape = logits.dims();
    let loss_before  = loss_tensor.clone().into_scalar().elem::<f32>();

    let grads = loss_tensor.backward();
    let weight_grad: Vec<f32> = model
        .first_layer()
        .weight
        .grad(&grads)
        .context("first layer weight has no gradient after backward()")?
        .into_data()
        .iter::<f32>()
        .collect();

    // ── SGD step ──────────────────────────────────────────────────────────────
    let grads     = GradientsParams::from_grads(grads, &model);
    let mut optim = SgdConfig::new().init::<B, Mlp<B>>();
    let model     = optim.step(lr, model, grads);

    let after: Vec<f32> = model.first_layer().weight.val().into_data().iter::<f32>().collect();

    let (loss_after_tensor, _) = model.forward_loss(batch.images, batch.targets, loss);
    let loss_after = loss_after_tensor.into_scalar().elem::<f32>();

    // ── Compare against the textbook update ───────────────────────────────────
    let lr32 = lr as f32;
    let mut max_weight_step = 0.0f32;
    let mut max_sgd_error   = 0.0f32;
    for ((b, a), g) in before.iter().zip(&after).zip(&weight_grad) {
        max_weight_step = max_weight_step.max((a - b).abs());
        max_sgd_error   = max_sgd_error.max((a - (b - lr32 * g)).abs());
    }
    let grad_abs_mean =
        weight_grad.iter().map(|g| g.abs()).sum::<f32>() / weight_grad.len().max(1) as f32;

    tracing::debug!(
        "single step: loss {:.4} → {:.4}, max |ΔW| = {:e}",
        loss_before, loss_after, max_weight_step
    );

    let report = StepReport {
        batch_size,
        logits_shape,
        loss_before,
        loss_after,
        learning_rate: lr,
        weight_before: before.iter().take(preview).copied().collect(),
        gradient:      weight_grad.iter().take(preview).copied().collect(),
        weight_after:  after.iter().take(preview).copied().collect(),
        grad_abs_mean,
        max_weight_step,
        max_sgd_error,
    };
    Ok((model, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_items() -> Vec<ImageSample> {
        // Class 0 lights up the left column, class 1 the right column
        (0..8u8)
            .map(|i| {
                let label  = i % 2;
                let pixels = if label == 0 {
                    vec![255.0, 0.0, 255.0, 0.0]
                } else {
                    vec![0.0, 255.0, 0.0, 255.0]
                };
                ImageSample::new(pixels, 2, 2, label)
            })
            .collect()
    }

    fn small_model() -> MlpConfig {
        MlpConfig::new()
            .with_input_size(4)
            .with_hidden_sizes(vec![6])
            .with_num_classes(2)
    }

    #[test]
    fn test_step_follows_sgd_rule() {
        let device = cpu_device();
        let batch  = ImageBatcher::default().to_batch::<CpuAutodiff>(&two_class_items(), &device);
        let model  = small_model().init::<CpuAutodiff>(&device);

        let (_, report) =
            single_sgd_step(model, batch, LossKind::CrossEntropy, 0.1, 5).unwrap();

        assert_eq!(report.batch_size, 8);
        assert_eq!(report.logits_shape, [8, 2]);
        assert_eq!(report.weight_before.len(), 5);
        assert_eq!(report.gradient.len(), 5);
        assert!(report.grad_abs_mean > 0.0, "backward produced an all-zero gradient");
        assert!(report.max_weight_step > 0.0, "step did not move the weights");
        assert!(report.max_sgd_error < 1e-5, "update deviates from W - lr*g by {}", report.max_sgd_error);
    }

    #[test]
    fn test_dispatch_on_cpu() {
        let report = run_single_step(
            BackendKind::Cpu,
            &small_model(),
            &two_class_items(),
            &ImageBatcher::default(),
            LossKind::LogSoftmaxNll,
            0.05,
            3,
        ).unwrap();
        assert_eq!(report.weight_after.len(), 3);
        assert!(report.loss_before.is_finite() && report.loss_after.is_finite());
    }

    #[test]
    fn test_non_positive_lr_rejected() {
        let device = cpu_device();
        let batch  = ImageBatcher::default().to_batch::<CpuAutodiff>(&two_class_items(), &device);
        let model  = small_model().init::<CpuAutodiff>(&device);
        assert!(single_sgd_step(model, batch, LossKind::CrossEntropy, 0.0, 1).is_err());
    }
}
