// ============================================================
// Layer 2 — Walkthrough Use Case
// ============================================================
// The explanatory part of the tool, one method per stage:
//
//   autograd()    — differentiate z = mean(x²) with Burn's
//                   Autodiff backend and compare to 2x/n
//
//   single_step() — load one batch, build the MLP, compute
//                   the loss, backpropagate, take one SGD step
//                   and report how the first layer changed
//
// The full epoch loop lives in TrainUseCase.

use anyhow::Result;

use crate::data::{batcher::ImageBatcher, loader::open_source};
use crate::domain::{image::Split, settings::BackendKind};
use crate::application::train_use_case::{check_samples, TrainConfig};
use crate::ml::{
    autograd::{run_square_mean, AutogradDemo},
    inspect::{run_single_step, StepReport},
};

pub struct WalkthroughUseCase {
    config: TrainConfig,
}

impl WalkthroughUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn autograd(backend: BackendKind, rows: usize, cols: usize) -> Result<AutogradDemo> {
        tracing::info!("Differentiating mean(x²) for a {}x{} tensor", rows, cols);
        run_square_mean(backend, rows, cols)
    }

    /// One forward/backward/update cycle on the first `batch_size` training images.
    pub fn single_step(&self, preview: usize) -> Result<StepReport> {
        self.config.validate()?;
        let cfg = &self.config;

        // --max-samples can only shrink the batch
        let take   = cfg.max_samples.map_or(cfg.batch_size, |m| m.min(cfg.batch_size));
        let source = open_source(cfg.data_source, &cfg.data_dir, Some(take));
        tracing::info!("Loading one batch of {} images from {}", take, source.describe());
        let items = source.load(Split::Train)?;

        let input_size = check_samples(&items, cfg.num_classes)?;
        let model_cfg  = TrainConfig { input_size, ..cfg.clone() }.model_config();

        run_single_step(
            cfg.backend,
            &model_cfg,
            &items,
            &ImageBatcher::new(cfg.normalizer),
            cfg.loss,
            cfg.lr,
            preview,
        )
    }
}
