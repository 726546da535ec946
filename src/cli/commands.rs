// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their configurable
// flags. Each subcommand is one stage of the walkthrough:
//
//   autograd     — differentiate mean(x²) and check dz/dx
//   walkthrough  — loss, backward and one SGD step on a batch
//   train        — the full epoch loop
//   classify     — class probabilities for one test image
//
// clap's derive macros generate --help, error messages for
// bad values, and string → number / enum conversion.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::Normalizer;
use crate::domain::{
    image::LabelSet,
    settings::{BackendKind, DataSourceKind, LossKind},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run autograd on y = x², z = mean(y) and compare dz/dx with 2x/n
    Autograd(AutogradArgs),

    /// Compute the loss on one batch, backpropagate and take one SGD step
    Walkthrough(WalkthroughArgs),

    /// Train the MLP with SGD for a number of epochs
    Train(TrainArgs),

    /// Show the predicted class probabilities for one test image
    Classify(ClassifyArgs),
}

// ─── Value enums ──────────────────────────────────────────────────────────────
// The application layer never sees clap types; these map onto
// the domain enums through From impls.

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    /// NdArray on the CPU
    Cpu,
    /// WGPU on the GPU
    Wgpu,
}

impl From<BackendArg> for BackendKind {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Cpu  => BackendKind::Cpu,
            BackendArg::Wgpu => BackendKind::Wgpu,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LossArg {
    /// Cross-entropy on the logits
    CrossEntropy,
    /// log_softmax followed by negative log-likelihood
    Nll,
}

impl From<LossArg> for LossKind {
    fn from(l: LossArg) -> Self {
        match l {
            LossArg::CrossEntropy => LossKind::CrossEntropy,
            LossArg::Nll          => LossKind::LogSoftmaxNll,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SourceArg {
    /// Download MNIST through Burn
    Mnist,
    /// Read IDX files from --data-dir
    Idx,
}

impl From<SourceArg> for DataSourceKind {
    fn from(s: SourceArg) -> Self {
        match s {
            SourceArg::Mnist => DataSourceKind::Mnist,
            SourceArg::Idx   => DataSourceKind::Idx,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LabelArg {
    Digits,
    Fashion,
}

impl From<LabelArg> for LabelSet {
    fn from(l: LabelArg) -> Self {
        match l {
            LabelArg::Digits  => LabelSet::Digits,
            LabelArg::Fashion => LabelSet::Fashion,
        }
    }
}

// ─── Shared argument groups ───────────────────────────────────────────────────

/// Where images come from
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Image source
    #[arg(long, value_enum, default_value_t = SourceArg::Mnist)]
    pub source: SourceArg,

    /// Directory with IDX files (used with --source idx)
    #[arg(long, default_value = "data/mnist")]
    pub data_dir: String,

    /// Only use the first N images of each split (walkthrough: caps the batch)
    #[arg(long)]
    pub max_samples: Option<usize>,
}

/// Network and loss shape shared by walkthrough and train
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [128usize, 64])]
    pub hidden: Vec<usize>,

    /// Number of output classes
    #[arg(long, default_value_t = 10)]
    pub num_classes: usize,

    /// Loss formulation
    #[arg(long, value_enum, default_value_t = LossArg::CrossEntropy)]
    pub loss: LossArg,

    /// Tensor backend
    #[arg(long, value_enum, default_value_t = BackendArg::Cpu)]
    pub backend: BackendArg,

    /// Mean subtracted after scaling pixels to [0, 1]
    #[arg(long, default_value_t = 0.5)]
    pub norm_mean: f32,

    /// Standard deviation divided out after the mean
    #[arg(long, default_value_t = 0.5)]
    pub norm_std: f32,
}

impl ModelArgs {
    fn normalizer(&self) -> Result<Normalizer> {
        Normalizer::new(self.norm_mean, self.norm_std)
    }
}

// ─── Per-command arguments ────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AutogradArgs {
    #[arg(long, default_value_t = 2)]
    pub rows: usize,

    #[arg(long, default_value_t = 2)]
    pub cols: usize,

    #[arg(long, value_enum, default_value_t = BackendArg::Cpu)]
    pub backend: BackendArg,
}

#[derive(Args, Debug)]
pub struct WalkthroughArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of images in the single batch
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Learning rate for the single SGD step
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// How many first-layer weights to print before/after the step
    #[arg(long, default_value_t = 6)]
    pub preview: usize,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Directory to save model checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of images processed together in one forward pass
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// SGD learning rate
    #[arg(long, default_value_t = 0.003)]
    pub lr: f64,

    /// SGD momentum (plain SGD when omitted)
    #[arg(long)]
    pub momentum: Option<f64>,

    /// Fraction of the training split held out for validation
    #[arg(long, default_value_t = 0.1)]
    pub val_fraction: f64,

    /// Seed for the train/validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data loading worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// Fails on an invalid --norm-std.
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = anyhow::Error;

    fn try_from(a: TrainArgs) -> Result<Self> {
        let normalizer = a.model.normalizer()?;
        Ok(TrainConfig {
            data_source:    a.data.source.into(),
            data_dir:       a.data.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            max_samples:    a.data.max_samples,
            val_fraction:   a.val_fraction,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            momentum:       a.momentum,
            hidden_sizes:   a.model.hidden,
            num_classes:    a.model.num_classes,
            loss:           a.model.loss.into(),
            backend:        a.model.backend.into(),
            normalizer,
            seed:           a.seed,
            num_workers:    a.num_workers,
            ..TrainConfig::default()
        })
    }
}

impl TryFrom<WalkthroughArgs> for TrainConfig {
    type Error = anyhow::Error;

    fn try_from(a: WalkthroughArgs) -> Result<Self> {
        let normalizer = a.model.normalizer()?;
        Ok(TrainConfig {
            data_source:  a.data.source.into(),
            data_dir:     a.data.data_dir,
            max_samples:  a.data.max_samples,
            batch_size:   a.batch_size,
            lr:           a.lr,
            hidden_sizes: a.model.hidden,
            num_classes:  a.model.num_classes,
            loss:         a.model.loss.into(),
            backend:      a.model.backend.into(),
            normalizer,
            ..TrainConfig::default()
        })
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Index of the test image to classify
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Class names to print
    #[arg(long, value_enum, default_value_t = LabelArg::Digits)]
    pub labels: LabelArg,

    /// Run inference on this backend instead of the training one
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}
