// ============================================================
// Layer 3 — Run Settings
// ============================================================
// Small enums that select how a run behaves. They are plain
// serde types so they can be stored in train_config.json;
// the CLI layer maps its clap ValueEnums onto these.

use serde::{Deserialize, Serialize};

/// Which Burn backend executes the tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// NdArray on the CPU
    #[default]
    Cpu,
    /// WGPU (Vulkan / Metal / DX12)
    Wgpu,
}

/// How the classification loss is computed from the logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LossKind {
    /// Cross-entropy directly on the logits
    #[default]
    CrossEntropy,
    /// log_softmax followed by negative log-likelihood
    LogSoftmaxNll,
}

/// Where the images come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataSourceKind {
    /// MNIST downloaded and cached by Burn
    #[default]
    Mnist,
    /// IDX files in a local directory (MNIST, Fashion-MNIST, ...)
    Idx,
}
