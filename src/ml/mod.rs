// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code apart
// from the Dataset/Batcher glue in Layer 4.
//
// Nothing here implements differentiation or optimisation
// math: gradients come from Burn's Autodiff backend and the
// parameter update from Burn's Sgd optimiser. This layer only
// wires those pieces together.
//
// What's in this layer:
//
//   backend.rs    — concrete backends (NdArray / Wgpu) and devices
//
//   model.rs      — the MLP: (Linear → ReLU)* → Linear, outputs logits
//
//   loss.rs       — cross-entropy and log-softmax + NLL, accuracy
//
//   autograd.rs   — y = x², z = mean(y), z.backward(), dz/dx = 2x/n
//
//   inspect.rs    — one forward/backward/SGD step with the first
//                   layer's weights and gradient captured
//
//   trainer.rs    — the epoch loop with validation and checkpoints
//
//   inferencer.rs — loads a checkpoint, returns class probabilities
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Backend type aliases and devices
pub mod backend;

/// Multi-layer perceptron classifier
pub mod model;

/// Classification loss functions
pub mod loss;

/// Autograd demonstration on a small tensor
pub mod autograd;

/// Single inspected SGD step
pub mod inspect;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and predicts classes
pub mod inferencer;
