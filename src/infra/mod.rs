// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence that doesn't belong to any single
// business layer:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   the Mlp parameters to disk, and stores the
//                   TrainConfig as JSON so inference can
//                   rebuild the same architecture.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss, accuracy)
//                   to a CSV file for plotting learning curves.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
