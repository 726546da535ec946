// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between image files on disk and tensor batches.
//
//   MNIST download / IDX files
//       │
//       ▼
//   MnistSource / IdxSource  → Vec<ImageSample> (raw pixels)
//       │
//       ▼
//   split_train_val          → seeded shuffle, train/val split
//       │
//       ▼
//   ImageDataset             → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher             → normalises + stacks into tensors
//       │
//       ▼
//   DataLoader (Burn)        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads labelled images (Burn MNIST or local IDX files)
pub mod loader;

/// Scales raw pixel intensities to [-1, 1]
pub mod preprocessor;

/// Implements Burn's Dataset trait for image samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
