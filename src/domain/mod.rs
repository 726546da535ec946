// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits describing the core
// concepts of the walkthrough: images, labels, predictions
// and the options a run is configured with.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Tensors (images, labels, weights, gradients) only exist in
// Layer 5. By the time data reaches this layer it is plain
// Vec<f32> / u8 values that can be tested without a device.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A single labelled image and the dataset split it came from
pub mod image;

// Softmax output for one image
pub mod prediction;

// Serialisable run options (backend, loss, data source)
pub mod settings;

// Core abstractions (traits) that other layers implement
pub mod traits;
