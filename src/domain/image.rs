// ============================================================
// Layer 3 — ImageSample Domain Type
// ============================================================
// One grayscale image plus its class label.
//
// Pixels are kept as raw intensities in [0, 255], row-major.
// Normalisation happens later in the batcher so the same
// sample can be rendered to the terminal and fed to the model.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A labelled grayscale image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// Raw pixel intensities, row-major, `width * height` values
    pub pixels: Vec<f32>,
    pub width:  usize,
    pub height: usize,
    /// Class index (0..num_classes)
    pub label:  u8,
}

impl ImageSample {
    pub fn new(pixels: Vec<f32>, width: usize, height: usize, label: u8) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self { pixels, width, height, label }
    }

    /// Number of input features once the image is flattened
    pub fn feature_count(&self) -> usize {
        self.width * self.height
    }
}

/// Which half of a dataset to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// Human readable class names for the two IDX datasets we know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelSet {
    #[default]
    Digits,
    Fashion,
}

const DIGIT_NAMES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const FASHION_NAMES: [&str; 10] = [
    "T-shirt/top", "Trouser", "Pullover", "Dress", "Coat",
    "Sandal", "Shirt", "Sneaker", "Bag", "Ankle boot",
];

impl LabelSet {
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            LabelSet::Digits  => &DIGIT_NAMES,
            LabelSet::Fashion => &FASHION_NAMES,
        }
    }

    /// Name of a class index, falling back to the number itself
    pub fn name(&self, class: usize) -> String {
        self.names()
            .get(class)
            .map(|s| s.to_string())
            .unwrap_or_else(|| class.to_string())
    }
}
