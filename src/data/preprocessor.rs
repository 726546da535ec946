// ============================================================
// Layer 4 — Pixel Normaliser
// ============================================================
// Scales raw 8-bit intensities before they reach the network.
//
// Two steps, applied per pixel:
//   1. x / 255            → [0, 1]
//   2. (x - mean) / std   → centred around zero
//
// With the default mean = 0.5 and std = 0.5 the result lies
// in [-1, 1]: black (0) becomes -1, white (255) becomes 1.
//
// Centred inputs keep the first layer's pre-activations small
// at initialisation, which is what lets a plain SGD step with
// a small learning rate make visible progress.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const MAX_INTENSITY: f32 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    mean: f32,
    std:  f32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { mean: 0.5, std: 0.5 }
    }
}

impl Normalizer {
    pub fn new(mean: f32, std: f32) -> Result<Self> {
        Self { mean, std }.validated()
    }

    /// Also used on values read back from train_config.json
    pub fn validated(self) -> Result<Self> {
        if !(self.std > 0.0) || !self.std.is_finite() {
            bail!("normalisation std must be a positive number, got {}", self.std);
        }
        if !self.mean.is_finite() {
            bail!("normalisation mean must be finite, got {}", self.mean);
        }
        Ok(self)
    }

    pub fn apply(&self, pixel: f32) -> f32 {
        (pixel / MAX_INTENSITY - self.mean) / self.std
    }

    /// Normalise a whole image (row-major pixels) into a new Vec
    pub fn normalize(&self, pixels: &[f32]) -> Vec<f32> {
        pixels.iter().map(|&p| self.apply(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_maps_to_unit_range() {
        let n = Normalizer::default();
        assert_eq!(n.normalize(&[0.0, 255.0]), vec![-1.0, 1.0]);
        assert!((n.apply(127.5)).abs() < 1e-6);
    }

    #[test]
    fn test_custom_statistics() {
        // Classic MNIST mean/std
        let n = Normalizer::new(0.1307, 0.3081).unwrap();
        let expected = (1.0 - 0.1307) / 0.3081;
        assert!((n.apply(255.0) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_non_positive_std() {
        assert!(Normalizer::new(0.5, 0.0).is_err());
        assert!(Normalizer::new(0.5, -1.0).is_err());
        assert!(Normalizer::new(0.5, f32::NAN).is_err());
    }
}
