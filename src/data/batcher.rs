// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ImageSample>
// into tensors the MLP can consume.
//
// How batching works here:
//   Input:  N ImageSamples, each with H*W raw pixels
//   Output: ImageBatch with
//             images  — float tensor [N, H*W] (normalised)
//             targets — int tensor   [N]      (class labels)
//
//   Every image is normalised and appended to one flat Vec,
//   which becomes a 1D tensor and is reshaped to [N, H*W]:
//   [img1_p1, ..., img1_pK, img2_p1, ..., imgN_pK] → [N, K]
//
// The MLP has no notion of rows and columns, so flattening
// here is the notebook's `images.view(images.shape[0], -1)`.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::preprocessor::Normalizer;
use crate::domain::image::ImageSample;

// ─── ImageBatch ───────────────────────────────────────────────────────────────
/// A batch of images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Normalised, flattened images — shape: [batch_size, features]
    pub images: Tensor<B, 2>,

    /// Class labels — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct ImageBatcher {
    normalizer: Normalizer,
}

impl ImageBatcher {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Build a batch on `device`. Panics on an empty item list,
    /// which the DataLoader never produces.
    pub fn to_batch<B: Backend>(&self, items: &[ImageSample], device: &B::Device) -> ImageBatch<B> {
        let batch_size = items.len();
        let features   = items[0].feature_count();

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| self.normalizer.normalize(&s.pixels))
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let images = Tensor::<B, 1>::from_floats(flat.as_slice(), device)
            .reshape([batch_size, features]);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device);

        ImageBatch { images, targets }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// The DataLoader calls .batch(items, device) with each mini-batch.
impl<B: Backend> Batcher<B, ImageSample, ImageBatch<B>> for ImageBatcher {
    fn batch(&self, items: Vec<ImageSample>, device: &B::Device) -> ImageBatch<B> {
        self.to_batch(&items, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device  = Default::default();
        let items   = vec![
            ImageSample::new(vec![0.0, 255.0, 0.0, 255.0], 2, 2, 3),
            ImageSample::new(vec![255.0; 4], 2, 2, 7),
            ImageSample::new(vec![0.0; 4], 2, 2, 1),
        ];
        let batch: ImageBatch<TestBackend> = ImageBatcher::default().to_batch(&items, &device);

        assert_eq!(batch.images.dims(), [3, 4]);
        assert_eq!(batch.targets.dims(), [3]);

        let pixels: Vec<f32> = batch.images.into_data().iter::<f32>().collect();
        assert_eq!(&pixels[..4], &[-1.0, 1.0, -1.0, 1.0]);
        assert!(pixels[4..8].iter().all(|&p| p == 1.0));

        let labels: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(labels, vec![3, 7, 1]);
    }
}
