use burn::data::dataset::Dataset;

use crate::domain::image::ImageSample;

/// In-memory image dataset handed to Burn's DataLoader.
pub struct ImageDataset {
    samples: Vec<ImageSample>,
}

impl ImageDataset {
    pub fn new(samples: Vec<ImageSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Flattened feature count of the first sample (all samples share it)
    pub fn feature_count(&self) -> Option<usize> {
        self.samples.first().map(ImageSample::feature_count)
    }
}

impl Dataset<ImageSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_access() {
        let samples = (0..4u8)
            .map(|i| ImageSample::new(vec![i as f32; 4], 2, 2, i))
            .collect();
        let ds = ImageDataset::new(samples);

        assert_eq!(ds.len(), 4);
        assert_eq!(ds.feature_count(), Some(4));
        assert_eq!(ds.get(2).map(|s| s.label), Some(2));
        assert!(ds.get(4).is_none());
    }
}
