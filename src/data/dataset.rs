//! Image dataset container and the dataset provider contract
//!
//! A provider hands back a train/test split of raw images (pixel values in
//! `[0, 255]`, NHWC layout) paired with integer class labels.

use ndarray::{Array1, Array4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GanError, Result};

/// Images of shape (num_images, height, width, channels) with one label each
#[derive(Debug, Clone)]
pub struct ImageDataset {
    images: Array4<f32>,
    labels: Array1<i64>,
}

impl ImageDataset {
    /// Pair images with labels, checking that the counts agree
    pub fn new(images: Array4<f32>, labels: Array1<i64>) -> Result<Self> {
        let num_images = images.shape()[0];
        if num_images != labels.len() {
            return Err(GanError::shape(
                "dataset labels",
                [num_images],
                [labels.len()],
            ));
        }
        Ok(Self { images, labels })
    }

    /// Random pixels in `[0, 255]` with labels alternating 0, 1, 0, 1, ...
    ///
    /// Used for smoke runs and tests where the real dataset is not needed.
    pub fn synthetic(num_images: usize, image_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let images = Array4::from_shape_fn((num_images, image_size, image_size, 3), |_| {
            rng.gen_range(0.0f32..=255.0)
        });
        let labels = Array1::from_iter((0..num_images).map(|i| (i % 2) as i64));
        Self { images, labels }
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Raw images, NHWC
    pub fn images(&self) -> &Array4<f32> {
        &self.images
    }

    /// Class labels
    pub fn labels(&self) -> &Array1<i64> {
        &self.labels
    }

    /// (height, width, channels) of a single image
    pub fn image_shape(&self) -> (usize, usize, usize) {
        let shape = self.images.shape();
        (shape[1], shape[2], shape[3])
    }

    /// Number of distinct label values (max label + 1)
    pub fn num_classes(&self) -> usize {
        self.labels
            .iter()
            .copied()
            .max()
            .map(|max| max as usize + 1)
            .unwrap_or(0)
    }
}

/// Train and test partitions
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: ImageDataset,
    pub test: ImageDataset,
}

/// Anything that can supply a labeled image dataset
pub trait DatasetSource {
    /// Load both partitions
    fn load(&self) -> Result<DatasetSplit>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Source backed by arrays that are already in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    split: DatasetSplit,
}

impl InMemorySource {
    pub fn new(train: ImageDataset, test: ImageDataset) -> Self {
        Self {
            split: DatasetSplit { train, test },
        }
    }

    /// Synthetic train set of `num_images`, with an empty test partition
    pub fn synthetic(num_images: usize, image_size: usize, seed: u64) -> Self {
        let train = ImageDataset::synthetic(num_images, image_size, seed);
        let test = ImageDataset::synthetic(0, image_size, seed);
        Self::new(train, test)
    }
}

impl DatasetSource for InMemorySource {
    fn load(&self) -> Result<DatasetSplit> {
        Ok(self.split.clone())
    }

    fn describe(&self) -> String {
        format!(
            "in-memory dataset ({} train, {} test)",
            self.split.train.len(),
            self.split.test.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_label_count_mismatch() {
        let images = Array4::<f32>::zeros((4, 32, 32, 3));
        let labels = Array1::from(vec![0i64, 1, 0]);

        let result = ImageDataset::new(images, labels);
        assert!(matches!(result, Err(GanError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_synthetic_dataset() {
        let dataset = ImageDataset::synthetic(4, 32, 7);

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.image_shape(), (32, 32, 3));
        assert_eq!(dataset.labels().to_vec(), vec![0, 1, 0, 1]);
        assert_eq!(dataset.num_classes(), 2);
        assert!(dataset.images().iter().all(|&p| (0.0..=255.0).contains(&p)));
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemorySource::synthetic(6, 32, 0);
        let split = source.load().unwrap();

        assert_eq!(split.train.len(), 6);
        assert!(split.test.is_empty());
        assert!(source.describe().contains("6 train"));
    }
}
