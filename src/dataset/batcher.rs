//! Burn dataset integration.
//!
//! Images are decoded eagerly into normalized CHW float buffers when the
//! dataset is built; CIFAR-10 images are tiny, so the whole split fits in
//! memory comfortably.

use std::path::Path;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use image::imageops::FilterType;
use image::ImageReader;

use crate::dataset::loader::{ClassVocabulary, Sample};
use crate::utils::error::{Error, Result};

/// A single decoded image ready for batching
#[derive(Clone, Debug)]
pub struct CifarItem {
    /// Image data as flattened CHW float array [3 * H * W], values in [0, 1]
    pub image: Vec<f32>,
    /// Class index
    pub label: usize,
    /// Source path (for debugging)
    pub path: String,
}

impl CifarItem {
    /// Load and decode an image file into a normalized CHW buffer
    pub fn from_path(path: &Path, label: usize, image_size: usize) -> Result<Self> {
        let img = ImageReader::open(path)?
            .decode()
            .map_err(|e| Error::Image {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .resize_exact(image_size as u32, image_size as u32, FilterType::Triangle)
            .to_rgb8();

        let (width, height) = (image_size, image_size);
        let mut image = vec![0.0f32; 3 * height * width];

        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    image[c * height * width + y * width + x] = pixel[c] as f32 / 255.0;
                }
            }
        }

        Ok(Self {
            image,
            label,
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Create from pre-loaded image data
    pub fn from_data(image: Vec<f32>, label: usize, path: String) -> Self {
        Self { image, label, path }
    }
}

/// In-memory dataset of decoded CIFAR items implementing Burn's `Dataset`
#[derive(Clone, Debug)]
pub struct CifarDataset {
    items: Vec<CifarItem>,
}

impl CifarDataset {
    /// Decode all samples, mapping labels through the vocabulary.
    ///
    /// Fails on the first undecodable image or unknown label.
    pub fn load(samples: &[Sample], vocab: &ClassVocabulary, image_size: usize) -> Result<Self> {
        let items = samples
            .iter()
            .map(|sample| {
                let label = vocab.index_of(&sample.label).ok_or_else(|| {
                    Error::Dataset(format!("label {:?} not in vocabulary", sample.label))
                })?;
                CifarItem::from_path(&sample.path, label, image_size)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { items })
    }

    /// Create a dataset from pre-built items
    pub fn from_items(items: Vec<CifarItem>) -> Self {
        Self { items }
    }

    /// Sample count per class index
    pub fn class_distribution(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; num_classes];
        for item in &self.items {
            if item.label < num_classes {
                counts[item.label] += 1;
            }
        }
        counts
    }
}

impl Dataset<CifarItem> for CifarDataset {
    fn get(&self, index: usize) -> Option<CifarItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// A batch of images for training or evaluation
#[derive(Clone, Debug)]
pub struct CifarBatch<B: Backend> {
    /// Images with shape [batch_size, 3, height, width]
    pub images: Tensor<B, 4>,
    /// Labels with shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher turning decoded items into tensors on a fixed device
#[derive(Clone, Debug)]
pub struct CifarBatcher<B: Backend> {
    device: B::Device,
    image_size: usize,
}

impl<B: Backend> CifarBatcher<B> {
    /// Create a batcher for the given device and image size
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }
}

impl<B: Backend> Batcher<CifarItem, CifarBatch<B>> for CifarBatcher<B> {
    fn batch(&self, items: Vec<CifarItem>) -> CifarBatch<B> {
        let batch_size = items.len();
        let channels = 3;
        let height = self.image_size;
        let width = self.image_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();
        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, channels, height, width]),
            &self.device,
        );

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(targets_data, [batch_size]),
            &self.device,
        );

        CifarBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;

    #[test]
    fn test_item_from_data() {
        let image = vec![0.5f32; 3 * 32 * 32];
        let item = CifarItem::from_data(image, 7, "x.jpg".to_string());

        assert_eq!(item.label, 7);
        assert_eq!(item.image.len(), 3 * 32 * 32);
    }

    #[test]
    fn test_dataset_len_and_get() {
        let items = vec![
            CifarItem::from_data(vec![0.0; 3 * 32 * 32], 0, "a.jpg".to_string()),
            CifarItem::from_data(vec![0.0; 3 * 32 * 32], 1, "b.jpg".to_string()),
        ];
        let dataset = CifarDataset::from_items(items);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(1).map(|i| i.label), Some(1));
        assert!(dataset.get(2).is_none());
    }

    #[test]
    fn test_class_distribution() {
        let items = vec![
            CifarItem::from_data(vec![0.0; 3], 0, "a.jpg".to_string()),
            CifarItem::from_data(vec![0.0; 3], 0, "b.jpg".to_string()),
            CifarItem::from_data(vec![0.0; 3], 2, "c.jpg".to_string()),
        ];
        let dataset = CifarDataset::from_items(items);

        assert_eq!(dataset.class_distribution(3), vec![2, 0, 1]);
    }

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = CifarBatcher::<DefaultBackend>::new(device, 32);
        let items = vec![
            CifarItem::from_data(vec![0.0; 3 * 32 * 32], 3, "a.jpg".to_string()),
            CifarItem::from_data(vec![1.0; 3 * 32 * 32], 9, "b.jpg".to_string()),
        ];

        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 3, 32, 32]);
        assert_eq!(batch.targets.dims(), [2]);
    }

    #[test]
    fn test_batch_target_values() {
        let device = Default::default();
        let batcher = CifarBatcher::<DefaultBackend>::new(device, 2);
        let items = vec![
            CifarItem::from_data(vec![0.0; 3 * 2 * 2], 4, "a.jpg".to_string()),
            CifarItem::from_data(vec![0.0; 3 * 2 * 2], 1, "b.jpg".to_string()),
        ];

        let batch = batcher.batch(items);
        let targets: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();

        assert_eq!(targets, vec![4, 1]);
    }
}
