// ============================================================
// Layer 4 — CIFAR Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<CifarSample>
// into an image tensor and a label tensor.
//
// Per image, in order:
//   1. transform   (random crop + flip for training, identity
//                   for evaluation)
//   2. scale       u8 → [0, 1]
//   3. normalize   (x - mean[c]) / std[c]
//
// Output shapes:
//   images  [N, 3, 32, 32]  float
//   targets [N]             int
//
// Reference: Burn Book §4 (Batcher)

use std::sync::Arc;

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::augment::{Identity, RandomCropFlip};
use crate::data::cifar::{CifarSample, CHANNELS, HEIGHT, WIDTH};
use crate::domain::traits::ImageTransform;

/// Per-channel mean of the CIFAR-10 training set
pub const MEAN: [f32; CHANNELS] = [0.4914, 0.4822, 0.4465];
/// Per-channel standard deviation used for normalization
pub const STD:  [f32; CHANNELS] = [0.2023, 0.1994, 0.2010];

/// A batch of CIFAR-10 samples ready for the forward pass.
#[derive(Debug, Clone)]
pub struct CifarBatch<B: Backend> {
    /// Normalized images, shape [batch_size, 3, 32, 32]
    pub images: Tensor<B, 4>,

    /// Class indices, shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device and the per-image transform.
#[derive(Clone)]
pub struct CifarBatcher<B: Backend> {
    device:    B::Device,
    transform: Arc<dyn ImageTransform>,
}

impl<B: Backend> CifarBatcher<B> {
    pub fn new(device: B::Device, transform: Arc<dyn ImageTransform>) -> Self {
        Self { device, transform }
    }

    /// Batcher for the training split: random crop + flip.
    pub fn training(device: B::Device) -> Self {
        Self::new(device, Arc::new(RandomCropFlip::default()))
    }

    /// Batcher for evaluation: images are only normalized.
    pub fn evaluation(device: B::Device) -> Self {
        Self::new(device, Arc::new(Identity))
    }
}

/// Scale one channel-major u8 image to [0, 1] and normalize per channel.
pub fn normalize_image(image: &[u8]) -> Vec<f32> {
    let plane = HEIGHT * WIDTH;
    image
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let c = i / plane;
            (p as f32 / 255.0 - MEAN[c]) / STD[c]
        })
        .collect()
}

impl<B: Backend> Batcher<CifarSample, CifarBatch<B>> for CifarBatcher<B> {
    fn batch(&self, items: Vec<CifarSample>) -> CifarBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|s| normalize_image(&self.transform.apply(&s.image)))
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let data   = TensorData::new(pixels, [batch_size, CHANNELS, HEIGHT, WIDTH]);
        let images = Tensor::<B, 4>::from_data(data.convert::<B::FloatElem>(), &self.device);

        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        CifarBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cifar::IMAGE_BYTES;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_normalize_uses_channel_statistics() {
        let mut image = vec![0u8; IMAGE_BYTES];
        image[HEIGHT * WIDTH..].fill(255);

        let out = normalize_image(&image);
        assert!((out[0] - (-MEAN[0] / STD[0])).abs() < 1e-6);
        assert!((out[HEIGHT * WIDTH] - (1.0 - MEAN[1]) / STD[1]).abs() < 1e-6);
        assert!((out[IMAGE_BYTES - 1] - (1.0 - MEAN[2]) / STD[2]).abs() < 1e-6);
    }

    #[test]
    fn test_batch_shapes_and_labels() {
        let device  = Default::default();
        let batcher = CifarBatcher::<TestBackend>::evaluation(device);
        let items   = vec![
            CifarSample { image: vec![10; IMAGE_BYTES], label: 7 },
            CifarSample { image: vec![20; IMAGE_BYTES], label: 2 },
            CifarSample { image: vec![30; IMAGE_BYTES], label: 0 },
        ];

        let batch = batcher.batch(items);
        assert_eq!(batch.images.dims(), [3, 3, 32, 32]);
        assert_eq!(batch.targets.dims(), [3]);

        let labels: Vec<i64> = batch
            .targets
            .into_data()
            .iter::<i64>()
            .collect();
        assert_eq!(labels, vec![7, 2, 0]);
    }
}
