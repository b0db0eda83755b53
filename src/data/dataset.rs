use anyhow::Result;
use burn::data::dataset::Dataset;

use crate::data::cifar::CifarSample;
use crate::domain::traits::SampleSource;

/// In-memory CIFAR-10 split.
/// Training images: 32 * 32 * 3 * 50 000 ≈ 150 MB of u8.
pub struct CifarDataset {
    samples: Vec<CifarSample>,
}

impl CifarDataset {
    pub fn new(samples: Vec<CifarSample>) -> Self { Self { samples } }

    /// Load every sample a source provides.
    pub fn from_source<S>(source: &S) -> Result<Self>
    where
        S: SampleSource<Sample = CifarSample>,
    {
        Ok(Self::new(source.load_all()?))
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Number of batches one pass of a loader with `num_workers` workers
    /// yields. The loader hands each worker a contiguous slice of
    /// `len / num_workers` samples (the last one takes the remainder) and
    /// every slice may end in its own partial batch.
    pub fn batch_count(&self, batch_size: usize, num_workers: usize) -> usize {
        let batch_size = batch_size.max(1);
        let workers    = num_workers.max(1);
        let len        = self.samples.len();
        let part       = len / workers;
        let last       = len - part * (workers - 1);
        part.div_ceil(batch_size) * (workers - 1) + last.div_ceil(batch_size)
    }
}

impl Dataset<CifarSample> for CifarDataset {
    fn get(&self, index: usize) -> Option<CifarSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
