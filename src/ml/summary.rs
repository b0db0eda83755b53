// ============================================================
// Layer 5 — Model Summary
// ============================================================
// Builds a network on the CPU backend and pushes one random
// image through it. Used by `inspect` to check a variant's
// shapes without a GPU or a dataset.

use burn::{backend::NdArray, prelude::*, tensor::Distribution};

use crate::data::cifar::{CHANNELS, HEIGHT, WIDTH};
use crate::ml::model::{SqueezeNext, SqueezeNextConfig};

type SummaryBackend = NdArray;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub stem_channels:  usize,
    /// Output width of each stage
    pub stage_channels: Vec<usize>,
    pub head_channels:  usize,
    pub blocks:         usize,
    pub num_params:     usize,
    /// Logits shape for a single input image
    pub output_dims:    [usize; 2],
}

pub fn summarize(config: &SqueezeNextConfig) -> ModelSummary {
    let device = Default::default();
    let plan   = config.plan();
    let model: SqueezeNext<SummaryBackend> = config.init(&device);

    let image = Tensor::<SummaryBackend, 4>::random(
        [1, CHANNELS, HEIGHT, WIDTH],
        Distribution::Normal(0.0, 1.0),
        &device,
    );
    let output_dims = model.forward(image).dims();

    ModelSummary {
        stem_channels:  plan.stem_channels,
        stage_channels: plan
            .stages
            .iter()
            .filter_map(|stage| stage.last().map(|block| block.out_channels))
            .collect(),
        head_channels:  plan.head_out,
        blocks:         model.block_count(),
        num_params:     model.num_params(),
        output_dims,
    }
}
