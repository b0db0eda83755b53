use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::channel_plan::{BlockSpec, ChannelPlan, Shortcut};
use crate::domain::variant::ModelVariant;
use crate::ml::init::LayerInit;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct SqueezeNextConfig {
    /// Channel width multiplier (1.0 or 2.0 for the published variants)
    pub width:  f64,
    /// Residual blocks per stage
    pub blocks: [usize; 4],
    #[config(default = 10)]
    pub num_classes: usize,
}

impl SqueezeNextConfig {
    pub fn from_variant(variant: ModelVariant) -> Self {
        Self::new(variant.width(), variant.blocks())
    }

    pub fn plan(&self) -> ChannelPlan {
        ChannelPlan::new(self.width, self.blocks)
    }

    /// Build the network and apply the per-layer weight initialization.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SqueezeNext<B> {
        let plan = self.plan();

        let stem   = ConvBn::new(3, plan.stem_channels, [3, 3], 1, [1, 1], device);
        let stages = plan
            .stages
            .iter()
            .map(|specs| Stage {
                blocks: specs.iter().map(|spec| ResidualBlock::new(spec, device)).collect(),
            })
            .collect();
        let head       = ConvBn::new(plan.head_in, plan.head_out, [1, 1], 1, [0, 0], device);
        let pool       = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let classifier = LinearConfig::new(plan.head_out, self.num_classes).init(device);

        SqueezeNext { stem, stages, head, pool, classifier }.init_weights()
    }
}

// ─── ConvBn ───────────────────────────────────────────────────────────────────
/// Convolution (with bias) followed by 2-D batch normalization.
#[derive(Module, Debug)]
pub struct ConvBn<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B, 2>,
}

impl<B: Backend> ConvBn<B> {
    pub fn new(
        in_channels:  usize,
        out_channels: usize,
        kernel:       [usize; 2],
        stride:       usize,
        padding:      [usize; 2],
        device:       &B::Device,
    ) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], kernel)
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(padding[0], padding[1]))
            .with_bias(true)
            .init(device);
        let norm = BatchNormConfig::new(out_channels).init(device);
        Self { conv, norm }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.norm.forward(self.conv.forward(x))
    }

    fn init_weights(self) -> Self {
        Self {
            conv: self.conv.init_weights(),
            norm: self.norm.init_weights(),
        }
    }
}

// ─── ResidualBlock ────────────────────────────────────────────────────────────
/// SqueezeNext block:
///
/// ```text
/// x ─┬─ 1×1 reduce (stride s) ─ 1×1 squeeze ─ 1×3 ─ 3×1 ─ 1×1 expand ─ relu ─┐
///    │                                                                        + ─ relu
///    └─ identity  |  1×1 projection (stride s) ───────────────────────── relu ┘
/// ```
///
/// Every conv on the main path is followed by batch-norm and relu.
#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    pub reduce:     ConvBn<B>,
    pub squeeze:    ConvBn<B>,
    pub separable1: ConvBn<B>,
    pub separable2: ConvBn<B>,
    pub expand:     ConvBn<B>,
    /// None means the input is added unchanged
    pub shortcut:   Option<ConvBn<B>>,
}

impl<B: Backend> ResidualBlock<B> {
    pub fn new(spec: &BlockSpec, device: &B::Device) -> Self {
        let reduced  = spec.reduced_channels();
        let squeezed = spec.squeezed_channels();

        let shortcut = match spec.shortcut() {
            Shortcut::Identity   => None,
            Shortcut::Projection => Some(ConvBn::new(
                spec.in_channels, spec.out_channels, [1, 1], spec.stride, [0, 0], device,
            )),
        };

        Self {
            reduce:     ConvBn::new(spec.in_channels, reduced, [1, 1], spec.stride, [0, 0], device),
            squeeze:    ConvBn::new(reduced, squeezed, [1, 1], 1, [0, 0], device),
            separable1: ConvBn::new(squeezed, reduced, [1, 3], 1, [0, 1], device),
            separable2: ConvBn::new(reduced, reduced, [3, 1], 1, [1, 0], device),
            expand:     ConvBn::new(reduced, spec.out_channels, [1, 1], 1, [0, 0], device),
            shortcut,
        }
    }

    pub fn has_identity_shortcut(&self) -> bool {
        self.shortcut.is_none()
    }

    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.reduce.forward(input.clone()));
        let x = relu(self.squeeze.forward(x));
        let x = relu(self.separable1.forward(x));
        let x = relu(self.separable2.forward(x));
        let x = relu(self.expand.forward(x));

        let shortcut = match &self.shortcut {
            Some(projection) => projection.forward(input),
            None             => input,
        };

        relu(x + relu(shortcut))
    }

    fn init_weights(self) -> Self {
        Self {
            reduce:     self.reduce.init_weights(),
            squeeze:    self.squeeze.init_weights(),
            separable1: self.separable1.init_weights(),
            separable2: self.separable2.init_weights(),
            expand:     self.expand.init_weights(),
            shortcut:   self.shortcut.map(ConvBn::init_weights),
        }
    }
}

/// Blocks sharing one output width.
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    pub blocks: Vec<ResidualBlock<B>>,
}

impl<B: Backend> Stage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.blocks.iter().fold(x, |x, block| block.forward(x))
    }
}

// ─── SqueezeNext ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct SqueezeNext<B: Backend> {
    pub stem:       ConvBn<B>,
    pub stages:     Vec<Stage<B>>,
    pub head:       ConvBn<B>,
    pub pool:       AdaptiveAvgPool2d,
    pub classifier: Linear<B>,
}

impl<B: Backend> SqueezeNext<B> {
    /// images: [batch, 3, H, W] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.stem.forward(images));
        let x = self.stages.iter().fold(x, |x, stage| stage.forward(x));
        let x = relu(self.head.forward(x));
        let x = self.pool.forward(x); // [batch, channels, 1, 1]
        let x = x.flatten::<2>(1, 3);
        self.classifier.forward(x)
    }

    /// Mean cross-entropy over the batch together with the logits.
    pub fn forward_classification(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }

    pub fn block_count(&self) -> usize {
        self.stages.iter().map(|s| s.blocks.len()).sum()
    }

    fn init_weights(self) -> Self {
        Self {
            stem:   self.stem.init_weights(),
            stages: self
                .stages
                .into_iter()
                .map(|stage| Stage {
                    blocks: stage.blocks.into_iter().map(ResidualBlock::init_weights).collect(),
                })
                .collect(),
            head:       self.head.init_weights(),
            pool:       self.pool,
            classifier: self.classifier.init_weights(),
        }
    }
}

/// Number of correct argmax predictions in a batch.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns [batch, 1]; flatten before comparing with [batch]
    logits
        .argmax(1)
        .flatten::<1>(0, 1)
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}
