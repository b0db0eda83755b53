// ============================================================
// Layer 3 — Channel Plan
// ============================================================
// Computes the channel configuration of every residual block
// before any layer is built.
//
// The network is a table of four stages:
//
//   stage   base width   stride of first block
//   1       32           1
//   2       64           2
//   3       128          2
//   4       256          2
//
// A block's input width is the previous block's *base* output
// width (the stem counts as 64). Every width is multiplied by
// the variant's width factor and truncated to an integer only
// when a block spec is produced, so the 1x and 2x networks share
// one plan shape.
//
// Reference: Rust Book §13 (Iterators and Closures)

use std::iter;

/// Base output width of the input convolution
pub const STEM_BASE_CHANNELS: usize = 64;

/// Base output width of the projection convolution before pooling
pub const HEAD_BASE_CHANNELS: usize = 128;

/// (base output width, stride of the first block) per stage
pub const STAGE_TABLE: [(usize, usize); 4] = [(32, 1), (64, 2), (128, 2), (256, 2)];

/// Multiply a base channel count by the width factor, truncating.
pub fn scale_channels(width: f64, base: usize) -> usize {
    (width * base as f64) as usize
}

/// How the block input reaches the residual sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Input is added unchanged
    Identity,
    /// Input goes through a strided 1×1 conv + normalization first
    Projection,
}

/// Channel and stride configuration of one residual block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpec {
    pub in_channels:  usize,
    pub out_channels: usize,
    pub stride:       usize,
}

impl BlockSpec {
    pub fn new(in_channels: usize, out_channels: usize, stride: usize) -> Self {
        Self { in_channels, out_channels, stride }
    }

    /// Internal bottleneck factor:
    /// 1.0 for downsampling blocks, 0.25 when the block narrows,
    /// 0.5 otherwise.
    pub fn reduction(&self) -> f64 {
        if self.stride == 2 {
            1.0
        } else if self.in_channels > self.out_channels {
            0.25
        } else {
            0.5
        }
    }

    /// Width after the first 1×1 reduce conv (also the width of the
    /// 1×3 and 3×1 separable convs)
    pub fn reduced_channels(&self) -> usize {
        (self.in_channels as f64 * self.reduction()) as usize
    }

    /// Width after the second 1×1 squeeze conv
    pub fn squeezed_channels(&self) -> usize {
        (self.in_channels as f64 * self.reduction() * 0.5) as usize
    }

    pub fn shortcut(&self) -> Shortcut {
        if self.stride == 1 && self.in_channels == self.out_channels {
            Shortcut::Identity
        } else {
            Shortcut::Projection
        }
    }
}

/// All channel widths of one network, stem to classifier input.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlan {
    pub stem_channels: usize,
    pub stages:        Vec<Vec<BlockSpec>>,
    pub head_in:       usize,
    pub head_out:      usize,
}

impl ChannelPlan {
    pub fn new(width: f64, blocks: [usize; 4]) -> Self {
        let (stages, last_base) = STAGE_TABLE.iter().zip(blocks).fold(
            (Vec::with_capacity(STAGE_TABLE.len()), STEM_BASE_CHANNELS),
            |(mut stages, in_base), (&(out_base, stride), count)| {
                let (stage, next_base) = plan_stage(width, in_base, out_base, stride, count);
                stages.push(stage);
                (stages, next_base)
            },
        );

        Self {
            stem_channels: scale_channels(width, STEM_BASE_CHANNELS),
            stages,
            head_in:       scale_channels(width, last_base),
            head_out:      scale_channels(width, HEAD_BASE_CHANNELS),
        }
    }

    pub fn block_count(&self) -> usize {
        self.stages.iter().map(Vec::len).sum()
    }
}

/// Fold one stage: the first block takes the stage stride, the rest
/// stride 1, and each block's input is the previous block's base output.
/// Returns the stage's specs and the base width flowing out of it.
fn plan_stage(
    width:    f64,
    in_base:  usize,
    out_base: usize,
    stride:   usize,
    count:    usize,
) -> (Vec<BlockSpec>, usize) {
    iter::once(stride)
        .chain(iter::repeat(1))
        .take(count)
        .fold((Vec::with_capacity(count), in_base), |(mut specs, in_base), s| {
            specs.push(BlockSpec::new(
                scale_channels(width, in_base),
                scale_channels(width, out_base),
                s,
            ));
            (specs, out_base)
        })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_factor() {
        assert_eq!(BlockSpec::new(64, 32, 2).reduction(), 1.0);
        assert_eq!(BlockSpec::new(64, 32, 1).reduction(), 0.25);
        assert_eq!(BlockSpec::new(32, 32, 1).reduction(), 0.5);
        assert_eq!(BlockSpec::new(32, 64, 1).reduction(), 0.5);
    }

    #[test]
    fn test_bottleneck_widths_truncate() {
        let spec = BlockSpec::new(64, 32, 1);
        assert_eq!(spec.reduced_channels(), 16);
        assert_eq!(spec.squeezed_channels(), 8);

        // 3 * 0.5 = 1.5 → 1, 3 * 0.25 = 0.75 → 0
        let odd = BlockSpec::new(3, 3, 1);
        assert_eq!(odd.reduced_channels(), 1);
        assert_eq!(odd.squeezed_channels(), 0);
    }

    #[test]
    fn test_shortcut_identity_only_when_shape_preserved() {
        assert_eq!(BlockSpec::new(32, 32, 1).shortcut(), Shortcut::Identity);
        assert_eq!(BlockSpec::new(32, 32, 2).shortcut(), Shortcut::Projection);
        assert_eq!(BlockSpec::new(64, 32, 1).shortcut(), Shortcut::Projection);
        assert_eq!(BlockSpec::new(32, 64, 2).shortcut(), Shortcut::Projection);
    }

    #[test]
    fn test_plan_for_23_1x() {
        let plan = ChannelPlan::new(1.0, [6, 6, 8, 1]);
        assert_eq!(plan.stem_channels, 64);
        assert_eq!(plan.block_count(), 21);

        assert_eq!(plan.stages[0][0], BlockSpec::new(64, 32, 1));
        assert_eq!(plan.stages[0][1], BlockSpec::new(32, 32, 1));
        assert_eq!(plan.stages[1][0], BlockSpec::new(32, 64, 2));
        assert_eq!(plan.stages[1][5], BlockSpec::new(64, 64, 1));
        assert_eq!(plan.stages[2][0], BlockSpec::new(64, 128, 2));
        assert_eq!(plan.stages[3][0], BlockSpec::new(128, 256, 2));

        assert_eq!(plan.head_in, 256);
        assert_eq!(plan.head_out, 128);
    }

    #[test]
    fn test_plan_scales_every_width_for_2x() {
        let plan = ChannelPlan::new(2.0, [2, 4, 14, 1]);
        assert_eq!(plan.stem_channels, 128);
        assert_eq!(plan.stages[0][0], BlockSpec::new(128, 64, 1));
        assert_eq!(plan.stages[0][1], BlockSpec::new(64, 64, 1));
        assert_eq!(plan.stages[2].len(), 14);
        assert_eq!(plan.stages[3][0], BlockSpec::new(256, 512, 2));
        assert_eq!(plan.head_in, 512);
        assert_eq!(plan.head_out, 256);
    }

    #[test]
    fn test_only_first_block_of_stage_is_strided() {
        let plan = ChannelPlan::new(1.0, [3, 3, 3, 3]);
        for stage in &plan.stages {
            assert!(stage[1..].iter().all(|b| b.stride == 1));
        }
        let firsts: Vec<usize> = plan.stages.iter().map(|s| s[0].stride).collect();
        assert_eq!(firsts, vec![1, 2, 2, 2]);
    }
}
