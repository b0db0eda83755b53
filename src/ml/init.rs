// ============================================================
// Layer 5 — Weight Initialization
// ============================================================
// Re-initializes a freshly built network once, layer by layer.
// The network only contains three kinds of parameterised
// layers and each one knows its own routine:
//
//   Convolution    weight ~ Xavier-uniform(gain = √2), bias = 0
//   Normalization  scale = 1, bias = 0
//   Linear         framework default, left untouched
//
// Composite modules (ConvBn, ResidualBlock, SqueezeNext) walk
// their children and call `init_weights` on each leaf.

use burn::{
    nn::{conv::Conv2d, BatchNorm, Initializer, Linear},
    prelude::*,
};

/// Gain of the Xavier-uniform convolution initializer
pub const XAVIER_GAIN: f64 = std::f64::consts::SQRT_2;

/// A leaf layer with its own initialization routine. Implemented for
/// the convolution, normalization and linear layers the network uses.
pub trait LayerInit: Sized {
    /// Consume the layer and return it with re-drawn parameters.
    fn init_weights(self) -> Self;
}

impl<B: Backend> LayerInit for Conv2d<B> {
    fn init_weights(mut self) -> Self {
        let [out_channels, in_channels, kh, kw] = self.weight.dims();
        let device    = self.weight.device();
        let receptive = kh * kw;

        self.weight = Initializer::XavierUniform { gain: XAVIER_GAIN }.init_with(
            [out_channels, in_channels, kh, kw],
            Some(in_channels * receptive),
            Some(out_channels * receptive),
            &device,
        );
        self.bias = self
            .bias
            .map(|_| Initializer::Zeros.init([out_channels], &device));
        self
    }
}

impl<B: Backend> LayerInit for BatchNorm<B, 2> {
    fn init_weights(mut self) -> Self {
        let [channels] = self.gamma.dims();
        let device     = self.gamma.device();

        self.gamma = Initializer::Ones.init([channels], &device);
        self.beta  = Initializer::Zeros.init([channels], &device);
        self
    }
}

impl<B: Backend> LayerInit for Linear<B> {
    fn init_weights(self) -> Self {
        self
    }
}
