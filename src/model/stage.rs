//! Architecture stages as data
//!
//! Both networks are an ordered list of [`StageSpec`] descriptors. Each
//! descriptor is built into a [`Stage`]: one learned transform, an optional
//! batch norm and an activation.

use tch::{nn, nn::Module, nn::ModuleT, Tensor};

/// Learned transform used by a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Transposed 2D convolution (upsampling)
    ConvTranspose,
    /// 2D convolution (downsampling)
    Conv,
    /// Flatten followed by a fully connected layer
    Linear,
}

/// Nonlinearity applied at the end of a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Relu,
    LeakyRelu(f64),
    Tanh,
    Sigmoid,
}

impl Activation {
    pub fn apply(&self, xs: &Tensor) -> Tensor {
        match self {
            Activation::Relu => xs.relu(),
            // max(x, a*x) for 0 < a < 1
            Activation::LeakyRelu(slope) => xs.maximum(&(xs * *slope)),
            Activation::Tanh => xs.tanh(),
            Activation::Sigmoid => xs.sigmoid(),
        }
    }
}

/// Descriptor of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageSpec {
    /// Variable store name of the stage
    pub name: &'static str,
    pub kind: StageKind,
    pub in_channels: i64,
    pub out_channels: i64,
    /// Ignored for `Linear`
    pub kernel: i64,
    pub stride: i64,
    pub padding: i64,
    pub bias: bool,
    pub batch_norm: bool,
    pub activation: Activation,
}

impl StageSpec {
    /// Spatial side length produced from an input of side `input`
    pub fn output_size(&self, input: i64) -> i64 {
        match self.kind {
            StageKind::ConvTranspose => (input - 1) * self.stride - 2 * self.padding + self.kernel,
            StageKind::Conv => (input + 2 * self.padding - self.kernel) / self.stride + 1,
            StageKind::Linear => 1,
        }
    }
}

#[derive(Debug)]
enum Layer {
    ConvTranspose(nn::ConvTranspose2D),
    Conv(nn::Conv2D),
    Linear(nn::Linear),
}

/// A built stage holding its parameters
#[derive(Debug)]
pub struct Stage {
    spec: StageSpec,
    layer: Layer,
    norm: Option<nn::BatchNorm>,
}

impl Stage {
    /// Create the stage's variables under `vs / spec.name`
    pub fn new(vs: &nn::Path, spec: StageSpec) -> Self {
        let path = vs / spec.name;

        let layer = match spec.kind {
            StageKind::ConvTranspose => {
                let config = nn::ConvTransposeConfig {
                    stride: spec.stride,
                    padding: spec.padding,
                    bias: spec.bias,
                    ..Default::default()
                };
                Layer::ConvTranspose(nn::conv_transpose2d(
                    &path / "conv",
                    spec.in_channels,
                    spec.out_channels,
                    spec.kernel,
                    config,
                ))
            }
            StageKind::Conv => {
                let config = nn::ConvConfig {
                    stride: spec.stride,
                    padding: spec.padding,
                    bias: spec.bias,
                    ..Default::default()
                };
                Layer::Conv(nn::conv2d(
                    &path / "conv",
                    spec.in_channels,
                    spec.out_channels,
                    spec.kernel,
                    config,
                ))
            }
            StageKind::Linear => {
                let config = nn::LinearConfig {
                    bias: spec.bias,
                    ..Default::default()
                };
                Layer::Linear(nn::linear(
                    &path / "fc",
                    spec.in_channels,
                    spec.out_channels,
                    config,
                ))
            }
        };

        let norm = spec
            .batch_norm
            .then(|| nn::batch_norm2d(&path / "bn", spec.out_channels, Default::default()));

        Self { spec, layer, norm }
    }

    pub fn spec(&self) -> &StageSpec {
        &self.spec
    }
}

impl ModuleT for Stage {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        let x = match &self.layer {
            Layer::ConvTranspose(conv) => conv.forward(xs),
            Layer::Conv(conv) => conv.forward(xs),
            Layer::Linear(fc) => fc.forward(&xs.flatten(1, -1)),
        };
        let x = match &self.norm {
            Some(bn) => bn.forward_t(&x, train),
            None => x,
        };
        self.spec.activation.apply(&x)
    }
}

/// Build all stages in order
pub fn build_stages(vs: &nn::Path, specs: Vec<StageSpec>) -> Vec<Stage> {
    specs.into_iter().map(|spec| Stage::new(vs, spec)).collect()
}
