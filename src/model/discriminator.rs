//! Discriminator network for DCGAN
//!
//! The Discriminator classifies images as real or fake.
//! Architecture uses strided 2D convolutions to downsample, then a dense
//! layer with sigmoid for the probability of being real.

use serde::{Deserialize, Serialize};
use tch::{nn, nn::ModuleT, Tensor};

use super::stage::{build_stages, Activation, Stage, StageKind, StageSpec};

/// Discriminator network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscriminatorConfig {
    /// Side length of the square input image (multiple of 16)
    pub image_size: i64,
    /// Number of input color channels
    pub channels: i64,
    /// Filters of the first stage; doubled at every following stage
    pub base_filters: i64,
    /// Batch norm after downsampling stages 2-4
    pub batch_norm: bool,
    /// Negative slope of the leaky ReLU
    pub leaky_slope: f64,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            image_size: 32,
            channels: 3,
            base_filters: 32,
            batch_norm: false,
            leaky_slope: 0.2,
        }
    }
}

impl DiscriminatorConfig {
    /// Ordered stage descriptors
    ///
    /// 1. Four kernel-5 stride-2 convolutions with leaky ReLU
    /// 2. Flatten + dense layer to a single probability
    pub fn stages(&self) -> Vec<StageSpec> {
        let base = self.base_filters;
        let down = |name, in_channels, out_channels, batch_norm| StageSpec {
            name,
            kind: StageKind::Conv,
            in_channels,
            out_channels,
            kernel: 5,
            stride: 2,
            padding: 2,
            bias: true,
            batch_norm,
            activation: Activation::LeakyRelu(self.leaky_slope),
        };

        let final_size = self.image_size / 16;
        vec![
            down("down1", self.channels, base, false),
            down("down2", base, base * 2, self.batch_norm),
            down("down3", base * 2, base * 4, self.batch_norm),
            down("down4", base * 4, base * 8, self.batch_norm),
            StageSpec {
                name: "head",
                kind: StageKind::Linear,
                in_channels: final_size * final_size * base * 8,
                out_channels: 1,
                kernel: 0,
                stride: 1,
                padding: 0,
                bias: true,
                batch_norm: false,
                activation: Activation::Sigmoid,
            },
        ]
    }
}

/// Discriminator network
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    stages: Vec<Stage>,
}

impl Discriminator {
    /// Create a new Discriminator network
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let stages = build_stages(vs, config.stages());
        Self { config, stages }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape (batch_size, channels, image_size, image_size)
    /// * `train` - Whether in training mode (affects batch norm when enabled)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1) with probabilities (after sigmoid)
    pub fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        self.stages
            .iter()
            .fold(input.shallow_clone(), |x, stage| stage.forward_t(&x, train))
    }

    /// Classify samples (inference mode)
    pub fn classify(&self, input: &Tensor) -> Tensor {
        self.forward_t(input, false)
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}

impl ModuleT for Discriminator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Discriminator::forward_t(self, xs, train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind};

    fn assert_probabilities(probs: &Tensor) {
        let min_val = probs.min().double_value(&[]);
        let max_val = probs.max().double_value(&[]);
        assert!(min_val > 0.0 && max_val < 1.0, "{} {}", min_val, max_val);
    }

    #[test]
    fn test_default_stage_layout() {
        let stages = DiscriminatorConfig::default().stages();

        let channels: Vec<(i64, i64)> = stages
            .iter()
            .map(|s| (s.in_channels, s.out_channels))
            .collect();
        assert_eq!(
            channels,
            vec![(3, 32), (32, 64), (64, 128), (128, 256), (1024, 1)]
        );
        assert!(stages.iter().all(|s| !s.batch_norm));
        assert_eq!(stages[0].activation, Activation::LeakyRelu(0.2));
    }

    #[test]
    fn test_discriminator_output_shape() {
        let vs = VarStore::new(Device::Cpu);
        let disc = Discriminator::new(&vs.root(), DiscriminatorConfig::default());

        let input = Tensor::randn([4, 3, 32, 32], (Kind::Float, Device::Cpu));
        let output = disc.forward_t(&input, true);

        assert_eq!(output.size(), vec![4, 1]);
        assert_probabilities(&output);
    }

    #[test]
    fn test_discriminator_with_batch_norm() {
        let vs = VarStore::new(Device::Cpu);
        let config = DiscriminatorConfig {
            batch_norm: true,
            ..Default::default()
        };
        assert_eq!(config.stages().iter().filter(|s| s.batch_norm).count(), 3);
        let disc = Discriminator::new(&vs.root(), config);

        let input = Tensor::randn([4, 3, 32, 32], (Kind::Float, Device::Cpu));
        assert_eq!(disc.forward_t(&input, true).size(), vec![4, 1]);
        assert_probabilities(&disc.classify(&input));
    }

    #[test]
    fn test_discriminator_arbitrary_finite_input() {
        let vs = VarStore::new(Device::Cpu);
        let disc = Discriminator::new(&vs.root(), DiscriminatorConfig::default());

        let input = Tensor::rand([2, 3, 32, 32], (Kind::Float, Device::Cpu)) * 2.0 - 1.0;
        assert_probabilities(&disc.classify(&input));
    }
}
