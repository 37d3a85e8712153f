//! Generator network for DCGAN
//!
//! The Generator transforms noise of shape (batch, latent_dim, 1, 1) into
//! color images. Architecture uses transposed 2D convolutions to upsample
//! from a 1x1 noise map to the full image resolution.

use serde::{Deserialize, Serialize};
use tch::{nn, nn::ModuleT, Tensor};

use super::stage::{build_stages, Activation, Stage, StageKind, StageSpec};

/// Generator network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Size of the latent noise vector
    pub latent_dim: i64,
    /// Side length of the square output image (multiple of 16)
    pub image_size: i64,
    /// Number of output color channels
    pub channels: i64,
    /// Base number of filters; the projection stage has 8x this
    pub base_filters: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 100,
            image_size: 32,
            channels: 3,
            base_filters: 128,
        }
    }
}

impl GeneratorConfig {
    /// Spatial size of the projection stage output (image_size / 16)
    pub fn bottleneck(&self) -> i64 {
        self.image_size / 16
    }

    /// Ordered stage descriptors
    ///
    /// 1. Projection: latent_dim -> base*8 at bottleneck x bottleneck
    /// 2. Three upsampling stages halving channels, doubling resolution
    /// 3. Output stage to `channels` with tanh
    pub fn stages(&self) -> Vec<StageSpec> {
        let base = self.base_filters;
        let up = |name, in_channels, out_channels| StageSpec {
            name,
            kind: StageKind::ConvTranspose,
            in_channels,
            out_channels,
            kernel: 4,
            stride: 2,
            padding: 1,
            bias: false,
            batch_norm: true,
            activation: Activation::Relu,
        };

        vec![
            StageSpec {
                name: "project",
                kind: StageKind::ConvTranspose,
                in_channels: self.latent_dim,
                out_channels: base * 8,
                kernel: self.bottleneck(),
                stride: 1,
                padding: 0,
                bias: false,
                batch_norm: true,
                activation: Activation::Relu,
            },
            up("up1", base * 8, base * 4),
            up("up2", base * 4, base * 2),
            up("up3", base * 2, base),
            StageSpec {
                batch_norm: false,
                activation: Activation::Tanh,
                ..up("output", base, self.channels)
            },
        ]
    }
}

/// Generator network
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    stages: Vec<Stage>,
}

impl Generator {
    /// Create a new Generator network
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let stages = build_stages(vs, config.stages());
        Self { config, stages }
    }

    /// Generate images from noise
    ///
    /// # Arguments
    ///
    /// * `noise` - Tensor of shape (batch_size, latent_dim, 1, 1)
    /// * `train` - Whether in training mode (affects batch norm)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, channels, image_size, image_size) in [-1, 1]
    pub fn forward_t(&self, noise: &Tensor, train: bool) -> Tensor {
        self.stages
            .iter()
            .fold(noise.shallow_clone(), |x, stage| stage.forward_t(&x, train))
    }

    /// Generate images (inference mode)
    pub fn generate(&self, noise: &Tensor) -> Tensor {
        self.forward_t(noise, false)
    }

    /// Expected noise shape for a batch
    pub fn noise_shape(&self, batch_size: i64) -> [i64; 4] {
        [batch_size, self.config.latent_dim, 1, 1]
    }

    /// Output image shape for a batch
    pub fn output_shape(&self, batch_size: i64) -> [i64; 4] {
        [
            batch_size,
            self.config.channels,
            self.config.image_size,
            self.config.image_size,
        ]
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Built stages, in order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

impl ModuleT for Generator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Generator::forward_t(self, xs, train)
    }
}
