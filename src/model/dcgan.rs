//! DCGAN wrapper combining Generator and Discriminator
//!
//! Owns one variable store per network so that each optimizer only ever
//! touches its own network's parameters.

use serde::{Deserialize, Serialize};
use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};
use crate::error::{GanError, Result};

/// Architecture of both networks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub generator: GeneratorConfig,
    pub discriminator: DiscriminatorConfig,
}

impl ModelConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let gen = &self.generator;
        let disc = &self.discriminator;
        if gen.image_size <= 0 || gen.image_size % 16 != 0 {
            return Err(GanError::InvalidConfig(format!(
                "image size must be a positive multiple of 16, got {}",
                gen.image_size
            )));
        }
        if gen.image_size != disc.image_size || gen.channels != disc.channels {
            return Err(GanError::InvalidConfig(format!(
                "generator produces {}x{}x{} images but discriminator expects {}x{}x{}",
                gen.channels, gen.image_size, gen.image_size,
                disc.channels, disc.image_size, disc.image_size
            )));
        }
        if gen.latent_dim <= 0 || gen.base_filters <= 0 || disc.base_filters <= 0 {
            return Err(GanError::InvalidConfig(
                "latent dimension and filter counts must be > 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&disc.leaky_slope) {
            return Err(GanError::InvalidConfig(format!(
                "leaky slope must be in [0, 1), got {}",
                disc.leaky_slope
            )));
        }
        Ok(())
    }
}

/// Adam hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamSettings {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
}

impl Default for AdamSettings {
    fn default() -> Self {
        Self {
            learning_rate: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
        }
    }
}

impl AdamSettings {
    fn build(&self, vs: &VarStore) -> Result<nn::Optimizer> {
        let optimizer = nn::Adam {
            beta1: self.beta1,
            beta2: self.beta2,
            wd: 0.0,
            ..Default::default()
        }
        .build(vs, self.learning_rate)?;
        Ok(optimizer)
    }
}

/// Complete DCGAN model
pub struct DCGAN {
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
}

impl DCGAN {
    /// Create a new DCGAN model with freshly initialized parameters
    pub fn new(config: &ModelConfig, device: Device) -> Result<Self> {
        config.validate()?;

        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);

        let generator = Generator::new(&gen_vs.root(), config.generator.clone());
        let discriminator = Discriminator::new(&disc_vs.root(), config.discriminator.clone());

        Ok(Self {
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            device,
        })
    }

    /// DCGAN with the default 32x32x3 architecture
    pub fn with_defaults(device: Device) -> Result<Self> {
        Self::new(&ModelConfig::default(), device)
    }

    /// Generate images from noise, checking the noise shape first
    ///
    /// # Arguments
    ///
    /// * `noise` - Tensor of shape (batch_size, latent_dim, 1, 1)
    /// * `train` - Whether in training mode (affects batch norm)
    pub fn generate(&self, noise: &Tensor, train: bool) -> Result<Tensor> {
        let batch_size = noise.size().first().copied().unwrap_or(0);
        let expected = self.generator.noise_shape(batch_size);
        if batch_size <= 0 || noise.size() != expected {
            return Err(GanError::shape("noise", expected, noise.size()));
        }
        Ok(self.generator.forward_t(noise, train))
    }

    /// Discriminate images (probability of being real), checking the shape
    pub fn discriminate(&self, images: &Tensor, train: bool) -> Result<Tensor> {
        let batch_size = images.size().first().copied().unwrap_or(0);
        let expected = self.generator.output_shape(batch_size);
        if batch_size <= 0 || images.size() != expected {
            return Err(GanError::shape("images", expected, images.size()));
        }
        Ok(self.discriminator.forward_t(images, train))
    }

    /// Generator optimizer
    pub fn gen_optimizer(&self, settings: &AdamSettings) -> Result<nn::Optimizer> {
        settings.build(&self.gen_vs)
    }

    /// Discriminator optimizer
    pub fn disc_optimizer(&self, settings: &AdamSettings) -> Result<nn::Optimizer> {
        settings.build(&self.disc_vs)
    }

    /// Get latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.generator.config().latent_dim
    }

    /// Architecture of both networks
    pub fn config(&self) -> ModelConfig {
        ModelConfig {
            generator: self.generator.config().clone(),
            discriminator: self.discriminator.config().clone(),
        }
    }
}
