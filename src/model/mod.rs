//! Model module containing GAN architecture components
//!
//! This module provides:
//! - Stage descriptors describing both architectures as data
//! - Generator network for creating images from noise
//! - Discriminator network for distinguishing real from fake
//! - DCGAN wrapper combining both networks
//! - Seeded noise sampler

mod dcgan;
mod discriminator;
mod generator;
mod noise;
pub mod stage;

pub use dcgan::{AdamSettings, ModelConfig, DCGAN};
pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use generator::{Generator, GeneratorConfig};
pub use noise::NoiseSampler;
