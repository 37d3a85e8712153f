//! # DCGAN for CIFAR-10 Images
//!
//! This crate provides a modular implementation of Deep Convolutional Generative
//! Adversarial Networks (DCGAN) that learn to generate 32x32 color images.
//!
//! ## Modules
//!
//! - `data`: CIFAR-10 loading, preprocessing and minibatch scheduling
//! - `model`: DCGAN architecture (Generator and Discriminator)
//! - `training`: Training loop and loss functions
//! - `sampling`: Drawing images from a trained generator
//! - `utils`: Configuration and checkpoints
//! - `error`: Error types shared by all modules

pub mod data;
pub mod error;
pub mod model;
pub mod sampling;
pub mod training;
pub mod utils;

pub use data::{CifarBinarySource, DatasetSource, ImageDataset, InMemorySource, MinibatchScheduler};
pub use error::{GanError, Result};
pub use model::{Discriminator, Generator, ModelConfig, NoiseSampler, DCGAN};
pub use sampling::{ImageSink, PngStripSink, Sampler, SamplingConfig};
pub use training::{Trainer, TrainingConfig, TrainingMetrics, TrainingPhase};
pub use utils::{load_generator, save_generator, CheckpointMeta, Config};
