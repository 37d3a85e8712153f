//! Training module for DCGAN
//!
//! This module provides:
//! - Training loop implementation (discriminator/generator alternation)
//! - Loss functions (Binary Cross Entropy)
//! - Training configuration and metrics

mod losses;
mod metrics;
mod trainer;

pub use losses::{all_finite, discriminator_loss, generator_loss, real_fake_labels};
pub use metrics::TrainingMetrics;
pub use trainer::{Trainer, TrainingConfig, TrainingPhase};
