//! Sampling from a trained generator
//!
//! This module provides:
//! - `Sampler`: restores generator parameters and draws rows of images
//! - `ImageSink`: where sampled rows end up (PNG strips, memory)

mod sampler;
mod sink;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{GanError, Result};

pub use sampler::Sampler;
pub use sink::{ImageSink, PngStripSink};

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Number of rows to produce
    pub rows: usize,
    /// Images per row
    pub per_row: i64,
    /// Seed for the noise generator
    pub seed: u64,
    /// Directory for PNG strips
    pub output_dir: PathBuf,
    /// File name prefix of the PNG strips
    pub file_prefix: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            per_row: 10,
            seed: 100,
            output_dir: PathBuf::from("samples"),
            file_prefix: "generated".to_string(),
        }
    }
}

impl SamplingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.per_row <= 0 {
            return Err(GanError::InvalidConfig(format!(
                "sampling needs at least one row and one image per row, got {}x{}",
                self.rows, self.per_row
            )));
        }
        if self.file_prefix.is_empty() {
            return Err(GanError::InvalidConfig(
                "sample file prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_defaults() {
        let config = SamplingConfig::default();
        assert_eq!((config.rows, config.per_row, config.seed), (3, 10, 100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sampling_validation() {
        let config = SamplingConfig {
            per_row: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GanError::InvalidConfig(_))));

        let config = SamplingConfig {
            file_prefix: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
