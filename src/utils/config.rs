//! Configuration management
//!
//! Provides unified configuration for training and sampling. Every section
//! defaults to the reference CIFAR-10 setup, so a partial file only needs
//! the values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GanError, Result};
use crate::model::ModelConfig;
use crate::sampling::SamplingConfig;
use crate::training::TrainingConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Training configuration
    pub training: TrainingConfig,
    /// Sampling configuration
    pub sampling: SamplingConfig,
    /// Device and libtorch seeding
    pub runtime: RuntimeConfig,
}

/// Data-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the CIFAR-10 binary batches
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("cifar-10-batches-bin"),
        }
    }
}

/// Device selection and libtorch seeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Run on CUDA when available
    pub use_gpu: bool,
    /// Seed for libtorch (parameter initialization)
    pub torch_seed: i64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            use_gpu: false,
            torch_seed: 0,
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_toml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `.toml` or JSON depending on the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(path)
        } else {
            Self::from_json(path)
        }
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        if self.runtime.use_gpu {
            if tch::Cuda::is_available() {
                tch::Device::Cuda(0)
            } else {
                tracing::warn!("CUDA requested but not available, falling back to CPU");
                tch::Device::Cpu
            }
        } else {
            tch::Device::Cpu
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.training.validate()?;
        self.sampling.validate()?;
        if self.data.data_dir.as_os_str().is_empty() {
            return Err(GanError::InvalidConfig(
                "data directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
