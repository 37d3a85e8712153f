//! Checkpoint save/load utilities
//!
//! A checkpoint is the generator's variable store in libtorch format plus a
//! JSON sidecar with the same stem describing the architecture it was
//! trained with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tch::nn::VarStore;

use crate::error::{GanError, Result};
use crate::model::GeneratorConfig;
use crate::training::TrainingMetrics;

/// Checkpoint metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Architecture the parameters belong to
    pub generator: GeneratorConfig,
    /// Iterations trained
    pub iterations: usize,
    /// Last logged generator loss
    pub gen_loss: Option<f64>,
    /// Last logged discriminator loss
    pub disc_loss: Option<f64>,
    /// Timestamp of checkpoint
    pub timestamp: String,
}

impl CheckpointMeta {
    pub fn new(generator: GeneratorConfig, iterations: usize, metrics: &TrainingMetrics) -> Self {
        Self {
            generator,
            iterations,
            gen_loss: metrics.latest_gen_loss(),
            disc_loss: metrics.latest_disc_loss(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// `cnn.pt` -> `cnn.json`
pub fn sidecar_path(checkpoint: &Path) -> PathBuf {
    checkpoint.with_extension("json")
}

/// `cnn.pt` -> `cnn_metrics.csv`
pub fn metrics_path(checkpoint: &Path) -> PathBuf {
    let stem = checkpoint
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checkpoint".to_string());
    checkpoint.with_file_name(format!("{}_metrics.csv", stem))
}

/// Save generator parameters and the sidecar
pub fn save_generator(vs: &VarStore, meta: &CheckpointMeta, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    vs.save(path)?;
    std::fs::write(sidecar_path(path), serde_json::to_string_pretty(meta)?)?;

    tracing::info!("Saved generator checkpoint to {}", path.display());
    Ok(())
}

/// Load checkpoint metadata, `None` when there is no sidecar
pub fn load_checkpoint_meta(path: &Path) -> Result<Option<CheckpointMeta>> {
    let meta_path = sidecar_path(path);
    if !meta_path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&meta_path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Restore generator parameters into `vs`
///
/// `vs` must already hold a generator built with `config`. When a sidecar
/// exists its architecture has to match `config`.
pub fn load_generator(
    vs: &mut VarStore,
    config: &GeneratorConfig,
    path: &Path,
) -> Result<Option<CheckpointMeta>> {
    if !path.is_file() {
        return Err(GanError::CheckpointMissing(path.to_path_buf()));
    }

    let meta = load_checkpoint_meta(path)?;
    match &meta {
        Some(meta) if meta.generator != *config => {
            return Err(GanError::shape(
                format!("generator architecture in {}", path.display()),
                config,
                &meta.generator,
            ));
        }
        Some(meta) => tracing::info!(
            "Checkpoint trained for {} iterations (saved {})",
            meta.iterations,
            meta.timestamp
        ),
        None => tracing::warn!(
            "No metadata next to {}, assuming the configured architecture",
            path.display()
        ),
    }

    vs.load(path)?;
    tracing::info!("Loaded generator from {}", path.display());
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Generator;
    use tch::Device;
    use tempfile::TempDir;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            base_filters: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_derived_paths() {
        let path = Path::new("runs/cnn.pt");
        assert_eq!(sidecar_path(path), PathBuf::from("runs/cnn.json"));
        assert_eq!(metrics_path(path), PathBuf::from("runs/cnn_metrics.csv"));
    }

    #[test]
    fn test_checkpoint_meta_serialization() {
        let mut metrics = TrainingMetrics::new();
        metrics.record(100, 0.5, 0.6);
        let meta = CheckpointMeta::new(small_config(), 100, &metrics);

        let json = serde_json::to_string(&meta).unwrap();
        let loaded: CheckpointMeta = serde_json::from_str(&json).unwrap();

        assert_eq!(meta, loaded);
        assert_eq!(loaded.gen_loss, Some(0.5));
    }

    #[test]
    fn test_missing_checkpoint() {
        let dir = TempDir::new().unwrap();
        let mut vs = VarStore::new(Device::Cpu);
        Generator::new(&vs.root(), small_config());

        let result = load_generator(&mut vs, &small_config(), &dir.path().join("cnn.pt"));
        assert!(matches!(result, Err(GanError::CheckpointMissing(_))));
    }

    #[test]
    fn test_architecture_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cnn.pt");

        let vs = VarStore::new(Device::Cpu);
        Generator::new(&vs.root(), small_config());
        let meta = CheckpointMeta::new(small_config(), 1, &TrainingMetrics::new());
        save_generator(&vs, &meta, &path).unwrap();

        let other = GeneratorConfig {
            base_filters: 8,
            ..Default::default()
        };
        let mut other_vs = VarStore::new(Device::Cpu);
        Generator::new(&other_vs.root(), other.clone());

        let result = load_generator(&mut other_vs, &other, &path);
        assert!(matches!(result, Err(GanError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_load_without_sidecar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cnn.pt");

        let vs = VarStore::new(Device::Cpu);
        Generator::new(&vs.root(), small_config());
        let meta = CheckpointMeta::new(small_config(), 1, &TrainingMetrics::new());
        save_generator(&vs, &meta, &path).unwrap();
        std::fs::remove_file(sidecar_path(&path)).unwrap();

        let mut restored = VarStore::new(Device::Cpu);
        Generator::new(&restored.root(), small_config());
        let loaded = load_generator(&mut restored, &small_config(), &path).unwrap();

        assert!(loaded.is_none());
    }
}
