//! Utility module with helper functions
//!
//! This module provides:
//! - Configuration handling
//! - Checkpoint save/load utilities

mod checkpoint;
mod config;

pub use checkpoint::{
    load_checkpoint_meta, load_generator, metrics_path, save_generator, sidecar_path,
    CheckpointMeta,
};
pub use config::{Config, DataConfig, RuntimeConfig};
