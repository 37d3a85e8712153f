//! Data module for loading and batching training images
//!
//! This module provides:
//! - The dataset provider contract and an in-memory provider
//! - CIFAR-10 binary batch reader
//! - Pixel normalization and tensor conversion
//! - Minibatch scheduler with wraparound

mod cifar;
mod dataset;
mod preprocessing;
mod scheduler;

pub use cifar::{decode_records, CifarBinarySource, DOWNLOAD_URL};
pub use dataset::{DatasetSource, DatasetSplit, ImageDataset, InMemorySource};
pub use preprocessing::{normalize_pixel, to_display_range, to_nhwc_array, to_training_tensor};
pub use scheduler::MinibatchScheduler;
