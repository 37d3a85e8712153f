//! Reader for the CIFAR-10 binary distribution
//!
//! Each record is one label byte followed by 3072 pixel bytes: the 1024 red
//! values of the 32x32 image in row-major order, then green, then blue.
//! The training split is `data_batch_1.bin` .. `data_batch_5.bin`, the test
//! split is `test_batch.bin`.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array4};
use tracing::info;

use super::dataset::{DatasetSource, DatasetSplit, ImageDataset};
use crate::error::{GanError, Result};

/// Side length of a CIFAR-10 image
pub const IMAGE_SIZE: usize = 32;
/// Color channels per image
pub const CHANNELS: usize = 3;
/// Bytes per record: label + pixels
pub const RECORD_BYTES: usize = 1 + IMAGE_SIZE * IMAGE_SIZE * CHANNELS;
/// Where the binary archive can be downloaded
pub const DOWNLOAD_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";

const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_FILE: &str = "test_batch.bin";

/// CIFAR-10 binary batches stored in a local directory
#[derive(Debug, Clone)]
pub struct CifarBinarySource {
    dir: PathBuf,
}

impl CifarBinarySource {
    /// Create a source reading from `dir` (usually `cifar-10-batches-bin`)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the batch files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unavailable(&self, path: &Path, reason: &str) -> GanError {
        GanError::DatasetUnavailable {
            path: path.to_path_buf(),
            reason: format!(
                "{}; download and extract {} into {}",
                reason,
                DOWNLOAD_URL,
                self.dir
                    .parent()
                    .map(|p| p.display().to_string())
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| ".".to_string())
            ),
        }
    }

    fn read_files(&self, names: &[&str]) -> Result<ImageDataset> {
        let mut records = Vec::new();
        for name in names {
            let path = self.dir.join(name);
            if !path.is_file() {
                return Err(self.unavailable(&path, "batch file not found"));
            }
            info!("Reading {}", path.display());
            let bytes = std::fs::read(&path)?;
            if bytes.len() % RECORD_BYTES != 0 {
                return Err(GanError::shape(
                    format!("CIFAR-10 batch {}", path.display()),
                    format!("a multiple of {} bytes", RECORD_BYTES),
                    bytes.len(),
                ));
            }
            records.extend_from_slice(&bytes);
        }
        decode_records(&records)
    }
}

impl DatasetSource for CifarBinarySource {
    fn load(&self) -> Result<DatasetSplit> {
        if !self.dir.is_dir() {
            return Err(self.unavailable(&self.dir, "directory not found"));
        }
        let train = self.read_files(&TRAIN_FILES)?;
        let test = self.read_files(&[TEST_FILE])?;
        info!(
            "Loaded CIFAR-10: {} train images, {} test images",
            train.len(),
            test.len()
        );
        Ok(DatasetSplit { train, test })
    }

    fn describe(&self) -> String {
        format!("CIFAR-10 binary batches in {}", self.dir.display())
    }
}

/// Decode concatenated records into NHWC images in `[0, 255]`
pub fn decode_records(bytes: &[u8]) -> Result<ImageDataset> {
    let num_images = bytes.len() / RECORD_BYTES;
    let plane = IMAGE_SIZE * IMAGE_SIZE;

    let labels = Array1::from_iter((0..num_images).map(|i| bytes[i * RECORD_BYTES] as i64));
    let images = Array4::from_shape_fn(
        (num_images, IMAGE_SIZE, IMAGE_SIZE, CHANNELS),
        |(i, y, x, c)| bytes[i * RECORD_BYTES + 1 + c * plane + y * IMAGE_SIZE + x] as f32,
    );

    ImageDataset::new(images, labels)
}
