//! Destinations for sampled image rows

use std::path::{Path, PathBuf};

use tch::{Device, Kind, Tensor};

use super::SamplingConfig;
use crate::error::{GanError, Result};

/// Receives one row of images at a time
///
/// `images` has shape (per_row, channels, height, width) with values in [0, 1].
pub trait ImageSink {
    fn show(&mut self, row: usize, images: &Tensor) -> Result<()>;
}

/// Keeps rows in memory
impl ImageSink for Vec<Tensor> {
    fn show(&mut self, _row: usize, images: &Tensor) -> Result<()> {
        self.push(images.copy());
        Ok(())
    }
}

/// Writes each row as a single horizontal PNG strip
#[derive(Debug, Clone)]
pub struct PngStripSink {
    dir: PathBuf,
    prefix: String,
}

impl PngStripSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &SamplingConfig) -> Self {
        Self::new(&config.output_dir, &config.file_prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix>_row<row>.png`
    pub fn path_for(&self, row: usize) -> PathBuf {
        self.dir.join(format!("{}_row{}.png", self.prefix, row))
    }
}

impl ImageSink for PngStripSink {
    fn show(&mut self, row: usize, images: &Tensor) -> Result<()> {
        let size = images.size();
        if size.len() != 4 || size[0] == 0 {
            return Err(GanError::shape(
                "image row",
                "(per_row, channels, height, width)",
                size,
            ));
        }

        std::fs::create_dir_all(&self.dir)?;

        // (n, c, h, w) -> (c, h, n * w)
        let strip = Tensor::cat(&images.unbind(0), 2);
        let pixels = (strip.clamp(0.0, 1.0) * 255.0)
            .round()
            .to_kind(Kind::Uint8)
            .to_device(Device::Cpu);

        let path = self.path_for(row);
        tch::vision::image::save(&pixels, &path)?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}
