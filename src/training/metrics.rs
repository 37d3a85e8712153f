//! Training metrics for monitoring GAN progress
//!
//! Losses are recorded at every logging point of the training loop.

use std::path::Path;

use crate::error::Result;

/// Metrics collected during training
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingMetrics {
    /// 1-based iteration of each record
    pub iterations: Vec<usize>,
    /// Generator losses
    pub gen_losses: Vec<f64>,
    /// Discriminator losses
    pub disc_losses: Vec<f64>,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record losses at `iteration`
    pub fn record(&mut self, iteration: usize, gen_loss: f64, disc_loss: f64) {
        self.iterations.push(iteration);
        self.gen_losses.push(gen_loss);
        self.disc_losses.push(disc_loss);
    }

    /// Get number of records
    pub fn len(&self) -> usize {
        self.gen_losses.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.gen_losses.is_empty()
    }

    /// Get latest generator loss
    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.gen_losses.last().copied()
    }

    /// Get latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Calculate moving average of generator loss
    pub fn gen_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.gen_losses, window)
    }

    /// Calculate moving average of discriminator loss
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.disc_losses, window)
    }

    /// Check if training appears to have collapsed
    ///
    /// Mode collapse indicators:
    /// - Discriminator loss very low (can easily distinguish)
    /// - Generator loss very high (can't fool discriminator)
    pub fn check_mode_collapse(&self, window: usize) -> bool {
        if self.len() < window {
            return false;
        }

        let disc_ma = self.disc_loss_ma(window);
        let gen_ma = self.gen_loss_ma(window);

        disc_ma < 0.1 && gen_ma > 5.0
    }

    /// Save metrics to CSV file
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["iteration", "gen_loss", "disc_loss"])?;

        for i in 0..self.len() {
            writer.write_record([
                self.iterations[i].to_string(),
                self.gen_losses[i].to_string(),
                self.disc_losses[i].to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load metrics from CSV file
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut metrics = Self::new();

        for result in reader.deserialize() {
            let (iteration, gen_loss, disc_loss): (usize, f64, f64) = result?;
            metrics.record(iteration, gen_loss, disc_loss);
        }

        Ok(metrics)
    }
}

/// Calculate moving average of last `window` values
fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = window.clamp(1, values.len());
    let sum: f64 = values.iter().rev().take(n).sum();
    sum / n as f64
}
