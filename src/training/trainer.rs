//! Training loop implementation for DCGAN
//!
//! Runs a fixed number of iterations. Each iteration performs one
//! discriminator update followed by one generator update.

use std::fmt;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tch::{nn, Device, Tensor};
use tracing::{debug, info, warn};

use super::losses::{all_finite, discriminator_loss, generator_loss, real_fake_labels};
use super::metrics::TrainingMetrics;
use crate::data::{to_training_tensor, ImageDataset, MinibatchScheduler};
use crate::error::{GanError, Result};
use crate::model::{AdamSettings, NoiseSampler, DCGAN};
use crate::utils::{metrics_path, save_generator, CheckpointMeta};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training iterations (one D step + one G step each)
    pub iterations: usize,
    /// Minibatch size
    pub batch_size: usize,
    /// Log losses every N iterations
    pub log_every: usize,
    /// Seed for minibatch shuffling
    pub shuffle_seed: u64,
    /// Seed for training noise
    pub noise_seed: u64,
    /// Where the generator parameters are written after training
    pub checkpoint_path: PathBuf,
    /// Check discriminator output for NaN/Inf and fail with `NumericInstability`.
    /// When off, NaN output still fails inside the BCE range check (`GanError::Torch`).
    pub abort_on_non_finite: bool,
    /// Show a progress bar
    pub show_progress: bool,
    /// Generator optimizer
    pub gen_optimizer: AdamSettings,
    /// Discriminator optimizer
    pub disc_optimizer: AdamSettings,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 20000,
            batch_size: 64,
            log_every: 100,
            shuffle_seed: 0,
            noise_seed: 1,
            checkpoint_path: PathBuf::from("cnn.pt"),
            abort_on_non_finite: true,
            show_progress: true,
            gen_optimizer: AdamSettings::default(),
            disc_optimizer: AdamSettings::default(),
        }
    }
}

impl TrainingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(GanError::InvalidConfig(
                "number of iterations must be > 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(GanError::InvalidConfig("batch size must be > 0".to_string()));
        }
        if self.log_every == 0 {
            return Err(GanError::InvalidConfig(
                "log interval must be > 0".to_string(),
            ));
        }
        for settings in [&self.gen_optimizer, &self.disc_optimizer] {
            if settings.learning_rate <= 0.0 {
                return Err(GanError::InvalidConfig(format!(
                    "learning rate must be > 0, got {}",
                    settings.learning_rate
                )));
            }
        }
        Ok(())
    }
}

/// Where the training state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    Initializing,
    DiscriminatorStep,
    GeneratorStep,
    Logging,
    Checkpointing,
    Done,
}

impl fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingPhase::Initializing => "initializing",
            TrainingPhase::DiscriminatorStep => "discriminator_step",
            TrainingPhase::GeneratorStep => "generator_step",
            TrainingPhase::Logging => "logging",
            TrainingPhase::Checkpointing => "checkpointing",
            TrainingPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-run state built in the initializing phase
struct RunState {
    images: Tensor,
    scheduler: MinibatchScheduler,
    noise: NoiseSampler,
    gen_opt: nn::Optimizer,
    disc_opt: nn::Optimizer,
}

/// DCGAN Trainer
pub struct Trainer {
    config: TrainingConfig,
    device: Device,
    metrics: TrainingMetrics,
    phase: TrainingPhase,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig, device: Device) -> Self {
        Self {
            config,
            device,
            metrics: TrainingMetrics::new(),
            phase: TrainingPhase::Initializing,
        }
    }

    fn enter(&mut self, phase: TrainingPhase) {
        if self.phase != phase {
            debug!("{} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Train the DCGAN model and write the generator checkpoint
    ///
    /// # Arguments
    ///
    /// * `model` - DCGAN model to train
    /// * `dataset` - Training images with pixel values in [0, 255]
    ///
    /// # Returns
    ///
    /// Training metrics
    pub fn train(&mut self, model: &mut DCGAN, dataset: &ImageDataset) -> Result<&TrainingMetrics> {
        self.enter(TrainingPhase::Initializing);
        let mut state = self.initialize(model, dataset)?;

        let total = self.config.iterations;
        info!(
            "Starting training for {} iterations, batch size {}, {} training images",
            total,
            self.config.batch_size,
            dataset.len()
        );

        let pb = self.progress_bar();
        let mut epoch = 0;

        for i in 0..total {
            let iteration = i + 1;

            self.enter(TrainingPhase::DiscriminatorStep);
            let d_loss = self.discriminator_step(model, &mut state, iteration)?;

            self.enter(TrainingPhase::GeneratorStep);
            let g_loss = self.generator_step(model, &mut state, iteration)?;

            let g = g_loss.double_value(&[]);
            let d = d_loss.double_value(&[]);

            if state.scheduler.epoch() != epoch {
                epoch = state.scheduler.epoch();
                debug!("Started pass {} over the training set", epoch + 1);
            }

            pb.inc(1);
            if iteration % self.config.log_every == 0 {
                self.enter(TrainingPhase::Logging);
                self.metrics.record(iteration, g, d);
                pb.set_message(format!("G: {:.4}, D: {:.4}", g, d));
                info!("iter {}: G_loss={:.4}, D_loss={:.4}", iteration, g, d);

                if self.metrics.check_mode_collapse(10) {
                    warn!("Possible mode collapse detected! Consider adjusting learning rates.");
                }
            }
        }
        pb.finish_with_message("done");

        self.enter(TrainingPhase::Checkpointing);
        self.checkpoint(model)?;

        self.enter(TrainingPhase::Done);
        Ok(&self.metrics)
    }

    fn initialize(&self, model: &DCGAN, dataset: &ImageDataset) -> Result<RunState> {
        self.config.validate()?;
        if self.config.batch_size > dataset.len() {
            return Err(GanError::InvalidBatchSize {
                size: self.config.batch_size,
                available: dataset.len(),
            });
        }

        let images = to_training_tensor(dataset, self.device)?;
        let expected = model.generator.output_shape(dataset.len() as i64);
        if images.size() != expected {
            return Err(GanError::shape("training images", expected, images.size()));
        }

        Ok(RunState {
            images,
            scheduler: MinibatchScheduler::new(dataset.len(), self.config.shuffle_seed),
            noise: NoiseSampler::new(model.latent_dim(), self.config.noise_seed, self.device),
            gen_opt: model.gen_optimizer(&self.config.gen_optimizer)?,
            disc_opt: model.disc_optimizer(&self.config.disc_optimizer)?,
        })
    }

    /// Fail on NaN/Inf discriminator output when the guard is enabled
    fn check_finite(&self, probs: &Tensor, iteration: usize, what: &str) -> Result<()> {
        if self.config.abort_on_non_finite && !all_finite(probs) {
            return Err(GanError::NumericInstability {
                iteration,
                what: what.to_string(),
            });
        }
        Ok(())
    }

    /// One discriminator update on a real-then-fake batch
    fn discriminator_step(
        &self,
        model: &DCGAN,
        state: &mut RunState,
        iteration: usize,
    ) -> Result<Tensor> {
        let batch_size = self.config.batch_size as i64;

        let indices: Vec<i64> = state
            .scheduler
            .next_batch(self.config.batch_size)?
            .into_iter()
            .map(|i| i as i64)
            .collect();
        let index = Tensor::from_slice(&indices).to_device(self.device);
        let real = state.images.index_select(0, &index);

        // No graph through the generator: this step only updates the discriminator.
        // Batch norm running statistics of the generator still move (train mode).
        let noise = state.noise.sample(batch_size);
        let fake = tch::no_grad(|| model.generator.forward_t(&noise, true));

        let input = Tensor::cat(&[real, fake], 0);
        let labels = real_fake_labels(batch_size, self.device);
        let probs = model.discriminator.forward_t(&input, true);
        self.check_finite(&probs, iteration, "discriminator output")?;
        let d_loss = discriminator_loss(&probs, &labels)?;

        state.disc_opt.zero_grad();
        d_loss.backward();
        state.disc_opt.step();

        Ok(d_loss)
    }

    /// One generator update through the full G -> D pipeline
    fn generator_step(
        &self,
        model: &DCGAN,
        state: &mut RunState,
        iteration: usize,
    ) -> Result<Tensor> {
        let batch_size = self.config.batch_size as i64;

        let noise = state.noise.sample(batch_size);
        let fake = model.generator.forward_t(&noise, true);
        let probs = model.discriminator.forward_t(&fake, true);
        self.check_finite(&probs, iteration, "discriminator output on generated images")?;
        let g_loss = generator_loss(&probs)?;

        state.gen_opt.zero_grad();
        g_loss.backward();
        state.gen_opt.step();

        Ok(g_loss)
    }

    fn checkpoint(&self, model: &DCGAN) -> Result<()> {
        let path = &self.config.checkpoint_path;
        let meta = CheckpointMeta::new(
            model.generator.config().clone(),
            self.config.iterations,
            &self.metrics,
        );
        save_generator(&model.gen_vs, &meta, path)?;

        if !self.metrics.is_empty() {
            let csv_path = metrics_path(path);
            self.metrics.save_csv(&csv_path)?;
            info!("Saved training metrics to {}", csv_path.display());
        }
        Ok(())
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(self.config.iterations as u64);
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb
    }

    /// Current phase of the training state machine
    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Get configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiscriminatorConfig, GeneratorConfig, ModelConfig};
    use tempfile::TempDir;

    fn small_model() -> DCGAN {
        let config = ModelConfig {
            generator: GeneratorConfig {
                base_filters: 8,
                ..Default::default()
            },
            discriminator: DiscriminatorConfig {
                base_filters: 4,
                ..Default::default()
            },
        };
        DCGAN::new(&config, Device::Cpu).unwrap()
    }

    fn quick_config(dir: &TempDir, iterations: usize) -> TrainingConfig {
        TrainingConfig {
            iterations,
            batch_size: 2,
            log_every: 1,
            checkpoint_path: dir.path().join("cnn.pt"),
            show_progress: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.iterations, 20000);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.log_every, 100);
        assert_eq!(config.gen_optimizer.learning_rate, 0.0002);
        assert_eq!(config.checkpoint_path, PathBuf::from("cnn.pt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trainer_runs_and_checkpoints() {
        let dir = TempDir::new().unwrap();
        let mut model = small_model();
        let dataset = ImageDataset::synthetic(5, 32, 0);

        let mut trainer = Trainer::new(quick_config(&dir, 3), Device::Cpu);
        let metrics = trainer.train(&mut model, &dataset).unwrap().clone();

        assert_eq!(metrics.iterations, vec![1, 2, 3]);
        assert!(metrics.gen_losses.iter().all(|l| l.is_finite()));
        assert!(metrics.disc_losses.iter().all(|l| l.is_finite()));
        assert_eq!(trainer.phase(), TrainingPhase::Done);
        assert!(dir.path().join("cnn.pt").is_file());
        assert!(dir.path().join("cnn.json").is_file());
        assert!(dir.path().join("cnn_metrics.csv").is_file());
    }

    #[test]
    fn test_discriminator_step_only_updates_discriminator() {
        let dir = TempDir::new().unwrap();
        let model = small_model();
        let dataset = ImageDataset::synthetic(4, 32, 0);
        let trainer = Trainer::new(quick_config(&dir, 1), Device::Cpu);
        let mut state = trainer.initialize(&model, &dataset).unwrap();

        let gen_before: Vec<Tensor> = model
            .gen_vs
            .trainable_variables()
            .iter()
            .map(|t| t.copy())
            .collect();
        let disc_before: Vec<Tensor> = model
            .disc_vs
            .trainable_variables()
            .iter()
            .map(|t| t.copy())
            .collect();

        let running_mean = |vs: &nn::VarStore| vs.variables()["project.bn.running_mean"].copy();
        let gen_stats_before = running_mean(&model.gen_vs);

        trainer.discriminator_step(&model, &mut state, 1).unwrap();

        let gen_after = model.gen_vs.trainable_variables();
        let disc_after = model.disc_vs.trainable_variables();
        assert!(gen_before.iter().zip(&gen_after).all(|(a, b)| a.equal(b)));
        assert!(disc_before.iter().zip(&disc_after).any(|(a, b)| !a.equal(b)));

        // Fakes are generated in train mode, so batch norm statistics follow the batch
        assert!(!gen_stats_before.equal(&running_mean(&model.gen_vs)));
    }

    #[test]
    fn test_fakes_carry_no_generator_graph() {
        let dir = TempDir::new().unwrap();
        let model = small_model();
        let dataset = ImageDataset::synthetic(4, 32, 0);
        let trainer = Trainer::new(quick_config(&dir, 1), Device::Cpu);
        let mut state = trainer.initialize(&model, &dataset).unwrap();

        trainer.discriminator_step(&model, &mut state, 1).unwrap();

        for var in model.gen_vs.trainable_variables() {
            assert!(!var.grad().defined());
        }
    }

    #[test]
    fn test_batch_larger_than_dataset() {
        let dir = TempDir::new().unwrap();
        let mut model = small_model();
        let dataset = ImageDataset::synthetic(1, 32, 0);

        let mut trainer = Trainer::new(quick_config(&dir, 1), Device::Cpu);
        let result = trainer.train(&mut model, &dataset);

        assert!(matches!(result, Err(GanError::InvalidBatchSize { size: 2, available: 1 })));
        assert!(!dir.path().join("cnn.pt").exists());
    }

    #[test]
    fn test_non_finite_loss_aborts() {
        let dir = TempDir::new().unwrap();
        let mut model = small_model();
        let dataset = ImageDataset::synthetic(4, 32, 0);

        tch::no_grad(|| {
            for mut var in model.disc_vs.trainable_variables() {
                let _ = var.fill_(f64::NAN);
            }
        });

        let mut trainer = Trainer::new(quick_config(&dir, 2), Device::Cpu);
        let result = trainer.train(&mut model, &dataset);

        assert!(matches!(result, Err(GanError::NumericInstability { iteration: 1, .. })));
    }

    #[test]
    fn test_unguarded_nan_fails_in_loss() {
        let dir = TempDir::new().unwrap();
        let mut model = small_model();
        let dataset = ImageDataset::synthetic(4, 32, 0);

        tch::no_grad(|| {
            for mut var in model.disc_vs.trainable_variables() {
                let _ = var.fill_(f64::NAN);
            }
        });

        let config = TrainingConfig {
            abort_on_non_finite: false,
            ..quick_config(&dir, 2)
        };
        let mut trainer = Trainer::new(config, Device::Cpu);
        let result = trainer.train(&mut model, &dataset);

        assert!(matches!(result, Err(GanError::Torch(_))));
        assert_eq!(trainer.phase(), TrainingPhase::DiscriminatorStep);
        assert!(!dir.path().join("cnn.pt").exists());
    }
}
