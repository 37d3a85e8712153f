//! DCGAN for CIFAR-10 image generation
//!
//! Main entry point providing CLI interface for:
//! - Training the DCGAN on the CIFAR-10 binary batches
//! - Sampling image strips from a trained generator

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cifar_dcgan::{
    data::{CifarBinarySource, DatasetSource},
    model::DCGAN,
    sampling::{PngStripSink, Sampler},
    training::Trainer,
    utils::Config,
};

/// DCGAN for CIFAR-10 images
#[derive(Parser)]
#[command(name = "cifar_dcgan")]
#[command(version = "0.1.0")]
#[command(about = "Train a DCGAN on CIFAR-10 and sample images from it")]
struct Cli {
    /// Train the model and write the generator checkpoint
    #[arg(long)]
    train: bool,

    /// Load the generator checkpoint and write sample image strips
    #[arg(long)]
    test: bool,

    /// Path to configuration file (JSON or TOML); defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    /// Override the number of training iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Override the CIFAR-10 binary batch directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the generator checkpoint path
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Use CUDA if available
    #[arg(long)]
    gpu: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;

    if let Some(path) = &cli.write_config {
        save_config(&config, path)?;
        info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    if !cli.train && !cli.test {
        println!("Nothing to do. Run with --train to train the model,");
        println!("--test to sample images from a trained generator, or both.");
        println!("See --help for all options.");
        return Ok(());
    }

    if cli.train {
        train_model(&config)?;
    }
    if cli.test {
        sample_images(&config)?;
    }

    Ok(())
}

/// Configuration file (or defaults) with command line overrides applied
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };

    if let Some(iterations) = cli.iterations {
        config.training.iterations = iterations;
    }
    if let Some(dir) = &cli.data_dir {
        config.data.data_dir = dir.clone();
    }
    if let Some(path) = &cli.checkpoint {
        config.training.checkpoint_path = path.clone();
    }
    if cli.gpu {
        config.runtime.use_gpu = true;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn save_config(config: &Config, path: &Path) -> Result<()> {
    if path.extension().is_some_and(|ext| ext == "toml") {
        config.save_toml(path)?;
    } else {
        config.save_json(path)?;
    }
    Ok(())
}

/// Train the DCGAN model
fn train_model(config: &Config) -> Result<()> {
    tch::manual_seed(config.runtime.torch_seed);

    let device = config.get_device();
    info!("Using device: {:?}", device);

    let source = CifarBinarySource::new(&config.data.data_dir);
    info!("Loading {}", source.describe());
    let split = source
        .load()
        .with_context(|| format!("failed to load dataset from {}", source.dir().display()))?;
    info!(
        "Loaded {} training and {} test images",
        split.train.len(),
        split.test.len()
    );

    let mut model = DCGAN::new(&config.model, device).context("failed to build model")?;
    let mut trainer = Trainer::new(config.training.clone(), device);

    info!(
        "Starting training for {} iterations",
        config.training.iterations
    );
    let metrics = trainer.train(&mut model, &split.train).context("training failed")?;

    info!(
        "Training complete. Final G_loss: {:.4}, D_loss: {:.4}",
        metrics.latest_gen_loss().unwrap_or(0.0),
        metrics.latest_disc_loss().unwrap_or(0.0)
    );

    Ok(())
}

/// Sample image strips from the trained generator
fn sample_images(config: &Config) -> Result<()> {
    let device = config.get_device();
    let checkpoint = &config.training.checkpoint_path;

    let sampler = Sampler::from_checkpoint(checkpoint, &config.model, device)
        .with_context(|| format!("failed to restore generator from {}", checkpoint.display()))?;

    let mut sink = PngStripSink::from_config(&config.sampling);
    sampler
        .run(&config.sampling, &mut sink)
        .context("sampling failed")?;

    info!("Saved sample strips to {}", sink.dir().display());
    Ok(())
}
