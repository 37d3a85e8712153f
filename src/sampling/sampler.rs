//! Generator restored for inference

use std::path::Path;

use tch::{nn::VarStore, Device, Tensor};

use super::sink::ImageSink;
use super::SamplingConfig;
use crate::data::to_display_range;
use crate::error::Result;
use crate::model::{Generator, GeneratorConfig, ModelConfig, NoiseSampler};
use crate::utils::{load_generator, CheckpointMeta};

/// A frozen generator that draws rows of images
pub struct Sampler {
    vs: VarStore,
    generator: Generator,
    device: Device,
    meta: Option<CheckpointMeta>,
}

impl Sampler {
    /// Sampler over freshly initialized parameters
    pub fn new(config: &GeneratorConfig, device: Device) -> Self {
        let mut vs = VarStore::new(device);
        let generator = Generator::new(&vs.root(), config.clone());
        vs.freeze();

        Self {
            vs,
            generator,
            device,
            meta: None,
        }
    }

    /// Restore generator parameters saved by training
    pub fn from_checkpoint(
        path: impl AsRef<Path>,
        config: &ModelConfig,
        device: Device,
    ) -> Result<Self> {
        let mut vs = VarStore::new(device);
        let generator = Generator::new(&vs.root(), config.generator.clone());
        let meta = load_generator(&mut vs, &config.generator, path.as_ref())?;
        vs.freeze();

        Ok(Self {
            vs,
            generator,
            device,
            meta,
        })
    }

    /// Copy parameters from a generator variable store (e.g. right after training)
    pub fn from_var_store(config: &GeneratorConfig, source: &VarStore) -> Result<Self> {
        let mut sampler = Self::new(config, source.device());
        sampler.vs.copy(source)?;
        Ok(sampler)
    }

    /// One row of `count` images in [0, 1], shape (count, channels, size, size)
    pub fn sample_row(&self, noise: &mut NoiseSampler, count: i64) -> Tensor {
        let z = noise.sample(count);
        tch::no_grad(|| to_display_range(&self.generator.forward_t(&z, false)))
    }

    /// Draw `config.rows` rows and hand each one to `sink`
    ///
    /// Noise is seeded from `config.seed`, so the same parameters always
    /// produce the same images.
    pub fn run<S: ImageSink + ?Sized>(&self, config: &SamplingConfig, sink: &mut S) -> Result<()> {
        config.validate()?;

        let mut noise =
            NoiseSampler::new(self.generator.config().latent_dim, config.seed, self.device);
        for row in 0..config.rows {
            let images = self.sample_row(&mut noise, config.per_row);
            sink.show(row, &images)?;
        }

        tracing::info!(
            "Sampled {} rows of {} images (seed {})",
            config.rows,
            config.per_row,
            config.seed
        );
        Ok(())
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Sidecar of the restored checkpoint, if it had one
    pub fn meta(&self) -> Option<&CheckpointMeta> {
        self.meta.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DCGAN;
    use crate::training::TrainingMetrics;
    use crate::utils::save_generator;
    use tempfile::TempDir;

    fn small_model_config() -> ModelConfig {
        let mut config = ModelConfig::default();
        config.generator.base_filters = 4;
        config.discriminator.base_filters = 4;
        config
    }

    fn small_sampling() -> SamplingConfig {
        SamplingConfig {
            rows: 2,
            per_row: 3,
            ..Default::default()
        }
    }

    fn max_abs_diff(a: &Tensor, b: &Tensor) -> f64 {
        (a - b).abs().max().double_value(&[])
    }

    #[test]
    fn test_rows_in_display_range() {
        let sampler = Sampler::new(&small_model_config().generator, Device::Cpu);

        let mut rows: Vec<Tensor> = Vec::new();
        sampler.run(&small_sampling(), &mut rows).unwrap();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.size(), vec![3, 3, 32, 32]);
            assert!(row.min().double_value(&[]) >= 0.0);
            assert!(row.max().double_value(&[]) <= 1.0);
        }
    }

    #[test]
    fn test_same_seed_same_images() {
        let sampler = Sampler::new(&small_model_config().generator, Device::Cpu);

        let mut first: Vec<Tensor> = Vec::new();
        let mut second: Vec<Tensor> = Vec::new();
        sampler.run(&small_sampling(), &mut first).unwrap();
        sampler.run(&small_sampling(), &mut second).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(max_abs_diff(a, b), 0.0);
        }
        // Different rows come from different noise
        assert!(max_abs_diff(&first[0], &first[1]) > 0.0);
    }

    #[test]
    fn test_fresh_default_generator_batch_of_ten_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cnn.pt");
        let config = ModelConfig::default();

        let model = DCGAN::new(&config, Device::Cpu).unwrap();
        let meta = CheckpointMeta::new(config.generator.clone(), 0, &TrainingMetrics::new());
        save_generator(&model.gen_vs, &meta, &path).unwrap();

        let sampling = SamplingConfig {
            rows: 1,
            ..Default::default()
        };
        assert_eq!((sampling.per_row, sampling.seed), (10, 100));

        let mut first: Vec<Tensor> = Vec::new();
        let mut second: Vec<Tensor> = Vec::new();
        Sampler::from_checkpoint(&path, &config, Device::Cpu)
            .unwrap()
            .run(&sampling, &mut first)
            .unwrap();
        Sampler::from_checkpoint(&path, &config, Device::Cpu)
            .unwrap()
            .run(&sampling, &mut second)
            .unwrap();

        assert_eq!(first[0].size(), vec![10, 3, 32, 32]);
        assert!(first[0].equal(&second[0]));
    }

    #[test]
    fn test_sampling_does_not_track_gradients() {
        let sampler = Sampler::new(&small_model_config().generator, Device::Cpu);
        let mut noise = NoiseSampler::new(100, 0, Device::Cpu);

        assert!(!sampler.sample_row(&mut noise, 2).requires_grad());
    }

    #[test]
    fn test_checkpoint_restores_trained_generator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cnn.pt");
        let config = small_model_config();

        let model = DCGAN::new(&config, Device::Cpu).unwrap();
        let meta = CheckpointMeta::new(config.generator.clone(), 0, &TrainingMetrics::new());
        save_generator(&model.gen_vs, &meta, &path).unwrap();

        let sampler = Sampler::from_checkpoint(&path, &config, Device::Cpu).unwrap();
        assert_eq!(sampler.meta().map(|m| m.iterations), Some(0));

        let mut noise = NoiseSampler::new(100, 7, Device::Cpu);
        let restored = sampler.sample_row(&mut noise, 2);

        let mut noise = NoiseSampler::new(100, 7, Device::Cpu);
        let z = noise.sample(2);
        let original = tch::no_grad(|| to_display_range(&model.generator.generate(&z)));

        assert!(max_abs_diff(&restored, &original) < 1e-6);
    }

    #[test]
    fn test_copy_from_var_store() {
        let config = small_model_config();
        let model = DCGAN::new(&config, Device::Cpu).unwrap();
        let sampler = Sampler::from_var_store(&config.generator, &model.gen_vs).unwrap();

        let mut noise = NoiseSampler::new(100, 3, Device::Cpu);
        let copied = sampler.sample_row(&mut noise, 2);
        let mut noise = NoiseSampler::new(100, 3, Device::Cpu);
        let z = noise.sample(2);
        let original = tch::no_grad(|| to_display_range(&model.generator.generate(&z)));

        assert!(max_abs_diff(&copied, &original) < 1e-6);
    }
}
