//! Seeded latent noise

use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tch::{Device, Tensor};

/// Draws i.i.d. uniform [-1, 1] noise of shape (batch, latent_dim, 1, 1)
#[derive(Debug)]
pub struct NoiseSampler {
    latent_dim: i64,
    device: Device,
    rng: StdRng,
    dist: Uniform<f32>,
}

impl NoiseSampler {
    pub fn new(latent_dim: i64, seed: u64, device: Device) -> Self {
        Self {
            latent_dim,
            device,
            rng: StdRng::seed_from_u64(seed),
            dist: Uniform::new_inclusive(-1.0, 1.0),
        }
    }

    /// Fresh noise batch
    pub fn sample(&mut self, batch_size: i64) -> Tensor {
        let count = (batch_size * self.latent_dim) as usize;
        let values: Vec<f32> = (&mut self.rng).sample_iter(self.dist).take(count).collect();

        Tensor::from_slice(&values)
            .view([batch_size, self.latent_dim, 1, 1])
            .to_device(self.device)
    }

    pub fn latent_dim(&self) -> i64 {
        self.latent_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_shape_and_range() {
        let mut sampler = NoiseSampler::new(100, 0, Device::Cpu);
        let noise = sampler.sample(6);

        assert_eq!(noise.size(), vec![6, 100, 1, 1]);
        assert!(noise.min().double_value(&[]) >= -1.0);
        assert!(noise.max().double_value(&[]) <= 1.0);
    }

    #[test]
    fn test_noise_is_seeded() {
        let a = NoiseSampler::new(100, 100, Device::Cpu).sample(10);
        let b = NoiseSampler::new(100, 100, Device::Cpu).sample(10);
        let c = NoiseSampler::new(100, 101, Device::Cpu).sample(10);

        assert!(a.equal(&b));
        assert!(!a.equal(&c));
    }

    #[test]
    fn test_consecutive_draws_differ() {
        let mut sampler = NoiseSampler::new(100, 3, Device::Cpu);
        let first = sampler.sample(2);
        let second = sampler.sample(2);

        assert!(!first.equal(&second));
    }
}
