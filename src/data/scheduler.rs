//! Minibatch index scheduler for iteration-based training
//!
//! Hands out shuffled index batches for an unbounded number of iterations:
//! - Shuffled pool of all dataset indices
//! - Reshuffle whenever the pool runs out
//! - Batches that straddle the end of the pool keep the old tail as is

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{GanError, Result};

/// Cycles through a permutation of `0..num_samples`
#[derive(Debug)]
pub struct MinibatchScheduler {
    /// Current permutation of dataset indices
    pool: Vec<usize>,
    /// Next unconsumed position in `pool`
    pos: usize,
    /// Number of reshuffles after the initial one
    epoch: usize,
    rng: StdRng,
}

impl MinibatchScheduler {
    /// Create a scheduler over `num_samples` indices, shuffled with `seed`
    pub fn new(num_samples: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool: Vec<usize> = (0..num_samples).collect();
        pool.shuffle(&mut rng);

        Self {
            pool,
            pos: 0,
            epoch: 0,
            rng,
        }
    }

    /// Get total number of samples
    pub fn num_samples(&self) -> usize {
        self.pool.len()
    }

    /// Cursor into the current permutation
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Completed passes over the pool
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Current permutation
    pub fn pool(&self) -> &[usize] {
        &self.pool
    }

    /// Draw the next `size` indices
    ///
    /// When fewer than `size` indices remain, the remaining tail is taken in
    /// its current order, the pool is reshuffled and the batch is completed
    /// from the head of the new permutation.
    pub fn next_batch(&mut self, size: usize) -> Result<Vec<usize>> {
        let num_samples = self.pool.len();
        if size == 0 || size > num_samples {
            return Err(GanError::InvalidBatchSize {
                size,
                available: num_samples,
            });
        }

        if self.pos + size <= num_samples {
            let batch = self.pool[self.pos..self.pos + size].to_vec();
            self.pos += size;
            return Ok(batch);
        }

        let mut batch = self.pool[self.pos..].to_vec();
        let needed = size - batch.len();

        self.pool.shuffle(&mut self.rng);
        self.epoch += 1;

        batch.extend_from_slice(&self.pool[..needed]);
        self.pos = needed;
        Ok(batch)
    }
}
