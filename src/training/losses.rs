//! Loss functions for GAN training
//!
//! Binary cross entropy on discriminator probabilities (the discriminator
//! ends in a sigmoid, so these are not the logits variants).

use tch::{Device, Kind, Tensor};

use crate::error::Result;

/// Labels for a real-then-fake discriminator batch
///
/// `batch_size` ones followed by `batch_size` zeros.
pub fn real_fake_labels(batch_size: i64, device: Device) -> Tensor {
    Tensor::cat(
        &[
            Tensor::ones([batch_size], (Kind::Float, device)),
            Tensor::zeros([batch_size], (Kind::Float, device)),
        ],
        0,
    )
}

/// Mean BCE between probabilities of shape (N, 1) and targets of shape (N)
///
/// libtorch rejects probabilities outside [0, 1] (including NaN); that
/// surfaces as an error instead of a panic.
fn bce(probs: &Tensor, targets: &Tensor) -> Result<Tensor> {
    let loss = probs
        .select(1, 0)
        .f_binary_cross_entropy::<Tensor>(targets, None, tch::Reduction::Mean)?;
    Ok(loss)
}

/// True when no element is NaN or infinite
pub fn all_finite(t: &Tensor) -> bool {
    t.isfinite().all().to_kind(Kind::Int64).int64_value(&[]) != 0
}

/// Discriminator loss: -mean(t*log(D(x)) + (1-t)*log(1-D(x)))
///
/// # Arguments
///
/// * `probs` - Discriminator output on the concatenated real+fake batch
/// * `labels` - Targets from [`real_fake_labels`]
///
/// # Returns
///
/// Scalar loss tensor
pub fn discriminator_loss(probs: &Tensor, labels: &Tensor) -> Result<Tensor> {
    bce(probs, labels)
}

/// Generator loss: -mean(log(D(G(z))))
///
/// The generator wants the discriminator to output 1 (real) for fake samples.
pub fn generator_loss(fake_probs: &Tensor) -> Result<Tensor> {
    let targets = Tensor::ones([fake_probs.size()[0]], (Kind::Float, fake_probs.device()));
    bce(fake_probs, &targets)
}
