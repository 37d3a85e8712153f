//! Pixel preprocessing for GAN training
//!
//! This module provides functions for:
//! - Normalizing raw pixels to [-1, 1] (matches the generator's tanh output)
//! - Converting NHWC arrays to NCHW tensors
//! - Rescaling generator output to [0, 1] for display

use ndarray::Array4;
use tch::{Device, Kind, Tensor};

use super::dataset::ImageDataset;
use crate::error::{GanError, Result};

/// Map a raw pixel in [0, 255] to [-1, 1]
///
/// Formula: x_norm = x / 127.5 - 1
pub fn normalize_pixel(value: f32) -> f32 {
    value / 127.5 - 1.0
}

/// Normalize every image and convert to an NCHW float tensor on `device`
///
/// # Returns
///
/// Tensor of shape (num_images, channels, height, width) in [-1, 1]
pub fn to_training_tensor(dataset: &ImageDataset, device: Device) -> Result<Tensor> {
    if dataset.is_empty() {
        return Err(GanError::InvalidConfig(
            "training dataset is empty".to_string(),
        ));
    }

    let (height, width, channels) = dataset.image_shape();
    let nchw = dataset.images().view().permuted_axes([0, 3, 1, 2]);
    let values: Vec<f32> = nchw.iter().map(|&p| normalize_pixel(p)).collect();

    let tensor = Tensor::from_slice(&values)
        .view([
            dataset.len() as i64,
            channels as i64,
            height as i64,
            width as i64,
        ])
        .to_device(device);
    Ok(tensor)
}

/// Rescale generator output from [-1, 1] to [0, 1]
pub fn to_display_range(images: &Tensor) -> Tensor {
    ((images + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Copy an NCHW tensor back into an NHWC array
pub fn to_nhwc_array(images: &Tensor) -> Result<Array4<f32>> {
    let size = images.size();
    let [n, c, h, w] = size.as_slice() else {
        return Err(GanError::shape("image batch", "[N, C, H, W]", &size));
    };

    let nhwc = images
        .to_device(Device::Cpu)
        .to_kind(Kind::Float)
        .permute([0, 2, 3, 1])
        .contiguous();
    let values = Vec::<f32>::try_from(nhwc.flatten(0, -1))?;

    Array4::from_shape_vec((*n as usize, *h as usize, *w as usize, *c as usize), values)
        .map_err(|e| GanError::shape("image batch", &size, e.to_string()))
}
