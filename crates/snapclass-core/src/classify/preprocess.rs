//! Image preprocessing for ImageNet classifiers.
//!
//! - Input size: 224×224 (ResNet50, VGG16) or 299×299 (InceptionV3)
//! - Resampling: bicubic
//! - Grayscale and RGBA inputs are converted to three-channel RGB
//! - Normalization: per model (see `ModelKind::normalization`)

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

use super::model::{ModelKind, TensorLayout};

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// Preprocess an image for `model`, returning a batch-of-one tensor in the
/// requested layout.
pub fn preprocess(image: &DynamicImage, model: ModelKind, layout: TensorLayout) -> Array4<f32> {
    let size = model.input_size();
    let rgb = image.resize_exact(size, size, FilterType::CatmullRom).to_rgb8();
    let s = size as usize;

    let value = |x: usize, y: usize, c: usize| -> f32 {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        model.normalize(pixel.0, c)
    };

    match layout {
        TensorLayout::Nhwc => {
            Array4::from_shape_fn((1, s, s, CHANNELS), |(_, y, x, c)| value(x, y, c))
        }
        TensorLayout::Nchw => {
            Array4::from_shape_fn((1, CHANNELS, s, s), |(_, c, y, x)| value(x, y, c))
        }
    }
}
