//! Supported pretrained networks and their input conventions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClassifyError;

/// ImageNet mean in BGR order, subtracted in "caffe" preprocessing.
const CAFFE_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// A pretrained ImageNet classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "ResNet50")]
    ResNet50,
    #[serde(rename = "VGG16")]
    Vgg16,
    #[serde(rename = "InceptionV3")]
    InceptionV3,
}

/// How raw pixels are normalized before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// RGB→BGR, subtract the ImageNet mean, no scaling
    Caffe,
    /// Scale to [-1, 1]
    Tf,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::ResNet50, ModelKind::Vgg16, ModelKind::InceptionV3];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::ResNet50 => "ResNet50",
            ModelKind::Vgg16 => "VGG16",
            ModelKind::InceptionV3 => "InceptionV3",
        }
    }

    /// Directory name under the model dir.
    pub fn slug(&self) -> &'static str {
        match self {
            ModelKind::ResNet50 => "resnet50",
            ModelKind::Vgg16 => "vgg16",
            ModelKind::InceptionV3 => "inception_v3",
        }
    }

    /// Square input resolution expected by the network.
    pub fn input_size(&self) -> u32 {
        match self {
            ModelKind::InceptionV3 => 299,
            ModelKind::ResNet50 | ModelKind::Vgg16 => 224,
        }
    }

    pub fn normalization(&self) -> Normalization {
        match self {
            ModelKind::InceptionV3 => Normalization::Tf,
            ModelKind::ResNet50 | ModelKind::Vgg16 => Normalization::Caffe,
        }
    }

    /// Normalized value of channel `c` for an RGB pixel. Channel order follows
    /// the network's convention (BGR for caffe-style models).
    pub(crate) fn normalize(&self, rgb: [u8; 3], c: usize) -> f32 {
        match self.normalization() {
            Normalization::Caffe => {
                let bgr = [rgb[2], rgb[1], rgb[0]];
                f32::from(bgr[c]) - CAFFE_MEAN_BGR[c]
            }
            Normalization::Tf => f32::from(rgb[c]) / 127.5 - 1.0,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "resnet50" => Ok(ModelKind::ResNet50),
            "vgg16" => Ok(ModelKind::Vgg16),
            "inceptionv3" => Ok(ModelKind::InceptionV3),
            _ => Err(ClassifyError::UnknownModel(s.to_string())),
        }
    }
}

/// Memory layout of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// [batch, height, width, channels] (Keras exports)
    #[default]
    Nhwc,
    /// [batch, channels, height, width]
    Nchw,
}
