use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

use super::InferenceError;

pub const INPUT_SIZE: u32 = 224;

/// Image pixels scaled to `[0, 1]`, laid out `[1, height, width, 3]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub data: Vec<f32>,
    pub height: usize,
    pub width: usize,
}

impl ImageTensor {
    pub const CHANNELS: usize = 3;

    pub fn shape(&self) -> [usize; 4] {
        [1, self.height, self.width, Self::CHANNELS]
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        // nearest-neighbour keeps parity with how the model was trained
        let rgb = image
            .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Nearest)
            .to_rgb8();
        let data = rgb
            .pixels()
            .flat_map(|pixel| pixel.0)
            .map(|value| value as f32 / 255.0)
            .collect();
        Self {
            data,
            height: INPUT_SIZE as usize,
            width: INPUT_SIZE as usize,
        }
    }
}

pub fn preprocess(path: &Path) -> Result<ImageTensor, InferenceError> {
    let image = image::open(path)?;
    Ok(ImageTensor::from_image(&image))
}
