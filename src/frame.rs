use crate::{
    config::ViewerConfig,
    enums::ResampleFilter,
    error::{FrameError, UnsupportedShapeError},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use ndarray::ArrayD;
use std::io::Cursor;

/// A display-ready slice: PNG bytes no larger than the configured bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFrame {
    pub source_filename: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl NormalizedFrame {
    /// Inline form for HTML transport.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameBuilder {
    bound: (u32, u32),
    filter: ResampleFilter,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl FrameBuilder {
    pub fn new(bound: (u32, u32), filter: ResampleFilter) -> Self {
        Self {
            bound: (bound.0.max(1), bound.1.max(1)),
            filter,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.frame_bound, config.filter)
    }

    /// Scales an 8-bit array down to fit the bound and encodes it as PNG.
    /// Images already inside the bound keep their size.
    pub fn build(
        &self,
        source_filename: &str,
        normalized: &ArrayD<u8>,
    ) -> Result<NormalizedFrame, FrameError> {
        let image = Self::array_to_image(normalized)?;
        let (width, height) = Self::thumbnail_size(image.width(), image.height(), self.bound);

        let image = if (width, height) == (image.width(), image.height()) {
            image
        } else {
            image.resize_exact(width, height, self.filter.filter_type())
        };

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(NormalizedFrame {
            source_filename: source_filename.to_string(),
            png,
            width,
            height,
        })
    }

    /// Largest size with the same aspect ratio that fits inside `bound`,
    /// never larger than the input.
    pub fn thumbnail_size(width: u32, height: u32, bound: (u32, u32)) -> (u32, u32) {
        let (max_width, max_height) = bound;
        if width <= max_width && height <= max_height {
            return (width, height);
        }

        let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
        let scaled_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
        let scaled_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
        (scaled_width, scaled_height)
    }

    fn array_to_image(normalized: &ArrayD<u8>) -> Result<DynamicImage, FrameError> {
        let shape = normalized.shape();
        let (rows, columns, channels) = match *shape {
            [rows, columns] => (rows, columns, 1),
            [rows, columns, channels] => (rows, columns, channels),
            _ => {
                return Err(UnsupportedShapeError {
                    ndim: shape.len(),
                }
                .into());
            }
        };
        if rows == 0 || columns == 0 {
            return Err(FrameError::Empty);
        }

        let width = columns as u32;
        let height = rows as u32;
        let pixel_data: Vec<u8> = normalized.iter().copied().collect();
        let size_error = FrameError::BufferSize { width, height };

        let image = match channels {
            1 => GrayImage::from_raw(width, height, pixel_data).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, pixel_data).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(width, height, pixel_data).map(DynamicImage::ImageRgba8),
            other => return Err(FrameError::UnsupportedChannels(other)),
        };
        image.ok_or(size_error)
    }
}
