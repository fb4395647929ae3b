//! Encoded image bytes to normalized NHWC tensor

use image::imageops::{self, FilterType};
use tract_onnx::prelude::tract_ndarray::Array4;
use tracing::debug;

use crate::error::{DetectorError, Result};
use super::{INPUT_CHANNELS, INPUT_SIZE};

/// Model input tensor, shape `(1, 224, 224, 3)`, RGB values in `[0, 1]`
pub type ImageTensor = Array4<f32>;

/// Decodes raw image bytes into an [`ImageTensor`].
///
/// Decoding is pure: the same bytes always produce the same tensor.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    size: u32,
    filter: FilterType,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self {
            size: INPUT_SIZE as u32,
            // Bicubic
            filter: FilterType::CatmullRom,
        }
    }
}

impl ImageDecoder {
    /// Decode, resize and normalize `bytes`
    pub fn decode(&self, bytes: &[u8]) -> Result<ImageTensor> {
        if bytes.is_empty() {
            return Err(DetectorError::DecodeError("image payload is empty".to_string()));
        }

        let img = image::load_from_memory(bytes)?;
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Decoded image"
        );

        let rgb = img.to_rgb8();
        let resized = imageops::resize(&rgb, self.size, self.size, self.filter);

        let side = self.size as usize;
        let tensor = Array4::from_shape_fn((1, side, side, INPUT_CHANNELS), |(_, y, x, c)| {
            resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
        });

        Ok(tensor)
    }
}

/// Decode with the default decoder
pub fn decode(bytes: &[u8]) -> Result<ImageTensor> {
    ImageDecoder::default().decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::INPUT_SHAPE;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
        })
    }

    #[test]
    fn test_png_has_model_shape_and_range() {
        let bytes = encode(gradient(64, 48), ImageFormat::Png);
        let tensor = decode(&bytes).unwrap();

        assert_eq!(tensor.shape(), &INPUT_SHAPE);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_jpeg_decodes() {
        let bytes = encode(gradient(300, 200), ImageFormat::Jpeg);
        let tensor = decode(&bytes).unwrap();
        assert_eq!(tensor.shape(), &INPUT_SHAPE);
    }

    #[test]
    fn test_non_square_is_stretched_not_cropped() {
        let bytes = encode(gradient(10, 400), ImageFormat::Png);
        let tensor = decode(&bytes).unwrap();
        assert_eq!(tensor.shape(), &INPUT_SHAPE);
    }

    #[test]
    fn test_solid_colors_are_scaled_by_255() {
        let white = encode(RgbImage::from_pixel(32, 32, Rgb([255, 255, 255])), ImageFormat::Png);
        let tensor = decode(&white).unwrap();
        assert!(tensor.iter().all(|v| (*v - 1.0).abs() < 5e-3));

        let red = encode(RgbImage::from_pixel(32, 32, Rgb([255, 0, 0])), ImageFormat::Png);
        let tensor = decode(&red).unwrap();
        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 5e-3);
        assert!(tensor[[0, 100, 100, 1]].abs() < 5e-3);
        assert!(tensor[[0, 100, 100, 2]].abs() < 5e-3);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let bytes = encode(gradient(50, 70), ImageFormat::Png);
        assert_eq!(decode(&bytes).unwrap(), decode(&bytes).unwrap());
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = decode(&[]).unwrap_err();
        assert!(matches!(err, DetectorError::DecodeError(_)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DetectorError::DecodeError(_)));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let bytes = encode(gradient(64, 64), ImageFormat::Png);
        let err = decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, DetectorError::DecodeError(_)));
    }
}
