//! Image representation for the grading pipeline.

use crate::error::{GradeError, Result};

/// RGBA f32 image, row-major.
///
/// Holds linear-light values on the way in and display-encoded values on the
/// way out; the pipeline never changes its dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data, `width × height` RGBA entries.
    pub pixels: Vec<[f32; 4]>,
}

impl GradingImage {
    /// Wrap a pixel buffer, checking it matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(GradeError::DimensionMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgba; width as usize * height as usize],
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Pixel at `(x, y)`, if in bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Import a float image (assumed linear-light).
    pub fn from_rgba32f(image: &::image::Rgba32FImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.pixels().map(|p| p.0).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Export as a float image, values unchanged.
    ///
    /// Pixels missing from a short buffer export as transparent black.
    pub fn to_rgba32f(&self) -> ::image::Rgba32FImage {
        ::image::ImageBuffer::from_fn(self.width, self.height, |x, y| {
            ::image::Rgba(self.pixel_or_zero(x, y))
        })
    }

    /// Quantize display-encoded values to 8 bits per channel.
    ///
    /// Values are clamped to `[0, 1]` and rounded to nearest.
    pub fn to_rgba8(&self) -> ::image::RgbaImage {
        ::image::ImageBuffer::from_fn(self.width, self.height, |x, y| {
            ::image::Rgba(self.pixel_or_zero(x, y).map(quantize_u8))
        })
    }

    #[inline]
    fn pixel_or_zero(&self, x: u32, y: u32) -> [f32; 4] {
        self.get(x, y).unwrap_or([0.0; 4])
    }
}

#[inline]
fn quantize_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = GradingImage::new(2, 2, vec![[0.0; 4]; 3]).unwrap_err();
        assert!(matches!(
            err,
            GradeError::DimensionMismatch {
                width: 2,
                height: 2,
                len: 3
            }
        ));
    }

    #[test]
    fn test_get_bounds() {
        let img = GradingImage::new(2, 1, vec![[0.1, 0.2, 0.3, 1.0], [0.4, 0.5, 0.6, 0.5]]).unwrap();
        assert_eq!(img.get(1, 0), Some([0.4, 0.5, 0.6, 0.5]));
        assert_eq!(img.get(2, 0), None);
        assert_eq!(img.get(0, 1), None);
    }

    #[test]
    fn test_rgba32f_round_trip() {
        let img = GradingImage::new(
            2,
            2,
            vec![
                [0.0, 0.5, 1.0, 1.0],
                [2.0, 0.1, 0.2, 0.5],
                [0.3, 0.3, 0.3, 1.0],
                [-0.1, 4.0, 0.0, 0.0],
            ],
        )
        .unwrap();
        let back = GradingImage::from_rgba32f(&img.to_rgba32f());
        assert_eq!(back, img);
    }

    #[test]
    fn test_export_tolerates_short_buffer() {
        let img = GradingImage {
            width: 2,
            height: 2,
            pixels: vec![[1.0, 1.0, 1.0, 1.0]],
        };
        let out = img.to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [255; 4]);
        assert_eq!(out.get_pixel(1, 1).0, [0; 4]);
        assert_eq!(img.to_rgba32f().get_pixel(1, 0).0, [0.0; 4]);
    }

    #[test]
    fn test_to_rgba8_clamps_and_rounds() {
        let img = GradingImage::new(1, 1, vec![[-0.2, 0.5, 1.7, 1.0]]).unwrap();
        let out = img.to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [0, 128, 255, 255]);
    }
}
