//! Image loading and preprocessing
//!
//! Fits the source image into the target physical box at the sample pitch,
//! reduces it to a single gray channel and optionally binarizes it.

use crate::error::{EngraveError, EngraveResult};
use crate::options::{Binarize, RasterOptions};
use crate::types::PhysicalSize;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, ImageReader, Luma};
use std::io::Cursor;
use std::path::Path;

/// Gray level at or above which a sample becomes white when thresholding
pub const THRESHOLD: u8 = 128;

/// A resampled single-channel raster and the physical area it covers
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: GrayImage,
    pub size: PhysicalSize,
}

/// Load and decode an image file
pub fn load_image_file(path: &Path) -> EngraveResult<DynamicImage> {
    let origin = path.display().to_string();
    ImageReader::open(path)
        .map_err(|e| EngraveError::ImageLoad {
            origin: origin.clone(),
            source: image::ImageError::IoError(e),
        })?
        .with_guessed_format()
        .map_err(|e| EngraveError::ImageLoad {
            origin: origin.clone(),
            source: image::ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| EngraveError::ImageLoad { origin, source })
}

/// Decode an image held in memory
pub fn load_image_bytes(bytes: &[u8]) -> EngraveResult<DynamicImage> {
    let origin = "<memory>".to_string();
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EngraveError::ImageLoad {
            origin: origin.clone(),
            source: image::ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| EngraveError::ImageLoad { origin, source })
}

/// Uniform scale factor that fits `src_w` x `src_h` samples inside the
/// target box, preserving aspect ratio.
pub fn fit_factor(src_w: u32, src_h: u32, options: &RasterOptions) -> f64 {
    let fx = options.width_mm / (src_w as f64 * options.pitch);
    let fy = options.height_mm / (src_h as f64 * options.pitch);
    fx.min(fy)
}

/// Resample, gray-convert and optionally binarize an image.
pub fn prepare_image(img: &DynamicImage, options: &RasterOptions) -> EngraveResult<PreparedImage> {
    options.validate()?;

    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(EngraveError::InvalidSize(format!(
            "source image is empty ({} x {})",
            src_w, src_h
        )));
    }

    let factor = fit_factor(src_w, src_h, options);
    let width = (src_w as f64 * factor).round();
    let height = (src_h as f64 * factor).round();
    if width < 1.0 || height < 1.0 || width > u32::MAX as f64 || height > u32::MAX as f64 {
        return Err(EngraveError::InvalidSize(format!(
            "resampling {} x {} by {:.4} gives {} x {} samples",
            src_w, src_h, factor, width, height
        )));
    }
    let (width, height) = (width as u32, height as u32);

    tracing::debug!(
        src_w,
        src_h,
        width,
        height,
        factor,
        "resampling image with Lanczos3"
    );

    let mut gray = img
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_luma8();

    match options.binarize {
        Binarize::None => {}
        Binarize::Threshold => apply_threshold(&mut gray, THRESHOLD),
        Binarize::Dither => imageops::dither(&mut gray, &imageops::BiLevel),
    }

    Ok(PreparedImage {
        image: gray,
        size: PhysicalSize::from_samples(width, height, options.pitch),
    })
}

/// Reduce to pure black and white at `threshold`
pub fn apply_threshold(image: &mut GrayImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        *pixel = if pixel.0[0] >= threshold {
            Luma([255])
        } else {
            Luma([0])
        };
    }
}
