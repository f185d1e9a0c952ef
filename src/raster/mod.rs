//! Image rasterization module
//!
//! This module turns a raster image into an ordered burn path:
//! 1. Load the image and fit it to the target physical size
//! 2. Convert to grayscale, optionally binarize
//! 3. Scan rows in alternating direction, quantizing each sample
//! 4. Merge straight runs of equal intensity

mod optimize;
mod prepare;
mod scan;

use crate::error::EngraveResult;
use crate::options::RasterOptions;
use crate::report::{Reporter, Stage};
use crate::types::{Move, PhysicalSize};
use image::{DynamicImage, GrayImage};
use std::path::Path;

pub use optimize::{intensity_transitions, optimize_moves};
pub use prepare::{
    PreparedImage, THRESHOLD, apply_threshold, fit_factor, load_image_bytes, load_image_file,
    prepare_image,
};
pub use scan::{RowDirection, quantize, quantize_image, scan_image, scan_row};

/// Result of rasterization: the optimized burn path over a prepared image
#[derive(Debug, Clone)]
pub struct Toolpath {
    /// Optimized moves in burn order
    pub moves: Vec<Move>,
    /// Physical area covered by the prepared image
    pub size: PhysicalSize,
    /// The prepared (resampled, unquantized) image
    pub image: GrayImage,
    /// Quantization depth used while scanning
    pub bits: u8,
    /// Move count before optimization
    pub raw_move_count: usize,
}

impl Toolpath {
    /// The prepared image quantized the way the scanner saw it
    pub fn preview(&self) -> GrayImage {
        quantize_image(&self.image, self.bits)
    }
}

/// Rasterize an image from bytes
pub fn rasterize_image(
    image_bytes: &[u8],
    options: &RasterOptions,
    reporter: &dyn Reporter,
) -> EngraveResult<Toolpath> {
    options.validate()?;
    let img = load_image_bytes(image_bytes)?;
    rasterize_dynamic_image(&img, options, reporter)
}

/// Rasterize an image file
pub fn rasterize_image_file(
    path: &Path,
    options: &RasterOptions,
    reporter: &dyn Reporter,
) -> EngraveResult<Toolpath> {
    options.validate()?;
    reporter.report(Stage::Prepare, &format!("Opening {}", path.display()));
    let img = load_image_file(path)?;
    rasterize_dynamic_image(&img, options, reporter)
}

/// Rasterize a decoded image
pub fn rasterize_dynamic_image(
    img: &DynamicImage,
    options: &RasterOptions,
    reporter: &dyn Reporter,
) -> EngraveResult<Toolpath> {
    let prepared = prepare_image(img, options)?;
    reporter.report(
        Stage::Prepare,
        &format!(
            "Resized to {} x {} samples at {} mm ({:.1} x {:.1} mm)",
            prepared.image.width(),
            prepared.image.height(),
            options.pitch,
            prepared.size.width_mm,
            prepared.size.height_mm
        ),
    );

    let raw = scan_image(&prepared.image, options.pitch, options.bits);
    reporter.report(
        Stage::Scan,
        &format!("Scanned {} moves at {} bits", raw.len(), options.bits),
    );

    let moves = optimize_moves(&raw);
    reporter.report(
        Stage::Optimize,
        &format!("Merged {} moves into {}", raw.len(), moves.len()),
    );

    Ok(Toolpath {
        moves,
        size: prepared.size,
        image: prepared.image,
        bits: options.bits,
        raw_move_count: raw.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use image::Luma;

    #[test]
    fn test_uniform_image_collapses_rows() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 3, Luma([128])));
        let opts = RasterOptions {
            width_mm: 10.0,
            height_mm: 3.0,
            pitch: 1.0,
            ..Default::default()
        };
        let path = rasterize_dynamic_image(&img, &opts, &NullReporter).unwrap();
        assert_eq!(path.raw_move_count, 3 * 12);
        // Per row: white step onto the row edge, one 128 run to the far edge
        assert_eq!(path.moves.len(), 6);
        assert!(path.moves.len() < path.raw_move_count);
    }
}
