//! Raster parameters shared by the preprocessing and scanning stages.

use crate::error::{EngraveError, EngraveResult};

/// How the grayscale raster is reduced to black and white, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binarize {
    /// Keep grayscale
    #[default]
    None,
    /// Hard threshold at mid-gray
    Threshold,
    /// Floyd-Steinberg error diffusion onto black/white
    Dither,
}

/// Options for rasterizing an image into a move sequence
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Target width in millimeters (the image is fit inside this box)
    pub width_mm: f64,
    /// Target height in millimeters
    pub height_mm: f64,
    /// Sample pitch in millimeters per sample (laser dot size)
    pub pitch: f64,
    /// Quantization depth in bits (1-8)
    pub bits: u8,
    /// Black/white reduction applied after resampling
    pub binarize: Binarize,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            width_mm: 100.0,
            height_mm: 100.0,
            pitch: 0.1,
            bits: 8,
            binarize: Binarize::None,
        }
    }
}

impl RasterOptions {
    /// Check every parameter before any processing starts.
    pub fn validate(&self) -> EngraveResult<()> {
        if !(self.pitch > 0.0) || !self.pitch.is_finite() {
            return Err(EngraveError::invalid_parameter(
                "dot",
                self.pitch,
                "pitch must be a positive number of millimeters",
            ));
        }
        if !(1..=8).contains(&self.bits) {
            return Err(EngraveError::invalid_parameter(
                "bits",
                self.bits,
                "bit depth must be between 1 and 8",
            ));
        }
        if !(self.width_mm > 0.0) || !self.width_mm.is_finite() {
            return Err(EngraveError::InvalidSize(format!(
                "target width must be positive, got {} mm",
                self.width_mm
            )));
        }
        if !(self.height_mm > 0.0) || !self.height_mm.is_finite() {
            return Err(EngraveError::InvalidSize(format!(
                "target height must be positive, got {} mm",
                self.height_mm
            )));
        }
        Ok(())
    }
}
