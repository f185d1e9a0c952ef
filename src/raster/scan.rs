//! Boustrophedon raster scanning
//!
//! Walks the prepared image row by row, alternating direction so the head
//! never makes a return stroke, and quantizes every sample on the way.

use crate::types::{Move, WHITE};
use image::{GrayImage, Luma};

/// Direction of travel along a scan row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDirection {
    LeftToRight,
    RightToLeft,
}

impl RowDirection {
    /// Even rows run left to right, odd rows right to left
    pub fn for_row(y: u32) -> Self {
        if y % 2 == 0 {
            RowDirection::LeftToRight
        } else {
            RowDirection::RightToLeft
        }
    }
}

/// Truncate `value` to its `bits` most significant bits, kept on the 8-bit scale.
pub fn quantize(value: u8, bits: u8) -> u8 {
    let step = 1u16 << (8 - bits.clamp(1, 8));
    ((value as u16 / step) * step) as u8
}

/// Quantized copy of `image`, as the laser will see it
pub fn quantize_image(image: &GrayImage, bits: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = Luma([quantize(pixel.0[0], bits)]);
    }
    out
}

/// Scan a single row.
///
/// The row opens with a move to its leading edge carrying white, so the
/// step over from the previous row never burns, then visits every sample,
/// then closes at its trailing edge carrying the last sample's intensity.
pub fn scan_row(image: &GrayImage, y: u32, pitch: f64, bits: u8) -> Vec<Move> {
    let width = image.width();
    let mut moves = Vec::with_capacity(width as usize + 2);

    let direction = RowDirection::for_row(y);
    let (start, end) = match direction {
        RowDirection::LeftToRight => (0, width),
        RowDirection::RightToLeft => (width, 0),
    };

    moves.push(Move::at(start, y, pitch, WHITE));

    let mut last = WHITE;
    let mut visit = |x: u32| {
        last = quantize(image.get_pixel(x, y).0[0], bits);
        moves.push(Move::at(x, y, pitch, last));
    };
    match direction {
        RowDirection::LeftToRight => (0..width).for_each(&mut visit),
        RowDirection::RightToLeft => (0..width).rev().for_each(&mut visit),
    }

    moves.push(Move::at(end, y, pitch, last));
    moves
}

/// Scan the whole image top to bottom into one move sequence.
pub fn scan_image(image: &GrayImage, pitch: f64, bits: u8) -> Vec<Move> {
    let row_len = image.width() as usize + 2;
    let mut moves = Vec::with_capacity(row_len * image.height() as usize);
    for y in 0..image.height() {
        moves.extend(scan_row(image, y, pitch, bits));
    }
    moves
}
