/// Intensity of an unburned (white) sample.
pub const WHITE: u8 = 255;

/// Sample position in the prepared raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPos {
    pub x: u32,
    pub y: u32,
}

impl PixelPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Signed step from `self` to `other`
    pub fn step_to(&self, other: &PixelPos) -> (i64, i64) {
        (
            other.x as i64 - self.x as i64,
            other.y as i64 - self.y as i64,
        )
    }
}

/// 2D point in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One scan step: where the head goes and how hard it burns on the way.
///
/// `intensity` is the quantized sample value (0 = black, 255 = white) burned
/// while travelling from the previous move to this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub pixel: PixelPos,
    pub physical: Point,
    pub intensity: u8,
}

impl Move {
    /// Create a move at a raster position, deriving its physical position
    /// from the sample pitch.
    pub fn at(x: u32, y: u32, pitch: f64, intensity: u8) -> Self {
        Self {
            pixel: PixelPos::new(x, y),
            physical: Point::new(x as f64 * pitch, y as f64 * pitch),
            intensity,
        }
    }
}

/// Realized physical extent of a prepared raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSize {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Millimeters per sample
    pub pitch: f64,
}

impl PhysicalSize {
    /// Size covered by `width` x `height` samples at `pitch`.
    pub fn from_samples(width: u32, height: u32, pitch: f64) -> Self {
        Self {
            width_mm: width as f64 * pitch,
            height_mm: height as f64 * pitch,
            pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_physical_position() {
        let m = Move::at(3, 2, 0.5, 128);
        assert_eq!(m.pixel, PixelPos::new(3, 2));
        assert_eq!(m.physical, Point::new(1.5, 1.0));
    }

    #[test]
    fn test_step_to_is_signed() {
        let a = PixelPos::new(4, 1);
        let b = PixelPos::new(3, 1);
        assert_eq!(a.step_to(&b), (-1, 0));
        assert_eq!(b.step_to(&a), (1, 0));
    }

    #[test]
    fn test_physical_size_from_samples() {
        let size = PhysicalSize::from_samples(40, 20, 0.25);
        assert_eq!(size.width_mm, 10.0);
        assert_eq!(size.height_mm, 5.0);
    }
}
