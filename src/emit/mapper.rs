//! Raster to machine coordinate and power mapping

use crate::error::{EngraveError, EngraveResult};
use crate::types::{Move, PhysicalSize, Point, WHITE};

/// Laser power bounds (firmware `S` units)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerRange {
    /// Power of the lightest non-white intensity
    pub min: u8,
    /// Power of black
    pub max: u8,
}

impl Default for PowerRange {
    fn default() -> Self {
        Self { min: 80, max: 255 }
    }
}

impl PowerRange {
    pub fn new(min: u8, max: u8) -> EngraveResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> EngraveResult<()> {
        if self.min > self.max {
            return Err(EngraveError::invalid_parameter(
                "min",
                self.min,
                format!("minimum power exceeds maximum power {}", self.max),
            ));
        }
        Ok(())
    }

    /// Map a quantized intensity to power.
    ///
    /// White is always 0, even when `min` is above 0, so the laser never
    /// fires over unburned areas.
    pub fn power_for(&self, intensity: u8) -> u8 {
        if intensity == WHITE {
            return 0;
        }
        let darkness = (WHITE - intensity) as u32;
        let span = self.max.saturating_sub(self.min) as u32;
        (darkness * span / 255 + self.min as u32) as u8
    }
}

/// A move in machine space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedMove {
    pub position: Point,
    pub power: u8,
}

/// Maps raster moves into machine space: Y flipped to a bottom-left origin,
/// intensity remapped onto the power range.
#[derive(Debug, Clone, Copy)]
pub struct Mapper {
    height_mm: f64,
    power: PowerRange,
}

impl Mapper {
    pub fn new(size: &PhysicalSize, power: PowerRange) -> Self {
        Self {
            height_mm: size.height_mm,
            power,
        }
    }

    pub fn position(&self, physical: Point) -> Point {
        Point::new(physical.x, self.height_mm - physical.y)
    }

    pub fn map(&self, m: &Move) -> MappedMove {
        MappedMove {
            position: self.position(m.physical),
            power: self.power.power_for(m.intensity),
        }
    }
}
