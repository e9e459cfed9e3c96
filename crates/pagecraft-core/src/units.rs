//! Page units and their pixel equivalents.
//!
//! Canvas units are CSS pixels at 96 DPI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DPI: f64 = 96.0;
pub const CM_PER_INCH: f64 = 2.54;
pub const PIXEL_PER_CM: f64 = DPI / CM_PER_INCH;
pub const PIXEL_PER_INCH: f64 = DPI;

/// Measurement unit shown on rulers and used for the snap grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    #[default]
    Cm,
    Inches,
}

impl Unit {
    /// Canvas pixels per one of this unit.
    pub fn pixels_per_unit(self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::Cm => PIXEL_PER_CM,
            Unit::Inches => PIXEL_PER_INCH,
        }
    }

    pub fn to_pixels(self, value: f64) -> f64 {
        value * self.pixels_per_unit()
    }

    pub fn from_pixels(self, pixels: f64) -> f64 {
        pixels / self.pixels_per_unit()
    }

    /// Spacing of the snap grid: half centimetres, quarter inches, or 10 px.
    pub fn grid_size(self) -> f64 {
        match self {
            Unit::Px => 10.0,
            Unit::Cm => PIXEL_PER_CM / 2.0,
            Unit::Inches => PIXEL_PER_INCH / 4.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Px => write!(f, "px"),
            Unit::Cm => write!(f, "cm"),
            Unit::Inches => write!(f, "in"),
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "px" | "pixels" => Ok(Unit::Px),
            "cm" => Ok(Unit::Cm),
            "in" | "inch" | "inches" => Ok(Unit::Inches),
            _ => Err(format!("Unknown unit: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_sizes() {
        assert!((Unit::Px.grid_size() - 10.0).abs() < f64::EPSILON);
        assert!((Unit::Inches.grid_size() - 24.0).abs() < f64::EPSILON);
        assert!((Unit::Cm.grid_size() - 18.897_637_795).abs() < 1e-6);
    }

    #[test]
    fn test_conversion_roundtrip() {
        let px = Unit::Cm.to_pixels(21.0);
        assert!((Unit::Cm.from_pixels(px) - 21.0).abs() < 1e-10);
        assert!((Unit::Inches.to_pixels(8.5) - 816.0).abs() < 1e-10);
    }

    #[test]
    fn test_parse() {
        assert_eq!("CM".parse::<Unit>(), Ok(Unit::Cm));
        assert_eq!("inch".parse::<Unit>(), Ok(Unit::Inches));
        assert!("furlong".parse::<Unit>().is_err());
    }
}
