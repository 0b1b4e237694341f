use serde::{Deserialize, Serialize};

/// Smallest width/height a resize may produce, in logical units
pub const MIN_SIZE: f64 = 50.0;

/// Pointer position in logical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position and size of an element in logical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest width/height change between two geometries
    pub fn size_delta(&self, other: &Geometry) -> f64 {
        (self.width - other.width)
            .abs()
            .max((self.height - other.height).abs())
    }

    /// Largest x/y change between two geometries
    pub fn position_delta(&self, other: &Geometry) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}
