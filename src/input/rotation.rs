//! Hardware-to-framebuffer coordinate rotation.

use crate::draw::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Screen rotation relative to the digitizer's native orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    Deg0,
    #[serde(rename = "90")]
    Deg90,
    #[serde(rename = "180")]
    Deg180,
    #[serde(rename = "270")]
    Deg270,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationError {
    #[error("unsupported rotation {0}°; expected 0, 90, 180 or 270")]
    Unsupported(i32),
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self, RotationError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(RotationError::Unsupported(degrees)),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Maps a raw digitizer coordinate to logical framebuffer space.
///
/// `width` and `height` are the logical (already rotated) framebuffer
/// dimensions. For 90° and 270° the native axes are swapped, so a raw `x`
/// spans the logical height and a raw `y` spans the logical width.
pub fn transform(x: i32, y: i32, rotation: Rotation, width: i32, height: i32) -> Point {
    match rotation {
        Rotation::Deg0 => Point::new(x, y),
        Rotation::Deg90 => Point::new(width - 1 - y, x),
        Rotation::Deg180 => Point::new(width - 1 - x, height - 1 - y),
        Rotation::Deg270 => Point::new(y, height - 1 - x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_at_zero_degrees() {
        assert_eq!(transform(10, 20, Rotation::Deg0, 600, 800), Point::new(10, 20));
    }

    #[test]
    fn corners_map_onto_the_logical_frame() {
        // Native portrait 600x800 shown in landscape: logical 800x600.
        let (w, h) = (800, 600);
        assert_eq!(transform(0, 0, Rotation::Deg90, w, h), Point::new(799, 0));
        assert_eq!(transform(599, 799, Rotation::Deg90, w, h), Point::new(0, 599));
        assert_eq!(transform(0, 0, Rotation::Deg270, w, h), Point::new(0, 599));
        assert_eq!(transform(599, 799, Rotation::Deg270, w, h), Point::new(799, 0));
    }

    #[test]
    fn half_turn_mirrors_both_axes() {
        assert_eq!(transform(0, 0, Rotation::Deg180, 600, 800), Point::new(599, 799));
        assert_eq!(transform(100, 50, Rotation::Deg180, 600, 800), Point::new(499, 749));
    }

    #[test]
    fn quarter_turns_compose_to_identity() {
        let (w, h) = (800, 600);
        let p = transform(123, 456, Rotation::Deg90, w, h);
        // Rotating back with the inverse mapping on the swapped frame.
        let back = transform(p.x, p.y, Rotation::Deg270, h, w);
        assert_eq!(back, Point::new(123, 456));
    }

    #[test]
    fn from_degrees_accepts_multiples_of_ninety() {
        assert_eq!(Rotation::from_degrees(-90), Ok(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(450), Ok(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(45), Err(RotationError::Unsupported(45)));
        assert_eq!(Rotation::Deg180.degrees(), 180);
    }
}
