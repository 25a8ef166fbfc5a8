//! Angle and unit conversions.

use std::f64::consts::{PI, TAU};

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(radians: f64) -> f64 {
    radians.rem_euclid(TAU)
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    normalize_angle(degrees.to_radians())
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet / 3.281
}

/// Convert an upstream heading (clockwise, 0 = north) into the local
/// convention (counter-clockwise, 0 = east).
pub fn heading_from_upstream(radians: f64) -> f64 {
    normalize_angle(-radians + 5.0 * PI / 2.0)
}
