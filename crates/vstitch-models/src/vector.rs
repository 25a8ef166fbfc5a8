//! Two-component vector used for normalized frame positions, velocities
//! (normalized units per millisecond) and local planar metres.
//!
//! Nothing in the type tracks which of those unit systems a value is in,
//! so callers convert explicitly before mixing them.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A real-valued `(x, y)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Vector2 {
        Vector2::new(self.x.abs(), self.y.abs())
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Compare this vector's length against a scalar.
    ///
    /// NaN lengths compare as `Greater` so they never pass a "below threshold" check.
    pub fn compare_len(self, threshold: f64) -> Ordering {
        self.length()
            .partial_cmp(&threshold)
            .unwrap_or(Ordering::Greater)
    }

    /// Compare the lengths of two vectors.
    pub fn compare_len_to(self, other: Vector2) -> Ordering {
        self.compare_len(other.length())
    }

    /// True when the length is strictly below `threshold`.
    pub fn shorter_than(self, threshold: f64) -> bool {
        self.compare_len(threshold) == Ordering::Less
    }

    /// Bucket a velocity to `{-1, 0, 1}` per axis.
    ///
    /// An axis is `0` unless its magnitude exceeds `threshold`.
    pub fn bucket_velocity(self, threshold: f64) -> Vector2 {
        Vector2::new(bucket_signed(self.x, threshold), bucket_signed(self.y, threshold))
    }

    /// Bucket a normalized position to `{-1, 0, 1}` per axis.
    ///
    /// `1` past `1 - threshold`, `-1` below `threshold`, else `0`.
    pub fn bucket_position(self, threshold: f64) -> Vector2 {
        Vector2::new(
            bucket_edge(self.x, threshold),
            bucket_edge(self.y, threshold),
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

fn bucket_signed(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        1.0
    } else if value < -threshold {
        -1.0
    } else {
        0.0
    }
}

fn bucket_edge(value: f64, threshold: f64) -> f64 {
    if value > 1.0 - threshold {
        1.0
    } else if value < threshold {
        -1.0
    } else {
        0.0
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}
