//! 2x2 rotation matrix.

use vstitch_models::Vector2;

/// Counter-clockwise rotation by a fixed angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    m: [f64; 4],
}

impl Rotation {
    pub fn new(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            m: [cos, -sin, sin, cos],
        }
    }

    pub fn apply(&self, v: Vector2) -> Vector2 {
        Vector2::new(
            v.x * self.m[0] + v.y * self.m[1],
            v.x * self.m[2] + v.y * self.m[3],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_quarter_turn() {
        let v = Rotation::new(PI / 2.0).apply(Vector2::new(1.0, 0.0));
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let v = Vector2::new(3.5, -2.0);
        assert_eq!(Rotation::new(0.0).apply(v), v);
    }
}
