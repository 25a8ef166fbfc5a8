//! Half-plane tests for convex polygons.

use vstitch_models::Vector2;

/// True when `c` lies strictly to the left of the directed line `a -> b`.
pub fn left_of_line(a: Vector2, b: Vector2, c: Vector2) -> bool {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x) > 0.0
}

/// Twice the signed area; positive for counter-clockwise winding.
pub fn signed_area(polygon: &[Vector2]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Reverse the vertex order if the polygon winds clockwise.
pub fn ensure_ccw<const N: usize>(mut polygon: [Vector2; N]) -> [Vector2; N] {
    if signed_area(&polygon) < 0.0 {
        polygon.reverse();
    }
    polygon
}

/// Point-in-convex-polygon for counter-clockwise vertices.
///
/// Points on an edge are outside.
pub fn contains(polygon: &[Vector2], point: Vector2) -> bool {
    let n = polygon.len();
    n >= 3
        && (0..n).all(|i| left_of_line(polygon[i], polygon[(i + 1) % n], point))
}

/// Axis-aligned bounds as `(min, max)`.
pub fn bounds(polygon: &[Vector2]) -> (Vector2, Vector2) {
    polygon.iter().fold(
        (
            Vector2::new(f64::INFINITY, f64::INFINITY),
            Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), v| {
            (
                Vector2::new(min.x.min(v.x), min.y.min(v.y)),
                Vector2::new(max.x.max(v.x), max.y.max(v.y)),
            )
        },
    )
}
