//! Joint angle calculation using the dot product.
//!
//! The middle point is the vertex; the angle is measured between the
//! vectors vertex→first and vertex→third.

use crate::landmarks::Landmark;

/// Angle at `vertex` in degrees, in `[0, 180]`.
///
/// Uses `cos(θ) = (v1 · v2) / (|v1| × |v2|)`, clamped to `[-1, 1]` before
/// `acos`. Returns `None` when a point is missing, when either vector has
/// zero length, or when a coordinate is not finite.
pub fn angle_at(
    first: Option<&Landmark>,
    vertex: Option<&Landmark>,
    third: Option<&Landmark>,
) -> Option<f32> {
    let (p1, p2, p3) = (first?, vertex?, third?);

    let v1 = (p1.x - p2.x, p1.y - p2.y);
    let v2 = (p3.x - p2.x, p3.y - p2.y);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 * mag2 == 0.0 {
        return None;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    let angle = cos_angle.acos().to_degrees();
    angle.is_finite().then_some(angle)
}
