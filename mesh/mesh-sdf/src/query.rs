//! Point-triangle queries used by the distance kernel.

use mesh_types::Triangle;
use nalgebra::Point3;

/// Compute the closest point on a triangle to a query point.
///
/// This implements the algorithm from "Real-Time Collision Detection" by Christer Ericson.
///
/// # Arguments
///
/// * `point` - The query point
/// * `v0`, `v1`, `v2` - The triangle vertices
///
/// # Returns
///
/// The closest point on the triangle.
#[must_use]
pub fn closest_point_on_triangle(
    point: Point3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Point3<f64> {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);

    // Check if P is in vertex region outside A
    if d1 <= 0.0 && d2 <= 0.0 {
        return v0;
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);

    // Check if P is in vertex region outside B
    if d3 >= 0.0 && d4 <= d3 {
        return v1;
    }

    // Check if P is in edge region of AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return v0 + ab * v;
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);

    // Check if P is in vertex region outside C
    if d6 >= 0.0 && d5 <= d6 {
        return v2;
    }

    // Check if P is in edge region of AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return v0 + ac * w;
    }

    // Check if P is in edge region of BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return v1 + (v2 - v1) * w;
    }

    // P is inside the face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;

    v0 + ab * v + ac * w
}

/// Squared distance from `point` to the triangle `tri`.
#[inline]
#[must_use]
pub fn point_triangle_distance_squared(point: Point3<f64>, tri: &Triangle) -> f64 {
    (closest_point_on_triangle(point, tri.v0, tri.v1, tri.v2) - point).norm_squared()
}

/// Which side of the triangle's plane `point` lies on.
///
/// Returns `1.0` on the side the normal points to (or on the plane) and
/// `-1.0` behind it.
#[inline]
#[must_use]
pub fn face_side(point: Point3<f64>, tri: &Triangle) -> f64 {
    if (point - tri.v0).dot(&tri.normal_unnormalized()) >= 0.0 {
        1.0
    } else {
        -1.0
    }
}
