use super::{Point2d, Vector2d, MATH_EPSILON};
use cgmath::prelude::*;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Normalises a vector, leaving it untouched if its length is (nearly) zero.
pub fn normalize_or_zero(vec: Vector2d) -> Vector2d {
    let mag = vec.magnitude();
    if mag > MATH_EPSILON {
        vec / mag
    } else {
        vec
    }
}

/// Returns true if the points `a`, `b`, `c` wind counter-clockwise.
pub fn is_counter_clockwise(a: Point2d, b: Point2d, c: Point2d) -> bool {
    (b - a).perp_dot(c - a) > 0.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_vector_stays_zero() {
        let v = normalize_or_zero(Vector2d::new(0.0, 0.0));
        assert_eq!(v, Vector2d::new(0.0, 0.0));
        let v = normalize_or_zero(Vector2d::new(3.0, 4.0));
        assert_approx_eq::assert_approx_eq!(v.magnitude(), 1.0);
    }

    #[test]
    fn local_projection() {
        let p = project_local(
            Point2d::new(2.0, 3.0),
            Point2d::new(1.0, 1.0),
            Vector2d::new(0.0, 1.0),
            rot90(Vector2d::new(0.0, 1.0)),
        );
        assert_eq!(p, Point2d::new(2.0, -1.0));
    }
}
