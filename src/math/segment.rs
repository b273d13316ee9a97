use super::{is_counter_clockwise, normalize_or_zero, Point2d, Vector2d, MATH_EPSILON};
use cgmath::prelude::*;

/// A straight line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment2d {
    start: Point2d,
    end: Point2d,
    /// Unit vector from `start` to `end`, or zero for a degenerate segment.
    unit_direction: Vector2d,
    length: f64,
}

impl LineSegment2d {
    /// Creates a line segment from its two end points.
    pub fn from_ends(start: Point2d, end: Point2d) -> Self {
        let delta = end - start;
        Self {
            start,
            end,
            unit_direction: normalize_or_zero(delta),
            length: delta.magnitude(),
        }
    }

    pub fn start(&self) -> Point2d {
        self.start
    }

    pub fn end(&self) -> Point2d {
        self.end
    }

    pub fn unit_direction(&self) -> Vector2d {
        self.unit_direction
    }

    /// The length of the segment.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The signed distance along the segment's direction from `start`
    /// to the foot of the perpendicular through `point`.
    pub fn project_onto_unit(&self, point: Point2d) -> f64 {
        self.unit_direction.dot(point - self.start)
    }

    /// The cross product of the unit direction with `point - start`,
    /// i.e. the signed perpendicular offset, positive to the left.
    pub fn product_onto_unit(&self, point: Point2d) -> f64 {
        self.unit_direction.perp_dot(point - self.start)
    }

    /// The euclidean distance from `point` to the closest point on the segment.
    pub fn distance_to(&self, point: Point2d) -> f64 {
        self.distance_square_to(point).sqrt()
    }

    /// The squared distance from `point` to the closest point on the segment.
    pub fn distance_square_to(&self, point: Point2d) -> f64 {
        if self.length <= MATH_EPSILON {
            return point.distance2(self.start);
        }
        let proj = self.project_onto_unit(point);
        if proj <= 0.0 {
            point.distance2(self.start)
        } else if proj >= self.length {
            point.distance2(self.end)
        } else {
            self.product_onto_unit(point).powi(2)
        }
    }

    /// Returns true if the two segments cross or touch.
    pub fn intersects(&self, other: &LineSegment2d) -> bool {
        let crosses = is_counter_clockwise(self.start, other.start, other.end)
            != is_counter_clockwise(self.end, other.start, other.end)
            && is_counter_clockwise(self.start, self.end, other.start)
                != is_counter_clockwise(self.start, self.end, other.end);
        crosses
            || self.distance_to(other.start) <= MATH_EPSILON
            || self.distance_to(other.end) <= MATH_EPSILON
            || other.distance_to(self.start) <= MATH_EPSILON
            || other.distance_to(self.end) <= MATH_EPSILON
    }

    /// The shortest distance between two segments.
    pub fn distance_to_segment(&self, other: &LineSegment2d) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }
        [
            self.distance_to(other.start),
            self.distance_to(other.end),
            other.distance_to(self.start),
            other.distance_to(self.end),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment2d {
        LineSegment2d::from_ends(Point2d::new(x1, y1), Point2d::new(x2, y2))
    }

    #[test]
    fn point_distances() {
        let seg = segment(0.0, 0.0, 4.0, 0.0);
        assert_approx_eq!(seg.distance_to(Point2d::new(2.0, 3.0)), 3.0);
        assert_approx_eq!(seg.distance_to(Point2d::new(-3.0, 4.0)), 5.0);
        assert_approx_eq!(seg.distance_to(Point2d::new(7.0, -4.0)), 5.0);
        assert_approx_eq!(seg.project_onto_unit(Point2d::new(-1.0, 1.0)), -1.0);
        assert_approx_eq!(seg.product_onto_unit(Point2d::new(1.0, 2.0)), 2.0);
        assert_approx_eq!(seg.product_onto_unit(Point2d::new(1.0, -2.0)), -2.0);
    }

    #[test]
    fn degenerate_segment() {
        let seg = segment(1.0, 1.0, 1.0, 1.0);
        assert_eq!(seg.length(), 0.0);
        assert_eq!(seg.unit_direction(), Vector2d::new(0.0, 0.0));
        assert_approx_eq!(seg.distance_to(Point2d::new(4.0, 5.0)), 5.0);
    }

    #[test]
    fn segment_distances() {
        let a = segment(0.0, 0.0, 4.0, 0.0);
        assert_eq!(a.distance_to_segment(&segment(2.0, -1.0, 2.0, 1.0)), 0.0);
        assert_eq!(a.distance_to_segment(&segment(4.0, 0.0, 5.0, 1.0)), 0.0);
        assert_approx_eq!(a.distance_to_segment(&segment(1.0, 2.0, 3.0, 5.0)), 2.0);
        assert_approx_eq!(a.distance_to_segment(&segment(7.0, 4.0, 9.0, 4.0)), 5.0);
    }
}
