use super::{project_local, rot90, LineSegment2d, Point2d, Vector2d, MATH_EPSILON};

/// A rectangle with arbitrary orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box2d {
    center: Point2d,
    heading: f64,
    length: f64,
    width: f64,
}

impl Box2d {
    /// Creates an oriented box.
    ///
    /// # Parameters
    /// * `center` - The centre of the box
    /// * `heading` - The angle of the box's length axis, in radians
    /// * `length` - The extent along the heading
    /// * `width` - The extent perpendicular to the heading
    pub fn new(center: Point2d, heading: f64, length: f64, width: f64) -> Self {
        Self {
            center,
            heading,
            length,
            width,
        }
    }

    pub fn center(&self) -> Point2d {
        self.center
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// The length of the box's diagonal.
    pub fn diagonal(&self) -> f64 {
        self.length.hypot(self.width)
    }

    /// The unit vectors along the box's length and width axes.
    fn axes(&self) -> (Vector2d, Vector2d) {
        let (sin, cos) = self.heading.sin_cos();
        let x_axis = Vector2d::new(cos, sin);
        (x_axis, rot90(x_axis))
    }

    /// The corners of the box, counter-clockwise from the rear right.
    pub fn corners(&self) -> [Point2d; 4] {
        let (x_axis, y_axis) = self.axes();
        let dx = x_axis * (0.5 * self.length);
        let dy = y_axis * (0.5 * self.width);
        [
            self.center - dx - dy,
            self.center + dx - dy,
            self.center + dx + dy,
            self.center - dx + dy,
        ]
    }

    /// The four edges of the box.
    fn edges(&self) -> [LineSegment2d; 4] {
        let c = self.corners();
        [0, 1, 2, 3].map(|i| LineSegment2d::from_ends(c[i], c[(i + 1) % 4]))
    }

    /// Returns true if the point is inside the box or on its boundary.
    pub fn is_point_in(&self, point: Point2d) -> bool {
        let (x_axis, y_axis) = self.axes();
        let local = project_local(point, self.center, x_axis, y_axis);
        local.x.abs() <= 0.5 * self.length + MATH_EPSILON
            && local.y.abs() <= 0.5 * self.width + MATH_EPSILON
    }

    /// The distance from the point to the box, zero if it is inside.
    pub fn distance_to_point(&self, point: Point2d) -> f64 {
        let (x_axis, y_axis) = self.axes();
        let local = project_local(point, self.center, x_axis, y_axis);
        let dx = f64::max(local.x.abs() - 0.5 * self.length, 0.0);
        let dy = f64::max(local.y.abs() - 0.5 * self.width, 0.0);
        dx.hypot(dy)
    }

    /// The distance from the segment to the box, zero if they overlap.
    pub fn distance_to_segment(&self, segment: &LineSegment2d) -> f64 {
        if segment.length() <= MATH_EPSILON {
            return self.distance_to_point(segment.start());
        }
        if self.is_point_in(segment.start()) || self.is_point_in(segment.end()) {
            return 0.0;
        }
        self.edges()
            .iter()
            .map(|edge| edge.distance_to_segment(segment))
            .fold(f64::INFINITY, f64::min)
    }

    /// Returns true if the segment touches or crosses the box.
    pub fn has_overlap(&self, segment: &LineSegment2d) -> bool {
        self.distance_to_segment(segment) <= MATH_EPSILON
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_4;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment2d {
        LineSegment2d::from_ends(Point2d::new(x1, y1), Point2d::new(x2, y2))
    }

    #[test]
    fn axis_aligned_box() {
        let b = Box2d::new(Point2d::new(5.0, 5.0), 0.0, 2.0, 2.0);
        assert_approx_eq!(b.diagonal(), 8f64.sqrt());
        assert!(b.is_point_in(Point2d::new(5.5, 4.5)));
        assert!(!b.is_point_in(Point2d::new(6.5, 4.5)));
        assert_approx_eq!(b.distance_to_point(Point2d::new(9.0, 9.0)), 18f64.sqrt());
        assert_approx_eq!(b.distance_to_segment(&line(0.0, 0.0, 10.0, 0.0)), 4.0);
        assert!(b.has_overlap(&line(0.0, 5.0, 10.0, 5.0)));
        assert!(b.has_overlap(&line(5.0, 5.0, 5.2, 5.1)));
    }

    #[test]
    fn rotated_box() {
        let b = Box2d::new(Point2d::new(0.0, 3.0), FRAC_PI_4, 2.0, 2.0);
        let d = b.distance_to_segment(&line(-10.0, 0.0, 10.0, 0.0));
        assert_approx_eq!(d, 3.0 - 2f64.sqrt());
        assert!(b.has_overlap(&line(0.0, 0.0, 0.0, 10.0)));
    }
}
