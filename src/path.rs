pub use approximation::PathApproximation;
pub use overlap::PathOverlap;
pub use point::{InterpolatedIndex, LaneSegment, LaneWaypoint, MapPathPoint};

use crate::map::{LaneMap, OverlapKind};
use crate::math::{Box2d, LineSegment2d, LookupTable, Point2d, Vector2d, MATH_EPSILON};
use crate::util::Interval;
use cgmath::prelude::*;
use log::{debug, error};
use std::fmt;

mod approximation;
mod overlap;
mod point;

/// The spacing of the width and point index lookup tables, in m.
pub const SAMPLE_DISTANCE: f64 = 0.25;

/// A reference path for a vehicle to follow, made up of straight segments
/// between points which lie on the lanes of a map.
///
/// All derived data is computed up front, after which the path is immutable
/// and may be queried from any number of threads.
///
/// The path refers to lanes by [LaneId](crate::LaneId) only. It does not keep
/// hold of the map, but its lane references are only meaningful for as long as
/// the map it was built from stays unchanged.
#[derive(Clone, Debug)]
pub struct Path {
    /// The points of the path.
    points: Vec<MapPathPoint>,
    /// The lane segments the path runs along, in order.
    lane_segments: Vec<LaneSegment>,
    /// The lane segment from each point to the next, if one exists.
    next_lane_segments: Vec<Option<LaneSegment>>,
    /// The distance along the path to each point.
    accumulated_s: Vec<f64>,
    /// The direction of travel at each point.
    unit_directions: Vec<Vector2d>,
    /// The segments between consecutive points.
    segments: Vec<LineSegment2d>,
    /// The length of the path in m.
    length: f64,
    /// The last point at or before each sample.
    point_index: LookupTable<usize>,
    /// Lane half-width to the left of each sample.
    left_width: LookupTable<f64>,
    /// Lane half-width to the right of each sample.
    right_width: LookupTable<f64>,
    /// The overlaps with map objects, indexed by [OverlapKind::index].
    overlaps: [Vec<PathOverlap>; 8],
    /// A simplified polyline used to speed up queries.
    approximation: Option<PathApproximation>,
}

/// The attributes of a path.
#[derive(Clone, Debug, Default)]
pub struct PathAttributes {
    /// The points of the path; there must be at least two.
    pub points: Vec<MapPathPoint>,
    /// The lane segments the path runs along.
    /// If empty, they are worked out from the lane waypoints of the points.
    pub lane_segments: Vec<LaneSegment>,
    /// The error allowed in the path approximation, in m.
    /// The approximation is only built if this is positive.
    pub max_approximation_error: f64,
}

/// The result of projecting a point onto a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathProjection {
    /// The distance along the path, which may lie before its start or past its end.
    pub s: f64,
    /// The lateral offset from the path, positive to the left.
    pub lateral: f64,
    /// The distance from the point to the path.
    pub distance: f64,
}

impl Path {
    /// Creates a new path.
    ///
    /// # Panics
    /// If there are fewer than two points.
    pub fn new(map: &impl LaneMap, attribs: PathAttributes) -> Self {
        let PathAttributes {
            points,
            lane_segments,
            max_approximation_error,
        } = attribs;

        let mut path = Self::with_geometry(points, lane_segments);
        path.init_width(map);
        path.init_overlaps(map);
        if max_approximation_error > 0.0 {
            path.approximation = Some(PathApproximation::new(&path, max_approximation_error));
        }

        debug!(
            "Created path with {} points and {} lane segments, {:.2} m long",
            path.num_points(),
            path.lane_segments.len(),
            path.length
        );
        path
    }

    /// Creates a path whose lane segments are worked out from its points.
    pub fn from_points(map: &impl LaneMap, points: Vec<MapPathPoint>) -> Self {
        Self::new(
            map,
            PathAttributes {
                points,
                ..Default::default()
            },
        )
    }

    /// Creates a path along the given lane segments.
    pub fn with_lane_segments(
        map: &impl LaneMap,
        points: Vec<MapPathPoint>,
        lane_segments: Vec<LaneSegment>,
    ) -> Self {
        Self::new(
            map,
            PathAttributes {
                points,
                lane_segments,
                ..Default::default()
            },
        )
    }

    /// Computes everything which depends only on the points themselves.
    fn with_geometry(points: Vec<MapPathPoint>, lane_segments: Vec<LaneSegment>) -> Self {
        let num_points = points.len();
        if num_points < 2 {
            panic!("Path must contain at least two points");
        }

        let segments = points
            .windows(2)
            .map(|p| LineSegment2d::from_ends(p[0].pos(), p[1].pos()))
            .collect::<Vec<_>>();

        // Use the euclidean distance, since consecutive lanes may not be connected
        let mut accumulated_s = Vec::with_capacity(num_points);
        let mut s = 0.0;
        accumulated_s.push(s);
        for segment in &segments {
            s += segment.length();
            accumulated_s.push(s);
        }
        let length = s;

        let mut unit_directions = segments
            .iter()
            .map(LineSegment2d::unit_direction)
            .collect::<Vec<_>>();
        unit_directions.push(unit_directions[num_points - 2]);

        let next_lane_segments = points
            .windows(2)
            .map(|p| LaneSegment::between(&p[0], &p[1]))
            .collect::<Vec<_>>();
        let lane_segments = if lane_segments.is_empty() {
            next_lane_segments.iter().flatten().copied().collect()
        } else {
            lane_segments
        };

        let num_sample_points = (length / SAMPLE_DISTANCE) as usize + 1;
        let mut last_index = 0;
        let point_index = LookupTable::from_samples(num_sample_points, SAMPLE_DISTANCE, |s| {
            while last_index + 1 < num_points && accumulated_s[last_index + 1] <= s {
                last_index += 1;
            }
            last_index
        });

        Self {
            points,
            lane_segments,
            next_lane_segments,
            accumulated_s,
            unit_directions,
            segments,
            length,
            point_index,
            left_width: LookupTable::empty(SAMPLE_DISTANCE),
            right_width: LookupTable::empty(SAMPLE_DISTANCE),
            overlaps: Default::default(),
            approximation: None,
        }
    }

    /// Samples the lane widths along the path.
    fn init_width(&mut self, map: &impl LaneMap) {
        let (left, right): (Vec<_>, Vec<_>) = (0..self.num_sample_points())
            .map(|i| {
                let point = self.get_smooth_point(i as f64 * SAMPLE_DISTANCE);
                match point.lane_waypoints().first() {
                    Some(waypoint) => map.lane_width(waypoint.lane, waypoint.s),
                    None => {
                        error!("Path point {} has invalid width", point);
                        (0.0, 0.0)
                    }
                }
            })
            .unzip();
        self.left_width = LookupTable::from_values(SAMPLE_DISTANCE, left);
        self.right_width = LookupTable::from_values(SAMPLE_DISTANCE, right);
    }

    /// Finds the overlaps with every kind of map object.
    fn init_overlaps(&mut self, map: &impl LaneMap) {
        for kind in OverlapKind::ALL {
            self.overlaps[kind.index()] = overlap::find_overlaps(map, &self.lane_segments, kind);
        }
    }

    /// The length of the path in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// The number of entries in each of the per-sample lookup tables.
    pub fn num_sample_points(&self) -> usize {
        self.point_index.len()
    }

    pub fn points(&self) -> &[MapPathPoint] {
        &self.points
    }

    pub fn lane_segments(&self) -> &[LaneSegment] {
        &self.lane_segments
    }

    /// The lane segment from each point to the next, if there is one.
    pub fn next_lane_segments(&self) -> &[Option<LaneSegment>] {
        &self.next_lane_segments
    }

    pub fn accumulated_s(&self) -> &[f64] {
        &self.accumulated_s
    }

    pub fn unit_directions(&self) -> &[Vector2d] {
        &self.unit_directions
    }

    pub fn segments(&self) -> &[LineSegment2d] {
        &self.segments
    }

    /// The approximation used to speed up queries, if one was built.
    pub fn approximation(&self) -> Option<&PathApproximation> {
        self.approximation.as_ref()
    }

    /// The overlaps with map objects of the given kind, sorted by `start_s`.
    pub fn overlaps(&self, kind: OverlapKind) -> &[PathOverlap] {
        &self.overlaps[kind.index()]
    }

    pub fn lane_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::Lane)
    }

    pub fn signal_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::Signal)
    }

    pub fn yield_sign_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::YieldSign)
    }

    pub fn stop_sign_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::StopSign)
    }

    pub fn crosswalk_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::Crosswalk)
    }

    pub fn junction_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::Junction)
    }

    pub fn clear_area_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::ClearArea)
    }

    pub fn speed_bump_overlaps(&self) -> &[PathOverlap] {
        self.overlaps(OverlapKind::SpeedBump)
    }

    /// Converts a distance along the path into an index.
    /// Distances outside of the path are clamped to its ends.
    pub fn get_index_from_s(&self, s: f64) -> InterpolatedIndex {
        let last = self.num_points() - 1;
        if s <= 0.0 {
            return InterpolatedIndex::new(0, 0.0);
        }
        if s >= self.length {
            return InterpolatedIndex::new(last, 0.0);
        }
        let sample_id = self.point_index.bucket(s);
        let Some(&low) = self.point_index.get(sample_id) else {
            return InterpolatedIndex::new(last, 0.0);
        };
        let high = match self.point_index.get(sample_id + 1) {
            Some(&next) => usize::min(self.num_points(), next + 1),
            None => self.num_points(),
        };
        // Find the last point in the window at or before `s`
        let id = low + self.accumulated_s[(low + 1)..high].partition_point(|&acc_s| acc_s <= s);
        InterpolatedIndex::new(id, s - self.accumulated_s[id])
    }

    /// Converts an index into a distance along the path.
    pub fn get_s_from_index(&self, index: InterpolatedIndex) -> f64 {
        match self.accumulated_s.get(index.id) {
            Some(s) => s + index.offset,
            None => self.length,
        }
    }

    /// Gets the point at the given index.
    ///
    /// # Panics
    /// If `index.id` is not a point of the path.
    pub fn get_smooth_point_at_index(&self, index: InterpolatedIndex) -> MapPathPoint {
        let ref_point = &self.points[index.id];
        if index.offset.abs() <= MATH_EPSILON {
            return ref_point.clone();
        }

        let pos = ref_point.pos() + self.unit_directions[index.id] * index.offset;
        let mut point = MapPathPoint::new(pos, ref_point.heading());
        if let Some(Some(segment)) = self.next_lane_segments.get(index.id) {
            point.add_lane_waypoint(LaneWaypoint::new(
                segment.lane,
                segment.start_s + index.offset,
            ));
        }
        if point.lane_waypoints().is_empty() {
            if let Some(waypoint) = ref_point.lane_waypoints().first() {
                point.add_lane_waypoint(*waypoint);
            }
        }
        point
    }

    /// Gets the point at the given distance along the path.
    pub fn get_smooth_point(&self, s: f64) -> MapPathPoint {
        self.get_smooth_point_at_index(self.get_index_from_s(s))
    }

    /// Projects a point onto the path.
    ///
    /// Points before the start or past the end of the path are projected onto
    /// the extension of the first or last segment, so `s` may lie outside of
    /// `[0, length]`.
    pub fn get_projection(&self, point: Point2d) -> Option<PathProjection> {
        if self.segments.is_empty() {
            return None;
        }
        if let Some(approximation) = &self.approximation {
            return approximation.get_projection(self, point);
        }

        let num_segments = self.segments.len();
        let mut result: Option<PathProjection> = None;
        for (i, segment) in self.segments.iter().enumerate() {
            let distance = segment.distance_to(point);
            if result.map_or(false, |r| distance >= r.distance) {
                continue;
            }
            let proj = segment.project_onto_unit(point);
            if proj < 0.0 && i > 0 {
                continue;
            }
            if proj > segment.length() && i + 1 < num_segments {
                // Leave points ahead of the joint to the next segment
                let next = &self.segments[i + 1];
                if (point - next.start()).dot(next.unit_direction()) >= 0.0 {
                    continue;
                }
            }
            let s = if i + 1 >= num_segments {
                self.accumulated_s[i] + proj
            } else {
                self.accumulated_s[i] + f64::min(proj, segment.length())
            };
            let prod = segment.product_onto_unit(point);
            let extrapolated =
                (i == 0 && proj < 0.0) || (i + 1 == num_segments && proj > segment.length());
            let lateral = if extrapolated {
                prod
            } else if prod > 0.0 {
                distance
            } else {
                -distance
            };
            result = Some(PathProjection {
                s,
                lateral,
                distance,
            });
        }
        result
    }

    /// Finds the nearest point on the path, like [Path::get_projection]
    /// but with `s` restricted to lie within the path.
    pub fn get_nearest_point(&self, point: Point2d) -> Option<PathProjection> {
        let mut projection = self.get_projection(point)?;
        if projection.s < 0.0 {
            projection.s = 0.0;
            projection.distance = point.distance(self.points[0].pos());
        } else if projection.s > self.length {
            projection.s = self.length;
            projection.distance = point.distance(self.points[self.num_points() - 1].pos());
        }
        Some(projection)
    }

    /// The heading of the path at the projection of the point.
    pub fn get_heading_along_path(&self, point: Point2d) -> Option<f64> {
        let projection = self.get_projection(point)?;
        Some(self.get_smooth_point(projection.s).heading())
    }

    /// The lane half-width to the left of the path at `s`.
    pub fn get_left_width(&self, s: f64) -> f64 {
        self.left_width.interpolate(s)
    }

    /// The lane half-width to the right of the path at `s`.
    pub fn get_right_width(&self, s: f64) -> f64 {
        self.right_width.interpolate(s)
    }

    /// The left and right lane half-widths at `s`, or `None` if `s` is not on the path.
    pub fn get_width(&self, s: f64) -> Option<(f64, f64)> {
        if !Interval::new(0.0, self.length).contains(s) {
            return None;
        }
        Some((self.get_left_width(s), self.get_right_width(s)))
    }

    /// Returns true if the point lies strictly within the lanes of the path.
    pub fn is_on_path(&self, point: Point2d) -> bool {
        let Some(projection) = self.get_projection(point) else {
            return false;
        };
        let Some((left_width, right_width)) = self.get_width(projection.s) else {
            return false;
        };
        projection.lateral < left_width && projection.lateral > -right_width
    }

    /// Returns true if the box comes within `width` of the path.
    pub fn overlap_with(&self, bbox: &Box2d, width: f64) -> bool {
        if let Some(approximation) = &self.approximation {
            return approximation.overlap_with(self, bbox, width);
        }
        let center = bbox.center();
        let radius_sqr = (bbox.diagonal() / 2.0 + width).powi(2) + MATH_EPSILON;
        self.segments
            .iter()
            .filter(|segment| segment.distance_square_to(center) <= radius_sqr)
            .any(|segment| bbox.distance_to_segment(segment) <= width + MATH_EPSILON)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "num_points = {}  points = {{", self.num_points())?;
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({point})")?;
        }
        write!(
            f,
            "}}  num_lane_segments = {}  lane_segments = {{",
            self.lane_segments.len()
        )?;
        for (i, segment) in self.lane_segments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({segment})")?;
        }
        f.write_str("}")
    }
}
