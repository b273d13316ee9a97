use super::{MapPathPoint, Path, PathProjection, SAMPLE_DISTANCE};
use crate::math::{Box2d, LineSegment2d, LookupTable, Point2d, MATH_EPSILON};
use cgmath::prelude::*;
use log::debug;

/// A simplified version of a path's polyline, used to speed up queries on long paths.
///
/// The approximation keeps a subset of the path's points such that every
/// dropped point lies within `max_error` of the segment replacing it.
/// Queries first measure against the few approximate segments, and use the
/// error bound to decide which of the original segments could be closest.
#[derive(Clone, Debug)]
pub struct PathApproximation {
    /// The error budget.
    max_error: f64,
    /// The indices of the retained points in the original path.
    original_ids: Vec<usize>,
    /// The segments between consecutive retained points.
    segments: Vec<LineSegment2d>,
    /// The actual deviation of the dropped points from each segment.
    max_error_per_segment: Vec<f64>,
    /// The distance along the approximate polyline to each retained point.
    projections: Vec<f64>,
    /// The projection of every original point onto the approximate polyline.
    original_projections: Vec<f64>,
    /// `max_original_projections_to_left[i] = max(p[0], p[1], ... p[i])`.
    max_original_projections_to_left: Vec<f64>,
    /// `min_original_projections_to_right[i] = min(p[i], p[i + 1], ... p[n - 1])`.
    min_original_projections_to_right: Vec<f64>,
    /// For each projection sample, the last index whose successor's
    /// `max_original_projections_to_left` is below the sample.
    sampled_max_original_projections_to_left: LookupTable<usize>,
}

/// The range of original segments which may be near a query point.
struct CandidateWindow {
    first: usize,
    last: usize,
    max_projection: f64,
}

impl PathApproximation {
    /// Builds the approximation of a path with the given error budget.
    pub(crate) fn new(path: &Path, max_error: f64) -> Self {
        let points = path.points();
        let max_sqr_error = max_error * max_error;
        let original_ids = dilute(points, max_sqr_error);

        let segments = original_ids
            .windows(2)
            .map(|ids| LineSegment2d::from_ends(points[ids[0]].pos(), points[ids[1]].pos()))
            .collect::<Vec<_>>();
        let max_error_per_segment = original_ids
            .windows(2)
            .map(|ids| compute_max_error(points, ids[0], ids[1]))
            .collect::<Vec<_>>();

        let mut projections = Vec::with_capacity(segments.len() + 1);
        projections.push(0.0);
        let mut s = 0.0;
        for segment in &segments {
            s += segment.length();
            projections.push(s);
        }

        let mut original_projections = Vec::with_capacity(points.len());
        for (i, &projection) in projections.iter().enumerate() {
            original_projections.push(projection);
            if let Some(segment) = segments.get(i) {
                for point in &points[(original_ids[i] + 1)..original_ids[i + 1]] {
                    let proj = segment.project_onto_unit(point.pos());
                    original_projections.push(projection + proj.clamp(0.0, segment.length()));
                }
            }
        }

        let max_original_projections_to_left = original_projections
            .iter()
            .scan(f64::NEG_INFINITY, |max, &p| {
                *max = f64::max(*max, p);
                Some(*max)
            })
            .collect::<Vec<_>>();
        let mut min_original_projections_to_right = original_projections
            .iter()
            .rev()
            .scan(f64::INFINITY, |min, &p| {
                *min = f64::min(*min, p);
                Some(*min)
            })
            .collect::<Vec<_>>();
        min_original_projections_to_right.reverse();
        debug_assert!(is_monotonic(&max_original_projections_to_left));
        debug_assert!(is_monotonic(&min_original_projections_to_right));

        let num_original_points = points.len();
        let num_projection_samples = (s / SAMPLE_DISTANCE) as usize + 1;
        let mut last_index = 0;
        let sampled_max_original_projections_to_left =
            LookupTable::from_samples(num_projection_samples, SAMPLE_DISTANCE, |proj| {
                while last_index + 1 < num_original_points
                    && max_original_projections_to_left[last_index + 1] < proj
                {
                    last_index += 1;
                }
                last_index
            });

        debug!(
            "Approximated {} path points with {} points (max error {})",
            num_original_points,
            original_ids.len(),
            max_error
        );

        Self {
            max_error,
            original_ids,
            segments,
            max_error_per_segment,
            projections,
            original_projections,
            max_original_projections_to_left,
            min_original_projections_to_right,
            sampled_max_original_projections_to_left,
        }
    }

    /// The error budget the approximation was built with.
    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    /// The number of points retained from the original path.
    pub fn num_points(&self) -> usize {
        self.original_ids.len()
    }

    /// The indices of the retained points in the original path.
    pub fn original_ids(&self) -> &[usize] {
        &self.original_ids
    }

    /// The segments of the simplified polyline.
    pub fn segments(&self) -> &[LineSegment2d] {
        &self.segments
    }

    /// The largest distance of a dropped point from its replacing segment, per segment.
    pub fn max_error_per_segment(&self) -> &[f64] {
        &self.max_error_per_segment
    }

    /// The projection of every original point onto the simplified polyline.
    pub fn original_projections(&self) -> &[f64] {
        &self.original_projections
    }

    /// Projects a point onto the path, see [Path::get_projection].
    pub(crate) fn get_projection(&self, path: &Path, point: Point2d) -> Option<PathProjection> {
        let distance_sqr_to_segments = self
            .segments
            .iter()
            .map(|segment| segment.distance_square_to(point))
            .collect::<Vec<_>>();
        let (estimate_nearest_segment_idx, min_distance_sqr) = distance_sqr_to_segments
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let original_segments = path.segments();
        let num_original_segments = original_segments.len();
        let mut min_distance_sqr_with_error = (min_distance_sqr.sqrt()
            + self.max_error_per_segment[estimate_nearest_segment_idx]
            + self.max_error)
            .powi(2);
        let mut min_distance = f64::INFINITY;
        let mut nearest_segment_idx = None;

        for (i, &distance_sqr) in distance_sqr_to_segments.iter().enumerate() {
            if distance_sqr >= min_distance_sqr_with_error {
                continue;
            }
            let Some(window) = self.candidate_window(i, point, min_distance_sqr_with_error) else {
                continue;
            };

            let mut min_distance_updated = false;
            let mut is_within_end_point = false;
            for idx in window.first..=window.last {
                if self.min_original_projections_to_right[idx] > window.max_projection {
                    break;
                }
                let original_segment = &original_segments[idx];
                let offset = point - original_segment.start();
                let unit = original_segment.unit_direction();
                let proj = offset.dot(unit);
                let distance = if proj < 0.0 {
                    if is_within_end_point {
                        continue;
                    }
                    is_within_end_point = true;
                    offset.magnitude()
                } else if proj <= original_segment.length() {
                    is_within_end_point = true;
                    // Duplicate points leave a segment with no direction
                    if original_segment.length() <= MATH_EPSILON {
                        offset.magnitude()
                    } else {
                        unit.perp_dot(offset).abs()
                    }
                } else {
                    is_within_end_point = false;
                    if idx != window.last {
                        continue;
                    }
                    original_segment.end().distance(point)
                };
                if distance < min_distance {
                    min_distance_updated = true;
                    min_distance = distance;
                    nearest_segment_idx = Some(idx);
                }
            }
            if min_distance_updated {
                min_distance_sqr_with_error = (min_distance + self.max_error).powi(2);
            }
        }

        let idx = nearest_segment_idx?;
        let segment = &original_segments[idx];
        let mut proj = segment.project_onto_unit(point);
        let prod = segment.product_onto_unit(point);
        if idx > 0 {
            proj = f64::max(0.0, proj);
        }
        if idx + 1 < num_original_segments {
            proj = f64::min(segment.length(), proj);
        }
        let s = path.accumulated_s()[idx] + proj;
        let lateral = if (idx == 0 && proj < 0.0)
            || (idx + 1 == num_original_segments && proj > segment.length())
        {
            prod
        } else if prod > 0.0 {
            min_distance
        } else {
            -min_distance
        };
        Some(PathProjection {
            s,
            lateral,
            distance: min_distance,
        })
    }

    /// Tests whether a box comes within `width` of the path, see [Path::overlap_with].
    pub(crate) fn overlap_with(&self, path: &Path, bbox: &Box2d, width: f64) -> bool {
        let center = bbox.center();
        let radius = bbox.diagonal() / 2.0 + width;
        let radius_sqr = radius * radius;
        let original_segments = path.segments();

        for (i, segment) in self.segments.iter().enumerate() {
            let radius_sqr_with_error = (radius + self.max_error_per_segment[i]).powi(2);
            if segment.distance_square_to(center) > radius_sqr_with_error {
                continue;
            }
            let Some(window) = self.candidate_window(i, center, radius_sqr_with_error) else {
                continue;
            };
            for idx in window.first..=window.last {
                if self.min_original_projections_to_right[idx] > window.max_projection {
                    break;
                }
                let original_segment = &original_segments[idx];
                if original_segment.distance_square_to(center) > radius_sqr {
                    continue;
                }
                if bbox.distance_to_segment(original_segment) <= width {
                    return true;
                }
            }
        }
        false
    }

    /// Works out which original segments, replaced by approximate segment `i`,
    /// could lie within `sqrt(radius_sqr)` of the point.
    /// Returns `None` if none of them can.
    fn candidate_window(&self, i: usize, point: Point2d, radius_sqr: f64) -> Option<CandidateWindow> {
        let mut first = self.original_ids[i];
        let last = self.original_ids[i + 1] - 1;
        let mut max_projection = f64::INFINITY;

        if first < last {
            let segment = &self.segments[i];
            let projection = segment.project_onto_unit(point);
            let prod_sqr = segment.product_onto_unit(point).powi(2);
            if prod_sqr >= radius_sqr {
                return None;
            }
            let scan_distance = (radius_sqr - prod_sqr).sqrt();
            let min_projection = projection - scan_distance;
            max_projection = self.projections[i] + projection + scan_distance;
            if min_projection > 0.0 {
                let limit = self.projections[i] + min_projection;
                let samples = &self.sampled_max_original_projections_to_left;
                match samples.get(samples.bucket(limit)) {
                    None => first = last,
                    Some(&sampled) => {
                        first = usize::max(first, sampled);
                        if first >= last {
                            first = last;
                        } else {
                            while first < last
                                && self.max_original_projections_to_left[first + 1] < limit
                            {
                                first += 1;
                            }
                        }
                    }
                }
            }
        }

        Some(CandidateWindow {
            first,
            last,
            max_projection,
        })
    }
}

/// Picks the points to retain, greedily extending each approximate segment as far as
/// the error budget allows: first by doubling the step, then by binary refinement.
fn dilute(points: &[MapPathPoint], max_sqr_error: f64) -> Vec<usize> {
    let num_points = points.len();
    let mut original_ids = vec![];
    let mut last_idx = 0;
    while last_idx + 1 < num_points {
        original_ids.push(last_idx);
        let mut next_idx = last_idx + 1;
        let mut delta = 2;
        while last_idx + delta < num_points {
            if !is_within_max_error(points, last_idx, last_idx + delta, max_sqr_error) {
                break;
            }
            next_idx = last_idx + delta;
            delta *= 2;
        }
        while delta > 0 {
            if next_idx + delta < num_points
                && is_within_max_error(points, last_idx, next_idx + delta, max_sqr_error)
            {
                next_idx += delta;
            }
            delta /= 2;
        }
        last_idx = next_idx;
    }
    original_ids.push(last_idx);
    original_ids
}

/// Returns true if every point strictly between `s` and `t` is within the
/// error budget of the segment joining them.
fn is_within_max_error(points: &[MapPathPoint], s: usize, t: usize, max_sqr_error: f64) -> bool {
    if s + 1 >= t {
        return true;
    }
    let segment = LineSegment2d::from_ends(points[s].pos(), points[t].pos());
    points[(s + 1)..t]
        .iter()
        .all(|p| segment.distance_square_to(p.pos()) <= max_sqr_error)
}

/// The largest distance of a point strictly between `s` and `t` from the
/// segment joining them.
fn compute_max_error(points: &[MapPathPoint], s: usize, t: usize) -> f64 {
    if s + 1 >= t {
        return 0.0;
    }
    let segment = LineSegment2d::from_ends(points[s].pos(), points[t].pos());
    points[(s + 1)..t]
        .iter()
        .map(|p| segment.distance_square_to(p.pos()))
        .fold(0.0, f64::max)
        .sqrt()
}

fn is_monotonic(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1] + MATH_EPSILON)
}
