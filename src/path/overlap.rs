use super::LaneSegment;
use crate::map::{LaneMap, OverlapKind};
use crate::util::Interval;
use itertools::Itertools;
use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overlaps of the same object separated by no more than this gap are merged, in m.
const MIN_OVERLAP_GAP: f64 = 1.5;

/// A stretch of a path which overlaps with a map object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathOverlap {
    /// The ID of the overlapped object.
    pub object_id: String,
    /// Where the overlap starts along the path.
    pub start_s: f64,
    /// Where the overlap ends along the path.
    pub end_s: f64,
}

impl PathOverlap {
    pub fn new(object_id: impl Into<String>, start_s: f64, end_s: f64) -> Self {
        Self {
            object_id: object_id.into(),
            start_s,
            end_s,
        }
    }
}

impl fmt::Display for PathOverlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.object_id, self.start_s, self.end_s)
    }
}

/// Finds every object of the given kind which the lane segments pass through,
/// as intervals along the path, sorted by their start.
pub(crate) fn find_overlaps(
    map: &impl LaneMap,
    lane_segments: &[LaneSegment],
    kind: OverlapKind,
) -> Vec<PathOverlap> {
    let mut raw = vec![];
    let mut s = 0.0;
    for segment in lane_segments {
        let own_name = map.lane_name(segment.lane);
        let bounds = Interval::new(segment.start_s, segment.end_s);
        let ref_s = s - segment.start_s;
        for overlap in map.lane_overlaps(segment.lane, kind) {
            let range = Interval::new(overlap.start_s, overlap.end_s);
            if overlap.object_id != own_name && range.overlaps(&bounds) {
                raw.push((overlap.object_id.as_str(), range.clamp_to(&bounds) + ref_s));
            }
        }
        s += segment.length();
    }
    let overlaps = merge_overlaps(raw);
    trace!("Path has {} {:?} overlaps", overlaps.len(), kind);
    overlaps
}

/// Merges nearby intervals belonging to the same object, then sorts them all by start.
fn merge_overlaps(raw: Vec<(&str, Interval<f64>)>) -> Vec<PathOverlap> {
    raw.into_iter()
        .sorted_by(|(id1, a), (id2, b)| {
            id1.cmp(id2)
                .then(a.min.total_cmp(&b.min))
                .then(a.max.total_cmp(&b.max))
        })
        .coalesce(|(id1, a), (id2, b)| {
            if id1 == id2 && a.clearance_with(&b) <= MIN_OVERLAP_GAP {
                Ok((id1, a.union(&b)))
            } else {
                Err(((id1, a), (id2, b)))
            }
        })
        .map(|(id, range)| PathOverlap::new(id, range.min, range.max))
        .sorted_by(|a, b| a.start_s.total_cmp(&b.start_s))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::{HdMap, Lane, LaneOverlap};

    fn merged(raw: &[(&'static str, f64, f64)]) -> Vec<PathOverlap> {
        merge_overlaps(
            raw.iter()
                .map(|&(id, min, max)| (id, Interval::new(min, max)))
                .collect(),
        )
    }

    #[test]
    fn close_intervals_are_merged() {
        assert_eq!(
            merged(&[("A", 4.0, 5.0), ("A", 2.0, 3.0)]),
            vec![PathOverlap::new("A", 2.0, 5.0)]
        );
    }

    #[test]
    fn distant_intervals_stay_split() {
        assert_eq!(
            merged(&[("A", 2.0, 3.0), ("A", 5.0, 6.0)]),
            vec![PathOverlap::new("A", 2.0, 3.0), PathOverlap::new("A", 5.0, 6.0)]
        );
    }

    #[test]
    fn different_objects_are_not_merged() {
        assert_eq!(
            merged(&[("B", 2.5, 4.0), ("A", 2.0, 3.0), ("A", 3.5, 3.8)]),
            vec![PathOverlap::new("A", 2.0, 3.8), PathOverlap::new("B", 2.5, 4.0)]
        );
    }

    #[test]
    fn contained_interval_keeps_outer_end() {
        assert_eq!(
            merged(&[("A", 0.0, 10.0), ("A", 1.0, 2.0)]),
            vec![PathOverlap::new("A", 0.0, 10.0)]
        );
    }

    #[test]
    fn overlaps_are_rebased_onto_the_path() {
        let mut map = HdMap::new();
        let mut l1 = Lane::with_uniform_width("l1", 1.0, 1.0);
        l1.add_overlap(OverlapKind::Crosswalk, LaneOverlap::new("cw", 8.0, 12.0));
        l1.add_overlap(OverlapKind::Crosswalk, LaneOverlap::new("outside", 0.0, 4.0));
        l1.add_overlap(OverlapKind::Lane, LaneOverlap::new("l1", 6.0, 8.0));
        l1.add_overlap(OverlapKind::Lane, LaneOverlap::new("l2", 6.0, 8.0));
        let l1 = map.add_lane(l1);
        let mut l2 = Lane::with_uniform_width("l2", 1.0, 1.0);
        l2.add_overlap(OverlapKind::Crosswalk, LaneOverlap::new("cw", 0.0, 1.0));
        let l2 = map.add_lane(l2);

        let segments = [LaneSegment::new(l1, 5.0, 10.0), LaneSegment::new(l2, 0.0, 3.0)];

        // The crosswalk continues onto the second lane, within the merge gap.
        assert_eq!(
            find_overlaps(&map, &segments, OverlapKind::Crosswalk),
            vec![PathOverlap::new("cw", 3.0, 6.0)]
        );
        // Overlaps with the lane itself are ignored.
        assert_eq!(
            find_overlaps(&map, &segments, OverlapKind::Lane),
            vec![PathOverlap::new("l2", 1.0, 3.0)]
        );
        assert!(find_overlaps(&map, &segments, OverlapKind::Signal).is_empty());
    }
}
