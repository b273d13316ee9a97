//! The lane data a [Path](crate::Path) consumes from the map.

use crate::LaneId;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::HashMap;

/// A category of map object that a lane can overlap with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverlapKind {
    /// Another lane crossing or merging with this one.
    Lane,
    Signal,
    YieldSign,
    StopSign,
    Crosswalk,
    Junction,
    ClearArea,
    SpeedBump,
}

impl OverlapKind {
    /// Every overlap category, in a fixed order.
    pub const ALL: [OverlapKind; 8] = [
        OverlapKind::Lane,
        OverlapKind::Signal,
        OverlapKind::YieldSign,
        OverlapKind::StopSign,
        OverlapKind::Crosswalk,
        OverlapKind::Junction,
        OverlapKind::ClearArea,
        OverlapKind::SpeedBump,
    ];

    /// The position of this category within [OverlapKind::ALL].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A lane's record of overlapping with another map object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaneOverlap {
    /// The ID of the other object.
    pub object_id: String,
    /// Where the overlap starts, in the lane's own coordinates.
    pub start_s: f64,
    /// Where the overlap ends, in the lane's own coordinates.
    pub end_s: f64,
}

impl LaneOverlap {
    pub fn new(object_id: impl Into<String>, start_s: f64, end_s: f64) -> Self {
        Self {
            object_id: object_id.into(),
            start_s,
            end_s,
        }
    }
}

/// Everything a path needs to know about the lanes it runs along.
///
/// Lanes are referred to by [LaneId], and the map owns the lane data.
/// A path only borrows the map while it is being built.
pub trait LaneMap {
    /// The unique name of the lane.
    fn lane_name(&self, lane: LaneId) -> &str;

    /// The left and right half-widths of the lane at `s`.
    fn lane_width(&self, lane: LaneId, s: f64) -> (f64, f64);

    /// The lane's overlaps with objects of the given kind.
    fn lane_overlaps(&self, lane: LaneId, kind: OverlapKind) -> &[LaneOverlap];
}

/// The lane half-widths at a point along a lane.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidthSample {
    /// The position along the lane.
    pub s: f64,
    /// The distance from the centre line to the left boundary.
    pub left: f64,
    /// The distance from the centre line to the right boundary.
    pub right: f64,
}

/// A single lane of a [HdMap].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lane {
    /// The unique name of the lane.
    name: String,
    /// Width samples, ordered by `s`.
    widths: Vec<WidthSample>,
    /// The overlaps, indexed by [OverlapKind::index].
    overlaps: [Vec<LaneOverlap>; 8],
}

impl Lane {
    /// Creates a lane whose width is linearly interpolated between the given samples.
    pub fn new(name: impl Into<String>, mut widths: Vec<WidthSample>) -> Self {
        widths.sort_by(|a, b| a.s.total_cmp(&b.s));
        Self {
            name: name.into(),
            widths,
            overlaps: Default::default(),
        }
    }

    /// Creates a lane with the same width along its entire length.
    pub fn with_uniform_width(name: impl Into<String>, left: f64, right: f64) -> Self {
        Self::new(name, vec![WidthSample { s: 0.0, left, right }])
    }

    /// Records an overlap of this lane with another object.
    pub fn add_overlap(&mut self, kind: OverlapKind, overlap: LaneOverlap) {
        self.overlaps[kind.index()].push(overlap);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The left and right half-widths at `s`, clamped to the first and last samples.
    pub fn width(&self, s: f64) -> (f64, f64) {
        let idx = self.widths.partition_point(|w| w.s <= s);
        match (idx.checked_sub(1).map(|i| &self.widths[i]), self.widths.get(idx)) {
            (None, None) => (0.0, 0.0),
            (Some(w), None) | (None, Some(w)) => (w.left, w.right),
            (Some(a), Some(b)) => {
                let t = (s - a.s) / (b.s - a.s);
                (a.left + t * (b.left - a.left), a.right + t * (b.right - a.right))
            }
        }
    }

    /// The overlaps with objects of the given kind.
    pub fn overlaps(&self, kind: OverlapKind) -> &[LaneOverlap] {
        &self.overlaps[kind.index()]
    }
}

/// A registry of lanes, keyed by [LaneId].
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HdMap {
    lanes: SlotMap<LaneId, Lane>,
    by_name: HashMap<String, LaneId>,
}

impl HdMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a lane to the map.
    ///
    /// # Panics
    /// If a lane with the same name already exists.
    pub fn add_lane(&mut self, lane: Lane) -> LaneId {
        if self.by_name.contains_key(lane.name()) {
            panic!("Lane {} is already in the map", lane.name());
        }
        let name = lane.name.clone();
        let id = self.lanes.insert(lane);
        self.by_name.insert(name, id);
        id
    }

    /// Gets a lane.
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id)
    }

    /// Gets a mutable reference to a lane.
    pub fn lane_mut(&mut self, id: LaneId) -> Option<&mut Lane> {
        self.lanes.get_mut(id)
    }

    /// Looks up a lane by its name.
    pub fn lane_id(&self, name: &str) -> Option<LaneId> {
        self.by_name.get(name).copied()
    }

    /// Iterates over the lanes in the map.
    pub fn iter_lanes(&self) -> impl Iterator<Item = (LaneId, &Lane)> {
        self.lanes.iter()
    }
}

impl LaneMap for HdMap {
    fn lane_name(&self, lane: LaneId) -> &str {
        &self.lanes[lane].name
    }

    fn lane_width(&self, lane: LaneId, s: f64) -> (f64, f64) {
        self.lanes[lane].width(s)
    }

    fn lane_overlaps(&self, lane: LaneId, kind: OverlapKind) -> &[LaneOverlap] {
        self.lanes[lane].overlaps(kind)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn interpolated_lane_width() {
        let lane = Lane::new(
            "l1",
            vec![
                WidthSample { s: 10.0, left: 2.0, right: 1.0 },
                WidthSample { s: 0.0, left: 1.0, right: 1.0 },
            ],
        );
        assert_eq!(lane.width(-5.0), (1.0, 1.0));
        assert_eq!(lane.width(20.0), (2.0, 1.0));
        let (left, right) = lane.width(2.5);
        assert_approx_eq!(left, 1.25);
        assert_approx_eq!(right, 1.0);
    }

    #[test]
    fn lanes_are_found_by_name() {
        let mut map = HdMap::new();
        let a = map.add_lane(Lane::with_uniform_width("a", 1.5, 1.5));
        let b = map.add_lane(Lane::with_uniform_width("b", 2.0, 1.0));
        assert_eq!(map.lane_id("a"), Some(a));
        assert_eq!(map.lane_id("b"), Some(b));
        assert_eq!(map.lane_id("c"), None);
        assert_eq!(map.lane_name(b), "b");
        assert_eq!(map.lane_width(b, 100.0), (2.0, 1.0));
    }

    #[test]
    #[should_panic]
    fn duplicate_lane_names_are_rejected() {
        let mut map = HdMap::new();
        map.add_lane(Lane::with_uniform_width("a", 1.5, 1.5));
        map.add_lane(Lane::with_uniform_width("a", 1.5, 1.5));
    }

    #[test]
    fn lanes_can_be_amended_after_insertion() {
        let mut map = HdMap::new();
        let a = map.add_lane(Lane::with_uniform_width("a", 1.5, 1.5));
        let b = map.add_lane(Lane::with_uniform_width("b", 1.5, 1.5));
        // Crossing lanes each record the other
        if let Some(lane) = map.lane_mut(a) {
            lane.add_overlap(OverlapKind::Lane, LaneOverlap::new("b", 4.0, 7.0));
        }
        if let Some(lane) = map.lane_mut(b) {
            lane.add_overlap(OverlapKind::Lane, LaneOverlap::new("a", 1.0, 4.0));
        }

        assert_eq!(map.lane_overlaps(a, OverlapKind::Lane)[0].object_id, "b");
        assert_eq!(map.lane(b).map(|l| l.overlaps(OverlapKind::Lane).len()), Some(1));
        let mut names = map.iter_lanes().map(|(_, l)| l.name()).collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert!(map.iter_lanes().all(|(id, l)| map.lane_id(l.name()) == Some(id)));
    }

    #[test]
    fn overlaps_are_kept_per_kind() {
        let mut lane = Lane::with_uniform_width("a", 1.5, 1.5);
        lane.add_overlap(OverlapKind::Signal, LaneOverlap::new("sig", 1.0, 2.0));
        lane.add_overlap(OverlapKind::Crosswalk, LaneOverlap::new("cw", 3.0, 6.0));
        assert_eq!(lane.overlaps(OverlapKind::Signal).len(), 1);
        assert_eq!(lane.overlaps(OverlapKind::Crosswalk)[0].object_id, "cw");
        assert!(lane.overlaps(OverlapKind::Junction).is_empty());
    }
}
