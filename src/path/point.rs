use crate::math::Point2d;
use crate::LaneId;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A position along a particular lane.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaneWaypoint {
    /// The lane.
    pub lane: LaneId,
    /// The longitudinal position along the lane.
    pub s: f64,
}

/// A stretch of a lane, from `start_s` up to `end_s`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaneSegment {
    /// The lane.
    pub lane: LaneId,
    pub start_s: f64,
    pub end_s: f64,
}

/// A point of a [Path](crate::Path), and where it sits on the lanes of the map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapPathPoint {
    /// The world space position.
    pos: Point2d,
    /// The heading in radians.
    heading: f64,
    /// The lanes this point lies on; more than one where lanes merge or split.
    lane_waypoints: SmallVec<[LaneWaypoint; 2]>,
}

/// A location on a path, expressed as the distance `offset` travelled from
/// point `id` along that point's unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpolatedIndex {
    pub id: usize,
    pub offset: f64,
}

impl LaneWaypoint {
    pub fn new(lane: LaneId, s: f64) -> Self {
        Self { lane, s }
    }
}

impl LaneSegment {
    pub fn new(lane: LaneId, start_s: f64, end_s: f64) -> Self {
        Self {
            lane,
            start_s,
            end_s,
        }
    }

    /// The length of the segment along its lane.
    pub fn length(&self) -> f64 {
        self.end_s - self.start_s
    }

    /// Finds a lane both points lie on, with `p1` before `p2` on that lane.
    pub(crate) fn between(p1: &MapPathPoint, p2: &MapPathPoint) -> Option<Self> {
        p1.lane_waypoints
            .iter()
            .flat_map(|wp1| p2.lane_waypoints.iter().map(move |wp2| (wp1, wp2)))
            .find(|(wp1, wp2)| wp1.lane == wp2.lane && wp1.s < wp2.s)
            .map(|(wp1, wp2)| Self::new(wp1.lane, wp1.s, wp2.s))
    }
}

impl MapPathPoint {
    /// Creates a point which is not on any lane.
    pub fn new(pos: Point2d, heading: f64) -> Self {
        Self {
            pos,
            heading,
            lane_waypoints: SmallVec::new(),
        }
    }

    /// Creates a point lying on the given lanes.
    pub fn with_waypoints(
        pos: Point2d,
        heading: f64,
        waypoints: impl IntoIterator<Item = LaneWaypoint>,
    ) -> Self {
        Self {
            pos,
            heading,
            lane_waypoints: waypoints.into_iter().collect(),
        }
    }

    pub fn pos(&self) -> Point2d {
        self.pos
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn lane_waypoints(&self) -> &[LaneWaypoint] {
        &self.lane_waypoints
    }

    pub(crate) fn add_lane_waypoint(&mut self, waypoint: LaneWaypoint) {
        self.lane_waypoints.push(waypoint);
    }
}

impl InterpolatedIndex {
    pub fn new(id: usize, offset: f64) -> Self {
        Self { id, offset }
    }
}

impl fmt::Display for LaneWaypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id = {:?}  s = {}", self.lane, self.s)
    }
}

impl fmt::Display for LaneSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id = {:?}  start_s = {}  end_s = {}",
            self.lane, self.start_s, self.end_s
        )
    }
}

impl fmt::Display for MapPathPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x = {}  y = {}  heading = {}  lwp = {{",
            self.pos.x, self.pos.y, self.heading
        )?;
        for (i, wp) in self.lane_waypoints.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({wp})")?;
        }
        f.write_str("}")
    }
}
