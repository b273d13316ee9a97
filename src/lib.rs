pub use cgmath;
pub use map::{HdMap, Lane, LaneMap, LaneOverlap, OverlapKind, WidthSample};
pub use path::{
    InterpolatedIndex, LaneSegment, LaneWaypoint, MapPathPoint, Path, PathApproximation,
    PathAttributes, PathOverlap, PathProjection, SAMPLE_DISTANCE,
};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData};
pub use util::Interval;

#[cfg(feature = "debug")]
mod debug;
pub mod map;
pub mod math;
mod path;
mod util;

new_key_type! {
    /// Unique ID of a [Lane] within a [LaneMap].
    pub struct LaneId;
}
