use crate::math::LineSegment2d;
use crate::{OverlapKind, Path};
use serde_json::{json, Value};

fn segment_json(name: &str, segment: &LineSegment2d) -> Value {
    let (p1, p2) = (segment.start(), segment.end());
    json!({
        "type": "line",
        "name": name,
        "p1": [p1.x, p1.y],
        "p2": [p2.x, p2.y],
    })
}

impl Path {
    /// Dumps the path's geometry, approximation and overlaps as JSON, for inspection
    /// in external tools.
    pub fn debug_json(&self) -> Value {
        let mut shapes = self
            .segments()
            .iter()
            .map(|s| segment_json("path", s))
            .collect::<Vec<_>>();
        if let Some(approximation) = self.approximation() {
            shapes.extend(
                approximation
                    .segments()
                    .iter()
                    .map(|s| segment_json("approximation", s)),
            );
        }
        let overlaps = OverlapKind::ALL
            .iter()
            .map(|kind| json!({ "kind": kind, "overlaps": self.overlaps(*kind) }))
            .collect::<Vec<_>>();
        json!({
            "length": self.length(),
            "points": self.points(),
            "lane_segments": self.lane_segments(),
            "shapes": shapes,
            "overlaps": overlaps,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::math::Point2d;
    use crate::{HdMap, MapPathPoint, Path};

    #[test]
    fn json_lists_segments() {
        let points = vec![
            MapPathPoint::new(Point2d::new(0.0, 0.0), 0.0),
            MapPathPoint::new(Point2d::new(3.0, 4.0), 0.0),
        ];
        let path = Path::from_points(&HdMap::new(), points);
        let value = path.debug_json();
        assert_eq!(value["length"], 5.0);
        assert_eq!(value["shapes"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["shapes"][0]["p2"][1], 4.0);
    }
}
