//! Input features consumed by the graph build.
//!
//! Features arrive already deserialized from the host's geospatial source
//! (a GeoJSON-derived document in practice): point features describe named
//! locations, linear features describe footpath polylines whose vertices
//! become synthesized pathway points.

use geo::Point;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Geometry of a single feature: one coordinate pair, or a polyline.
/// Coordinates are `[lon, lat]` as in the source data.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeatureGeometry {
    Point([f64; 2]),
    Line(Vec<[f64; 2]>),
}

/// One geometric feature of the footpath dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct PathFeature {
    pub id: String,
    pub name: String,
    /// Semantic type tag, e.g. `entrance`, `junction`, `primary_path`.
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: FeatureGeometry,
    /// Ids of nodes this feature is directly connected to.
    #[serde(default)]
    pub connects_to: Vec<String>,
    /// Any remaining source tags, carried through onto the node.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PathFeature {
    pub fn is_linear(&self) -> bool {
        matches!(self.coordinates, FeatureGeometry::Line(_))
    }
}

pub(crate) fn to_point(pair: [f64; 2]) -> Point<f64> {
    Point::new(pair[0], pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_feature_deserializes_with_extra_tags() {
        let feature: PathFeature = serde_json::from_value(serde_json::json!({
            "id": "main_entrance",
            "name": "Main Entrance",
            "type": "entrance",
            "coordinates": [120.9767, 14.4727],
            "connects_to": ["entrance_path_point_0"],
            "serves_block": "Phase 1"
        }))
        .unwrap();

        assert!(!feature.is_linear());
        assert_eq!(feature.connects_to, vec!["entrance_path_point_0"]);
        assert_eq!(
            feature.extra.get("serves_block").and_then(Value::as_str),
            Some("Phase 1")
        );
    }

    #[test]
    fn linear_feature_deserializes() {
        let feature: PathFeature = serde_json::from_value(serde_json::json!({
            "id": "main_path",
            "name": "Main Path",
            "type": "primary_path",
            "coordinates": [[120.9767, 14.4727], [120.9765, 14.4725], [120.9763, 14.4723]]
        }))
        .unwrap();

        assert!(feature.is_linear());
        assert!(feature.connects_to.is_empty());
        match feature.coordinates {
            FeatureGeometry::Line(ref vertices) => assert_eq!(vertices.len(), 3),
            FeatureGeometry::Point(_) => panic!("expected a polyline"),
        }
    }
}
