//! Footpath network components - nodes and their semantic classification.

use geo::Point;
use serde_json::{Map, Value};

use crate::NodeId;

/// Semantic classification of a network node, parsed from the feature
/// `type` tag. Unrecognized tags are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Entrance,
    Junction,
    SectionHub,
    BlockAccess,
    PathwayPoint,
    Other(String),
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "entrance" => Self::Entrance,
            "junction" => Self::Junction,
            "section_hub" => Self::SectionHub,
            "block_access" => Self::BlockAccess,
            "pathway_point" => Self::PathwayPoint,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A point location in the footpath graph.
///
/// Nodes are created during graph build and never mutated afterward,
/// except for explicit post-build appends (block access points).
#[derive(Debug, Clone)]
pub struct PathNode {
    pub id: NodeId,
    /// Node coordinates, lon/lat degrees.
    pub geometry: Point<f64>,
    pub kind: NodeKind,
    /// Display name shown in navigation instructions.
    pub name: String,
    /// Arbitrary source tags, including the optional `connects_to` list
    /// consumed during graph build.
    pub properties: Map<String, Value>,
}

impl PathNode {
    /// The node ids this node declares direct connections to.
    pub fn connects_to(&self) -> impl Iterator<Item = &str> {
        self.properties
            .get("connects_to")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_known_tags() {
        assert_eq!(NodeKind::from_tag("entrance"), NodeKind::Entrance);
        assert_eq!(NodeKind::from_tag("section_hub"), NodeKind::SectionHub);
        assert_eq!(
            NodeKind::from_tag("service_gate"),
            NodeKind::Other("service_gate".to_string())
        );
    }

    #[test]
    fn connects_to_reads_property_list() {
        let mut properties = Map::new();
        properties.insert(
            "connects_to".to_string(),
            serde_json::json!(["central_hub", "gate_a"]),
        );
        let node = PathNode {
            id: "office".to_string(),
            geometry: Point::new(0.0, 0.0),
            kind: NodeKind::Junction,
            name: "Office".to_string(),
            properties,
        };
        let linked: Vec<_> = node.connects_to().collect();
        assert_eq!(linked, vec!["central_hub", "gate_a"]);
    }
}
