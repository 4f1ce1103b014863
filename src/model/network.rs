//! The footpath graph: nodes, weighted undirected edges, and the queries
//! the planner and tracker run against them.

use geo::Point;
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::{debug, info, warn};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use serde_json::Value;

use super::components::{NodeKind, PathNode};
use super::features::{FeatureGeometry, PathFeature, to_point};
use crate::NodeId;
use crate::geodesy::haversine_distance;

/// In-memory footpath network.
///
/// Edges are stored undirected with a weight equal to the geodesic
/// distance between their endpoints, so the bidirectional-symmetry
/// invariant holds structurally; duplicate parallel edges are rejected on
/// insert. Built once per navigation session and immutable afterward
/// except for explicit appends.
#[derive(Debug, Default)]
pub struct PathNetwork {
    pub(crate) graph: UnGraph<PathNode, f64>,
    index: HashMap<NodeId, NodeIndex>,
}

impl PathNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the network from the feature list in two passes.
    ///
    /// Pass 1 instantiates a node for every point feature and, for every
    /// linear feature, one pathway-point node per vertex with edges
    /// between consecutive vertices. Pass 2 wires every declared
    /// `connects_to` link, including the first/last vertex of each linear
    /// feature. The separation is required because a `connects_to` entry
    /// may reference a pathway point that does not exist yet when its
    /// owner is processed in iteration order.
    pub fn from_features(features: &[PathFeature]) -> Self {
        let mut network = Self::new();

        for feature in features {
            match &feature.coordinates {
                FeatureGeometry::Point(pair) => {
                    let mut properties = feature.extra.clone();
                    if !feature.connects_to.is_empty() {
                        properties.insert(
                            "connects_to".to_string(),
                            Value::from(feature.connects_to.clone()),
                        );
                    }
                    network.add_node(PathNode {
                        id: feature.id.clone(),
                        geometry: to_point(*pair),
                        kind: NodeKind::from_tag(&feature.kind),
                        name: feature.name.clone(),
                        properties,
                    });
                }
                FeatureGeometry::Line(vertices) => {
                    network.add_pathway(feature, vertices);
                }
            }
        }

        for feature in features {
            match &feature.coordinates {
                FeatureGeometry::Point(_) => {
                    for linked in &feature.connects_to {
                        network.connect(&feature.id, linked);
                    }
                }
                FeatureGeometry::Line(vertices) => {
                    // Tie both ends of the pathway to its declared
                    // connections.
                    let first = pathway_point_id(&feature.id, 0);
                    let last = pathway_point_id(&feature.id, vertices.len().saturating_sub(1));
                    for linked in &feature.connects_to {
                        network.connect(&first, linked);
                        network.connect(&last, linked);
                    }
                }
            }
        }

        info!(
            "Footpath network built: {} nodes, {} edges",
            network.node_count(),
            network.edge_count()
        );
        network
    }

    /// Synthesizes pathway-point nodes along a linear feature and edges
    /// its consecutive vertices.
    fn add_pathway(&mut self, feature: &PathFeature, vertices: &[[f64; 2]]) {
        for (i, pair) in vertices.iter().enumerate() {
            let mut properties = serde_json::Map::new();
            properties.insert("pathway_id".to_string(), Value::from(feature.id.clone()));
            self.add_node(PathNode {
                id: pathway_point_id(&feature.id, i),
                geometry: to_point(*pair),
                kind: NodeKind::PathwayPoint,
                name: format!("{} Point {i}", feature.name),
                properties,
            });
        }
        for (a, b) in (0..vertices.len()).tuple_windows() {
            self.connect(
                &pathway_point_id(&feature.id, a),
                &pathway_point_id(&feature.id, b),
            );
        }
    }

    /// Inserts a node, overwriting any existing node with the same id.
    /// Existing edges of an overwritten node are kept.
    pub fn add_node(&mut self, node: PathNode) {
        match self.index.get(&node.id) {
            Some(&idx) => {
                if let Some(weight) = self.graph.node_weight_mut(idx) {
                    *weight = node;
                }
            }
            None => {
                let id = node.id.clone();
                let idx = self.graph.add_node(node);
                self.index.insert(id, idx);
            }
        }
    }

    /// Appends a block-access node after the initial build and wires its
    /// declared connections.
    pub fn add_access_point(&mut self, node: PathNode) {
        let id = node.id.clone();
        let linked: Vec<String> = node.connects_to().map(str::to_string).collect();
        self.add_node(node);
        for other in &linked {
            self.connect(&id, other);
        }
        debug!("Added access point {id} with {} connections", linked.len());
    }

    /// Adds the undirected edge `a`-`b`, weighted by geodesic distance.
    ///
    /// Unknown endpoints are a logged no-op: upstream data may reference
    /// nodes that were never created, and a partially wired network is
    /// still usable. A duplicate of an existing pair is skipped.
    pub fn connect(&mut self, a: &str, b: &str) {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            warn!("Skipping edge between unknown nodes: {a} -> {b}");
            return;
        };
        if ia == ib || self.graph.find_edge(ia, ib).is_some() {
            return;
        }
        let weight = haversine_distance(self.graph[ia].geometry, self.graph[ib].geometry);
        self.graph.add_edge(ia, ib, weight);
    }

    pub fn node(&self, id: &str) -> Option<&PathNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &PathNode {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Weight of the edge between `a` and `b`, if one exists. Symmetric
    /// by construction.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        let (ia, ib) = (self.node_index(a)?, self.node_index(b)?);
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).copied()
    }

    /// The node closest to `point` by geodesic distance. Brute force over
    /// all nodes; ties resolve to the first node in insertion order.
    pub fn nearest_node(&self, point: Point<f64>) -> Option<&PathNode> {
        let mut nearest = None;
        let mut best = f64::INFINITY;
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let d = haversine_distance(point, node.geometry);
            if d < best {
                best = d;
                nearest = Some(node);
            }
        }
        nearest
    }

    /// First node, in insertion order, matching the predicate.
    pub fn find_node(&self, predicate: impl Fn(&PathNode) -> bool) -> Option<&PathNode> {
        self.graph
            .node_indices()
            .map(|idx| &self.graph[idx])
            .find(|node| predicate(node))
    }

    /// Looks a node up by the cemetery block it serves: a `serves_block`
    /// or `block_id` tag, or a name containing the block label.
    pub fn find_node_by_block(&self, block: &str) -> Option<&PathNode> {
        self.find_node(|node| {
            node.properties.get("serves_block").and_then(Value::as_str) == Some(block)
                || node.properties.get("block_id").and_then(Value::as_str) == Some(block)
                || node.name.contains(block)
        })
    }

    /// Ids of all nodes reachable from `id`, the node itself included.
    /// Breadth-first; connectivity diagnostics only, not a hot path.
    pub fn reachable_from(&self, id: &str) -> HashSet<NodeId> {
        let mut reached = HashSet::new();
        let Some(start) = self.node_index(id) else {
            return reached;
        };
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(idx) = bfs.next(&self.graph) {
            reached.insert(self.graph[idx].id.clone());
        }
        reached
    }

    /// Neighbors of a node with edge weights, for search and tests.
    pub(crate) fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph.edges(idx).map(move |edge| {
            let other = if edge.source() == idx {
                edge.target()
            } else {
                edge.source()
            };
            (other, *edge.weight())
        })
    }
}

pub(crate) fn pathway_point_id(feature_id: &str, vertex: usize) -> String {
    format!("{feature_id}_point_{vertex}")
}
