//! Route planning with a per (start, end) result cache.

use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, info};

use super::dijkstra::shortest_path_tree;
use crate::model::{NodeKind, PathNetwork};
use crate::{Error, NodeId, WALKING_SPEED_MPS};

/// A node along a planned route, with everything the UI layer needs to
/// render and announce it.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub node_id: NodeId,
    /// Lon/lat degrees.
    pub location: Point<f64>,
    pub name: String,
    pub kind: NodeKind,
}

/// A planned walking route. Immutable once returned.
///
/// An unreachable destination is reported in-band: `success` is false,
/// `distance_m` is infinite (callers must not display it as a real
/// value), and the waypoint sequence degenerates to just the end node.
#[derive(Debug, Clone)]
pub struct Route {
    pub success: bool,
    pub start_id: NodeId,
    pub end_id: NodeId,
    /// Sum of traversed edge weights, meters.
    pub distance_m: f64,
    /// Estimated walking time, whole minutes rounded up; zero when the
    /// destination is unreachable.
    pub duration_min: u32,
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn destination(&self) -> &Waypoint {
        // Non-empty by construction: even a failed plan carries the end
        // node as its only waypoint.
        &self.waypoints[self.waypoints.len() - 1]
    }

    /// Planned distance from waypoint `from` to the end of the route,
    /// following the remaining segments.
    pub fn remaining_from(&self, from: usize) -> f64 {
        self.waypoints[from.min(self.waypoints.len())..]
            .iter()
            .tuple_windows()
            .map(|(a, b)| crate::geodesy::haversine_distance(a.location, b.location))
            .sum()
    }
}

/// Plans shortest walking routes and caches them by the literal ordered
/// (start, end) pair. `(B, A)` is a distinct slot from `(A, B)`: a
/// recalculated route after drift may legitimately differ from the
/// reverse of the original. Entries are never invalidated automatically;
/// callers that mutate the network are responsible for [`Self::clear_cache`].
#[derive(Debug, Default)]
pub struct RoutePlanner {
    cache: HashMap<(NodeId, NodeId), Route>,
}

impl RoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest route from `start_id` to `end_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when either id is absent from the
    /// network; a structurally valid but unreachable query is *not* an
    /// error and comes back with `success = false`.
    pub fn plan(
        &mut self,
        network: &PathNetwork,
        start_id: &str,
        end_id: &str,
    ) -> Result<Route, Error> {
        let key = (start_id.to_string(), end_id.to_string());
        if let Some(route) = self.cache.get(&key) {
            debug!("Route cache hit: {start_id} -> {end_id}");
            return Ok(route.clone());
        }

        let start = network
            .node_index(start_id)
            .ok_or_else(|| Error::NodeNotFound(start_id.to_string()))?;
        let end = network
            .node_index(end_id)
            .ok_or_else(|| Error::NodeNotFound(end_id.to_string()))?;

        let tree = shortest_path_tree(network, start, Some(end));
        let distance = tree.distances.get(&end).copied().unwrap_or(f64::INFINITY);

        let route = if distance.is_finite() {
            let waypoints = tree
                .path_to(start, end)
                .into_iter()
                .map(|idx| waypoint(network, idx))
                .collect();
            Route {
                success: true,
                start_id: key.0.clone(),
                end_id: key.1.clone(),
                distance_m: distance,
                duration_min: walking_minutes(distance),
                waypoints,
            }
        } else {
            Route {
                success: false,
                start_id: key.0.clone(),
                end_id: key.1.clone(),
                distance_m: f64::INFINITY,
                duration_min: 0,
                waypoints: vec![waypoint(network, end)],
            }
        };

        if route.success {
            info!(
                "Route planned: {start_id} -> {end_id}, {:.1} m, {} waypoints",
                route.distance_m,
                route.waypoints.len()
            );
        } else {
            info!("No route: {start_id} -> {end_id}");
        }

        self.cache.insert(key, route.clone());
        Ok(route)
    }

    /// Drops all cached routes. Required after any network mutation.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_routes(&self) -> usize {
        self.cache.len()
    }
}

fn waypoint(network: &PathNetwork, idx: petgraph::graph::NodeIndex) -> Waypoint {
    let node = network.node_at(idx);
    Waypoint {
        node_id: node.id.clone(),
        location: node.geometry,
        name: node.name.clone(),
        kind: node.kind.clone(),
    }
}

/// Whole-minute walking estimate at the fixed average speed, rounded up.
fn walking_minutes(distance_m: f64) -> u32 {
    (distance_m / WALKING_SPEED_MPS / 60.0).ceil() as u32
}
