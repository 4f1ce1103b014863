//! Shortest-path search over the footpath network.

pub(crate) mod dijkstra;
mod planner;

pub use planner::{Route, RoutePlanner, Waypoint};
