//! Real-time pedestrian wayfinding for a geofenced footpath network.
//!
//! The crate is built around four components, leaf first:
//!
//! - [`geodesy`] — pure geodesic distance, bearing, and point-to-segment
//!   projection used by everything else.
//! - [`model`] — the in-memory footpath graph, built once from a list of
//!   geometric features and queried for nearest nodes and adjacency.
//! - [`routing`] — single-source Dijkstra over the graph with a per
//!   (start, end) result cache.
//! - [`tracking`] — a state machine driven by live position samples that
//!   walks an active route, emitting progress, waypoint, arrival, and
//!   off-route events and re-planning when the walker drifts.
//!
//! Map rendering, position sensing, and any persistence are external
//! collaborators: the model consumes already-deserialized features and the
//! tracker consumes raw position samples from whatever sensor the host
//! provides.

pub mod error;
pub mod geodesy;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod tracking;

pub use error::Error;

/// Node identifiers are the feature ids of the source data, plus the
/// synthesized `{feature}_point_{i}` ids of pathway vertices.
pub type NodeId = String;

/// Average pedestrian walking speed, meters per second. All duration and
/// ETA estimates are derived from remaining distance at this speed.
pub const WALKING_SPEED_MPS: f64 = 1.4;
