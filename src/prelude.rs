// Re-export key components
pub use crate::error::Error;
pub use crate::geodesy::{haversine_distance, initial_bearing, point_to_segment_distance};
pub use crate::model::{NodeKind, PathFeature, PathNetwork, PathNode};
pub use crate::routing::{Route, RoutePlanner, Waypoint};
pub use crate::tracking::{
    NavigationEvent, NavigationTracker, PositionSample, SensingFailure, TrackerConfig,
    TrackerState,
};

// Core types and constants
pub use crate::NodeId;
pub use crate::WALKING_SPEED_MPS; // meters per second
