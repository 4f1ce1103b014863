//! Events emitted by the tracker and the sample type that drives it.

use chrono::{DateTime, TimeDelta, Utc};
use geo::Point;
use thiserror::Error;

use crate::routing::{Route, Waypoint};

/// One raw position fix from the sensing subsystem.
#[derive(Debug, Clone)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy, meters.
    pub accuracy_m: f64,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A retained history entry: the sample plus the waypoint index that was
/// active when it arrived.
#[derive(Debug, Clone)]
pub struct TrackPoint {
    pub sample: PositionSample,
    pub waypoint_index: usize,
}

/// Periodic progress snapshot while navigating on-route.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub current_waypoint: Waypoint,
    pub next_waypoint: Option<Waypoint>,
    pub distance_to_waypoint_m: f64,
    pub distance_to_destination_m: f64,
    pub total_distance_traveled_m: f64,
    /// Seconds remaining at the fixed walking speed, rounded up.
    pub time_remaining_s: u64,
    pub waypoint_index: usize,
    pub total_waypoints: usize,
    /// Compass bearing from the current position to the next waypoint;
    /// absent on the final segment.
    pub bearing_deg: Option<f64>,
    pub instruction: String,
}

/// Failure codes from the external position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensingFailure {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

/// Recoverable errors surfaced through the event stream. None of these
/// are fatal to the session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NavigationError {
    #[error("position permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("position source timed out")]
    SensingTimeout,
    #[error("route recalculation failed: {0}")]
    Recalculation(String),
}

impl From<SensingFailure> for NavigationError {
    fn from(failure: SensingFailure) -> Self {
        match failure {
            SensingFailure::PermissionDenied => Self::PermissionDenied,
            SensingFailure::PositionUnavailable => Self::PositionUnavailable,
            SensingFailure::Timeout => Self::SensingTimeout,
        }
    }
}

/// Everything the tracker tells its observers.
#[derive(Debug, Clone)]
pub enum NavigationEvent {
    /// Every accepted sample, before any evaluation.
    LocationUpdate(PositionSample),
    Progress(ProgressUpdate),
    WaypointReached {
        waypoint: Waypoint,
        waypoint_index: usize,
        total_waypoints: usize,
    },
    DestinationReached {
        destination: Waypoint,
        total_distance_traveled_m: f64,
        elapsed: TimeDelta,
        history: Vec<TrackPoint>,
    },
    OffRoute {
        position: PositionSample,
        route: Route,
    },
    Error(NavigationError),
}
