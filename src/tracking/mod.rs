//! Live tracking of a walker against an active route.
//!
//! The tracker is a single-threaded state machine driven by position
//! samples from the host's sensing subsystem. Each sample updates the
//! session and, at a bounded rate, re-evaluates progress: arrival,
//! waypoint advance, off-route drift with re-planning, or a plain
//! progress update.

mod config;
mod events;
mod session;
mod tracker;

pub use config::TrackerConfig;
pub use events::{
    NavigationError, NavigationEvent, PositionSample, ProgressUpdate, SensingFailure, TrackPoint,
};
pub use session::HISTORY_CAP;
pub use tracker::{NavigationTracker, TrackerState, TrackerStatus};
