//! Mutable state of one active walk.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use geo::Point;

use super::events::{PositionSample, TrackPoint};
use crate::geodesy::haversine_distance;
use crate::routing::Route;

/// Retained history entries; oldest are evicted beyond this.
pub const HISTORY_CAP: usize = 100;

/// State bound to one navigation session: the active route, progress
/// along it, and the movement actually observed. Created on start,
/// dropped on stop or arrival.
#[derive(Debug)]
pub(crate) struct NavigationSession {
    pub route: Route,
    /// The originally requested destination coordinate; recalculations
    /// re-target this, not the nearest node of the abandoned route.
    pub destination: Point<f64>,
    /// Index into the route's waypoints; monotonically non-decreasing on
    /// a given route, reset to zero on re-plan.
    pub waypoint_index: usize,
    pub position: Option<PositionSample>,
    /// Cumulative distance actually walked, independent of the planned
    /// route distance.
    pub traveled_m: f64,
    history: VecDeque<TrackPoint>,
    pub started_at: DateTime<Utc>,
    pub last_evaluation: Option<DateTime<Utc>>,
}

impl NavigationSession {
    pub fn new(route: Route, destination: Point<f64>, started_at: DateTime<Utc>) -> Self {
        Self {
            route,
            destination,
            waypoint_index: 0,
            position: None,
            traveled_m: 0.0,
            history: VecDeque::new(),
            started_at,
            last_evaluation: None,
        }
    }

    /// Ingests a sample: the current position always updates, but only
    /// movement of at least `min_progress_m` accrues traveled distance
    /// and a history entry. Returns the distance moved since the previous
    /// sample.
    pub fn record(&mut self, sample: PositionSample, min_progress_m: f64) -> f64 {
        let moved = match &self.position {
            Some(previous) => haversine_distance(previous.point(), sample.point()),
            None => 0.0,
        };

        if self.position.is_some() && moved >= min_progress_m {
            self.traveled_m += moved;
            self.history.push_back(TrackPoint {
                sample: sample.clone(),
                waypoint_index: self.waypoint_index,
            });
            if self.history.len() > HISTORY_CAP {
                self.history.pop_front();
            }
        }

        self.position = Some(sample);
        moved
    }

    pub fn history(&self) -> impl Iterator<Item = &TrackPoint> {
        self.history.iter()
    }

    pub fn take_history(&mut self) -> Vec<TrackPoint> {
        self.history.drain(..).collect()
    }
}
