//! The navigation state machine.

use chrono::Utc;
use geo::Point;
use log::{debug, info, warn};

use super::config::TrackerConfig;
use super::events::{
    NavigationError, NavigationEvent, PositionSample, ProgressUpdate, SensingFailure,
};
use super::session::NavigationSession;
use crate::geodesy::{cardinal, haversine_distance, initial_bearing, point_to_segment_distance};
use crate::model::PathNetwork;
use crate::routing::{Route, RoutePlanner, Waypoint};
use crate::{Error, WALKING_SPEED_MPS};

/// Lifecycle of a tracked walk.
///
/// `Idle -> Navigating`, with waypoint advances self-looping inside
/// `Navigating`; drift goes `Navigating -> OffRoute -> Recalculating` and
/// back to `Navigating` once a fresh route exists. `Arrived` and
/// `Stopped` are terminal; no further samples are evaluated in either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Navigating,
    OffRoute,
    Recalculating,
    Arrived,
    Stopped,
}

/// Snapshot of the tracker for polling callers.
#[derive(Debug, Clone)]
pub struct TrackerStatus {
    pub state: TrackerState,
    pub waypoint_index: usize,
    pub total_waypoints: usize,
    pub total_distance_traveled_m: f64,
    pub position: Option<PositionSample>,
}

type Observer = Box<dyn FnMut(&NavigationEvent)>;

/// Tracks a walker against an active route, re-planning on drift.
///
/// Single-threaded and callback driven: the host feeds raw position
/// samples via [`Self::on_sample`] and receives [`NavigationEvent`]s on
/// every subscribed observer. The tracker owns the planner (and its
/// route cache); the network is borrowed per call.
pub struct NavigationTracker {
    config: TrackerConfig,
    planner: RoutePlanner,
    state: TrackerState,
    session: Option<NavigationSession>,
    observers: Vec<Observer>,
    recalculation_pending: bool,
}

impl NavigationTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            planner: RoutePlanner::new(),
            state: TrackerState::Idle,
            session: None,
            observers: Vec::new(),
            recalculation_pending: false,
        }
    }

    /// Registers an observer for all navigation events. Any number of
    /// independent observers may subscribe.
    pub fn subscribe(&mut self, observer: impl FnMut(&NavigationEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn planner(&mut self) -> &mut RoutePlanner {
        &mut self.planner
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            state: self.state,
            waypoint_index: self.session.as_ref().map_or(0, |s| s.waypoint_index),
            total_waypoints: self
                .session
                .as_ref()
                .map_or(0, |s| s.route.waypoints.len()),
            total_distance_traveled_m: self.session.as_ref().map_or(0.0, |s| s.traveled_m),
            position: self.session.as_ref().and_then(|s| s.position.clone()),
        }
    }

    /// Starts navigating from `from` to `to`, resolving both against the
    /// nearest network nodes.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyNetwork`] when the network has no nodes,
    /// [`Error::NodeNotFound`] / [`Error::NoRoute`] when the initial plan
    /// fails. On error the machine keeps its previous state.
    pub fn start(
        &mut self,
        network: &PathNetwork,
        from: Point<f64>,
        to: Point<f64>,
    ) -> Result<Route, Error> {
        let route = self.plan_between(network, from, to)?;
        info!(
            "Navigation started: {} -> {}, {:.1} m, {} waypoints",
            route.start_id,
            route.end_id,
            route.distance_m,
            route.waypoints.len()
        );
        self.session = Some(NavigationSession::new(route.clone(), to, Utc::now()));
        self.state = TrackerState::Navigating;
        self.recalculation_pending = false;
        Ok(route)
    }

    /// Ingests one raw position sample.
    ///
    /// The current position always updates and a `LocationUpdate` is
    /// always emitted, but progress re-evaluation runs at most once per
    /// configured interval. Samples arriving after `Arrived` or
    /// `Stopped` are inert.
    pub fn on_sample(&mut self, network: &PathNetwork, sample: PositionSample) {
        match self.state {
            TrackerState::Navigating | TrackerState::OffRoute | TrackerState::Recalculating => {}
            TrackerState::Idle | TrackerState::Arrived | TrackerState::Stopped => return,
        }
        let stale = self
            .session
            .as_ref()
            .and_then(|s| s.position.as_ref())
            .is_some_and(|prev| sample.timestamp - prev.timestamp > self.config.sample_staleness);
        if stale {
            warn!("Position source stalled, sample gap exceeds tolerance");
            self.emit(NavigationEvent::Error(NavigationError::SensingTimeout));
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.record(sample.clone(), self.config.min_progress_m);
        self.emit(NavigationEvent::LocationUpdate(sample.clone()));

        let due = self.session.as_ref().is_some_and(|s| {
            s.last_evaluation
                .is_none_or(|last| sample.timestamp - last >= self.config.update_interval)
        });
        if !due {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.last_evaluation = Some(sample.timestamp);
        }

        if self.state == TrackerState::OffRoute {
            // Still adrift from a failed recalculation: retry.
            self.recalculate(network);
            return;
        }
        self.evaluate(network);
    }

    /// Surfaces a failure reported by the external position source.
    /// Sensing failures never change the navigation state.
    pub fn report_sensing_error(&mut self, failure: SensingFailure) {
        warn!("Sensing failure: {failure:?}");
        self.emit(NavigationEvent::Error(failure.into()));
    }

    /// Stops navigating and clears all session state. Idempotent.
    pub fn stop(&mut self) {
        if self.state == TrackerState::Stopped {
            return;
        }
        info!("Navigation stopped");
        self.session = None;
        self.recalculation_pending = false;
        self.state = TrackerState::Stopped;
    }

    /// One progress evaluation against the current position: arrival,
    /// then waypoint advance, then off-route drift, then a plain
    /// progress update.
    fn evaluate(&mut self, network: &PathNetwork) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(position) = session.position.clone() else {
            return;
        };
        let here = position.point();
        let index = session.waypoint_index;
        let total = session.route.waypoints.len();
        let current = session.route.waypoints[index].clone();
        let next = session.route.waypoints.get(index + 1).cloned();
        let destination = session.route.destination().clone();
        let traveled = session.traveled_m;
        let remaining_tail = session.route.remaining_from(index);

        let to_destination = haversine_distance(here, destination.location);
        if to_destination <= self.config.arrival_threshold_m {
            self.arrive(destination);
            return;
        }

        let to_waypoint = haversine_distance(here, current.location);
        if to_waypoint <= self.config.waypoint_threshold_m && next.is_some() {
            if let Some(session) = self.session.as_mut() {
                session.waypoint_index = index + 1;
            }
            debug!("Waypoint {} reached: {}", index, current.node_id);
            // Leaving the route's start node is not an announceable
            // milestone; the walk begins there.
            if index > 0 {
                self.emit(NavigationEvent::WaypointReached {
                    waypoint: current,
                    waypoint_index: index,
                    total_waypoints: total,
                });
            }
            return;
        }

        if let Some(next_waypoint) = &next {
            let drift =
                point_to_segment_distance(here, current.location, next_waypoint.location);
            if drift > self.config.off_route_threshold_m {
                warn!("Off route: {drift:.1} m from the active segment");
                self.state = TrackerState::OffRoute;
                let route = session_route(self.session.as_ref());
                self.emit(NavigationEvent::OffRoute {
                    position: position.clone(),
                    route,
                });
                self.recalculate(network);
                return;
            }
        }

        let remaining = remaining_tail + to_waypoint;
        let update = ProgressUpdate {
            distance_to_waypoint_m: to_waypoint,
            distance_to_destination_m: to_destination,
            total_distance_traveled_m: traveled,
            time_remaining_s: (remaining / WALKING_SPEED_MPS).ceil() as u64,
            waypoint_index: index,
            total_waypoints: total,
            bearing_deg: next
                .as_ref()
                .map(|n| initial_bearing(here, n.location)),
            instruction: instruction(&current, next.as_ref(), to_waypoint),
            current_waypoint: current,
            next_waypoint: next,
        };
        self.emit(NavigationEvent::Progress(update));
    }

    fn arrive(&mut self, destination: Waypoint) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.state = TrackerState::Arrived;
        let elapsed = session
            .position
            .as_ref()
            .map(|p| p.timestamp - session.started_at)
            .unwrap_or_else(chrono::TimeDelta::zero);
        info!(
            "Destination reached: {} after {:.1} m walked",
            destination.node_id, session.traveled_m
        );
        let event = NavigationEvent::DestinationReached {
            destination,
            total_distance_traveled_m: session.traveled_m,
            elapsed,
            history: session.take_history(),
        };
        self.emit(event);
    }

    /// Re-plans from the current position to the original destination.
    /// Success swaps the route in and resets the waypoint index; failure
    /// keeps `OffRoute` and is retried on the next tick. Only one
    /// recalculation may be in flight at a time.
    fn recalculate(&mut self, network: &PathNetwork) {
        if self.recalculation_pending {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(position) = session.position.clone() else {
            return;
        };
        let destination = session.destination;

        self.recalculation_pending = true;
        self.state = TrackerState::Recalculating;

        match self.plan_between(network, position.point(), destination) {
            Ok(route) => {
                info!("Route recalculated: {} waypoints", route.waypoints.len());
                if let Some(session) = self.session.as_mut() {
                    session.route = route;
                    session.waypoint_index = 0;
                }
                self.state = TrackerState::Navigating;
            }
            Err(err) => {
                debug!("Recalculation failed, retrying on next tick: {err}");
                self.state = TrackerState::OffRoute;
                self.emit(NavigationEvent::Error(NavigationError::Recalculation(
                    err.to_string(),
                )));
            }
        }
        self.recalculation_pending = false;
    }

    /// Resolves both coordinates to their nearest nodes and plans between
    /// them; an unreachable plan is mapped to [`Error::NoRoute`].
    fn plan_between(
        &mut self,
        network: &PathNetwork,
        from: Point<f64>,
        to: Point<f64>,
    ) -> Result<Route, Error> {
        let start = network
            .nearest_node(from)
            .ok_or(Error::EmptyNetwork)?
            .id
            .clone();
        let end = network
            .nearest_node(to)
            .ok_or(Error::EmptyNetwork)?
            .id
            .clone();
        let route = self.planner.plan(network, &start, &end)?;
        if route.success {
            Ok(route)
        } else {
            Err(Error::NoRoute { start, end })
        }
    }

    fn emit(&mut self, event: NavigationEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

fn session_route(session: Option<&NavigationSession>) -> Route {
    // Only called while a session is active.
    session
        .map(|s| s.route.clone())
        .unwrap_or_else(|| Route {
            success: false,
            start_id: String::new(),
            end_id: String::new(),
            distance_m: f64::INFINITY,
            duration_min: 0,
            waypoints: Vec::new(),
        })
}

/// Near-field: announce the turn at the upcoming waypoint. Far-field:
/// keep walking toward the current one first.
fn instruction(current: &Waypoint, next: Option<&Waypoint>, to_waypoint_m: f64) -> String {
    let Some(next) = next else {
        return format!("Continue to {}", current.name);
    };
    let direction = cardinal(initial_bearing(current.location, next.location));
    let meters = to_waypoint_m.round() as i64;
    if to_waypoint_m < 20.0 {
        format!("In {meters}m, head {direction} to {}", next.name)
    } else {
        format!("Continue {meters}m to {}, then head {direction}", current.name)
    }
}
