//! End-to-end scenarios: plan a route over a small footpath network and
//! walk it with synthetic position samples.

use camposanto::prelude::*;
use chrono::{DateTime, TimeDelta, Utc};
use geo::Point;
use std::cell::RefCell;
use std::rc::Rc;

/// Five nodes on a straight equatorial line, ~33.4 m apart, chained
/// a-b-c-d-e through `connects_to` declarations.
fn line_network() -> PathNetwork {
    let features: Vec<PathFeature> = serde_json::from_value(serde_json::json!([
        {"id": "a", "name": "Main Entrance", "type": "entrance",
         "coordinates": [0.0, 0.0], "connects_to": ["b"]},
        {"id": "b", "name": "B", "type": "junction",
         "coordinates": [0.0003, 0.0], "connects_to": ["c"]},
        {"id": "c", "name": "C", "type": "junction",
         "coordinates": [0.0006, 0.0], "connects_to": ["d"]},
        {"id": "d", "name": "D", "type": "junction",
         "coordinates": [0.0009, 0.0], "connects_to": ["e"]},
        {"id": "e", "name": "Block 5 Access", "type": "block_access",
         "coordinates": [0.0012, 0.0]},
    ]))
    .unwrap();
    PathNetwork::from_features(&features)
}

fn sample(lon: f64, lat: f64, base: DateTime<Utc>, at_s: i64) -> PositionSample {
    PositionSample {
        latitude: lat,
        longitude: lon,
        accuracy_m: 5.0,
        timestamp: base + TimeDelta::seconds(at_s),
    }
}

fn capturing_tracker() -> (NavigationTracker, Rc<RefCell<Vec<NavigationEvent>>>) {
    let mut tracker = NavigationTracker::new(TrackerConfig::default());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    tracker.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    (tracker, events)
}

#[test]
fn line_route_has_expected_shape_distance_and_duration() {
    let network = line_network();
    let mut planner = RoutePlanner::new();
    let route = planner.plan(&network, "a", "e").unwrap();

    assert!(route.success);
    let ids: Vec<_> = route.waypoints.iter().map(|w| w.node_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);

    // Four equal segments.
    let segment = network.edge_weight("a", "b").unwrap();
    assert!((route.distance_m - 4.0 * segment).abs() < 1e-6);
    assert_eq!(
        route.duration_min,
        (route.distance_m / WALKING_SPEED_MPS / 60.0).ceil() as u32
    );

    // Edge weights match the geodesic distance of their endpoints.
    for pair in route.waypoints.windows(2) {
        let stored = network
            .edge_weight(&pair[0].node_id, &pair[1].node_id)
            .unwrap();
        let geodesic = haversine_distance(pair[0].location, pair[1].location);
        assert!((stored - geodesic).abs() < 1e-9);
    }
}

#[test]
fn walking_the_line_emits_three_waypoints_then_arrival() {
    let network = line_network();
    let (mut tracker, events) = capturing_tracker();
    let base = Utc::now();

    // Start 2 m short of node a, heading for e.
    tracker
        .start(&network, Point::new(-0.000018, 0.0), Point::new(0.0012, 0.0))
        .unwrap();
    assert_eq!(tracker.state(), TrackerState::Navigating);

    // Walk the line: past a, then past b, c, d, toward e, and finally
    // within the arrival threshold of e.
    let walk = [
        -0.000018, 0.00025, 0.00055, 0.00085, 0.00115, 0.001195,
    ];
    for (i, lon) in walk.iter().enumerate() {
        tracker.on_sample(&network, sample(*lon, 0.0, base, i as i64));
    }

    let reached: Vec<String> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            NavigationEvent::WaypointReached { waypoint, .. } => Some(waypoint.node_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(reached, vec!["b", "c", "d"]);

    let arrivals: Vec<(String, f64)> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            NavigationEvent::DestinationReached {
                destination,
                total_distance_traveled_m,
                ..
            } => Some((destination.node_id.clone(), *total_distance_traveled_m)),
            _ => None,
        })
        .collect();
    assert_eq!(arrivals.len(), 1);
    assert_eq!(arrivals[0].0, "e");
    // The walker covered roughly the full line; jitter filtering may
    // shave a little off.
    assert!(arrivals[0].1 > 100.0);

    assert_eq!(tracker.state(), TrackerState::Arrived);
}

#[test]
fn arrival_is_idempotent_under_further_samples() {
    let network = line_network();
    let (mut tracker, events) = capturing_tracker();
    let base = Utc::now();

    tracker
        .start(&network, Point::new(0.0, 0.0), Point::new(0.0012, 0.0))
        .unwrap();
    let walk = [0.0, 0.00025, 0.00055, 0.00085, 0.00115, 0.001195];
    for (i, lon) in walk.iter().enumerate() {
        tracker.on_sample(&network, sample(*lon, 0.0, base, i as i64));
    }
    assert_eq!(tracker.state(), TrackerState::Arrived);
    let emitted = events.borrow().len();

    // Keep pushing samples, including ones that would otherwise be
    // off-route or re-trigger arrival: all inert.
    tracker.on_sample(&network, sample(0.0012, 0.0, base, 100));
    tracker.on_sample(&network, sample(0.0012, 0.001, base, 101));
    assert_eq!(events.borrow().len(), emitted);
    assert_eq!(tracker.state(), TrackerState::Arrived);
}

#[test]
fn perpendicular_drift_beyond_threshold_goes_off_route() {
    let network = line_network();
    let (mut tracker, events) = capturing_tracker();
    let base = Utc::now();

    tracker
        .start(&network, Point::new(0.0, 0.0), Point::new(0.0012, 0.0))
        .unwrap();
    // First sample sits on the segment midway between a and b: the
    // off-route distance is ~0 and nothing fires.
    tracker.on_sample(&network, sample(0.00015, 0.0, base, 0));
    assert_eq!(tracker.state(), TrackerState::Navigating);

    // ~11 m north of the segment: inside the 15 m threshold.
    tracker.on_sample(&network, sample(0.00015, 0.0001, base, 1));
    assert_eq!(tracker.state(), TrackerState::Navigating);
    assert!(
        !events
            .borrow()
            .iter()
            .any(|e| matches!(e, NavigationEvent::OffRoute { .. }))
    );

    // ~22 m north: off route, and the immediate recalculation from the
    // nearest node brings the tracker straight back to Navigating.
    tracker.on_sample(&network, sample(0.00015, 0.0002, base, 2));
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| matches!(e, NavigationEvent::OffRoute { .. }))
    );
    assert_eq!(tracker.state(), TrackerState::Navigating);
    assert_eq!(tracker.status().waypoint_index, 0);
}

#[test]
fn progress_updates_carry_instructions_and_eta() {
    let network = line_network();
    let (mut tracker, events) = capturing_tracker();
    let base = Utc::now();

    tracker
        .start(&network, Point::new(0.0, 0.0), Point::new(0.0012, 0.0))
        .unwrap();
    // Mid-segment, ~17 m from the current waypoint a: progress only.
    tracker.on_sample(&network, sample(0.00015, 0.0, base, 0));

    let events = events.borrow();
    let update = events
        .iter()
        .find_map(|e| match e {
            NavigationEvent::Progress(update) => Some(update.clone()),
            _ => None,
        })
        .expect("expected a progress update");

    assert_eq!(update.current_waypoint.node_id, "a");
    assert_eq!(update.next_waypoint.as_ref().map(|w| w.node_id.as_str()), Some("b"));
    assert_eq!(update.total_waypoints, 5);
    assert!(update.distance_to_destination_m > update.distance_to_waypoint_m);
    // Remaining distance at 1.4 m/s: full line plus the backtrack to a.
    let remaining =
        update.distance_to_waypoint_m + 4.0 * network.edge_weight("a", "b").unwrap();
    assert_eq!(
        update.time_remaining_s,
        (remaining / WALKING_SPEED_MPS).ceil() as u64
    );
    // Next waypoint b is due east of a.
    assert!(update.instruction.contains("head East"));
    let bearing = update.bearing_deg.expect("next waypoint exists");
    assert!((bearing - 90.0).abs() < 1.0);
}

#[test]
fn plan_cache_is_ordered_and_repeatable() {
    let network = line_network();
    let mut planner = RoutePlanner::new();

    let forward = planner.plan(&network, "a", "e").unwrap();
    let repeat = planner.plan(&network, "a", "e").unwrap();
    assert_eq!(planner.cached_routes(), 1);
    assert_eq!(forward.distance_m, repeat.distance_m);

    let reverse = planner.plan(&network, "e", "a").unwrap();
    assert_eq!(planner.cached_routes(), 2);
    let forward_ids: Vec<_> = forward.waypoints.iter().map(|w| w.node_id.as_str()).collect();
    let reverse_ids: Vec<_> = reverse.waypoints.iter().map(|w| w.node_id.as_str()).collect();
    assert_eq!(
        forward_ids,
        reverse_ids.iter().rev().copied().collect::<Vec<_>>()
    );
}

#[test]
fn disconnected_block_is_unreachable_in_band() {
    let mut network = line_network();
    // A block access point appended with no connections at all.
    network.add_node(PathNode {
        id: "orphan_block".to_string(),
        geometry: Point::new(0.01, 0.01),
        kind: NodeKind::BlockAccess,
        name: "Orphan Block".to_string(),
        properties: serde_json::Map::new(),
    });

    let mut planner = RoutePlanner::new();
    let route = planner.plan(&network, "a", "orphan_block").unwrap();
    assert!(!route.success);
    assert!(!route.distance_m.is_finite());
}
