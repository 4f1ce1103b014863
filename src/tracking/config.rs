use chrono::TimeDelta;

/// Tracker thresholds and intervals. Defaults are the field-tested values
/// for dense footpath networks, where consumer GPS accuracy is the
/// limiting factor.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Distance to the destination at which the walker has arrived.
    pub arrival_threshold_m: f64,
    /// Distance to the active waypoint at which the route advances.
    pub waypoint_threshold_m: f64,
    /// Perpendicular distance from the current route segment beyond which
    /// the walker is off route.
    pub off_route_threshold_m: f64,
    /// Minimum movement between samples that counts as progress; smaller
    /// jumps are sensor jitter and do not accrue traveled distance.
    pub min_progress_m: f64,
    /// Minimum interval between progress re-evaluations, measured against
    /// sample timestamps.
    pub update_interval: TimeDelta,
    /// Gap between consecutive samples beyond which the position source
    /// is considered stalled and a sensing error is reported.
    pub sample_staleness: TimeDelta,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            arrival_threshold_m: 3.0,
            waypoint_threshold_m: 8.0,
            off_route_threshold_m: 15.0,
            min_progress_m: 1.0,
            update_interval: TimeDelta::milliseconds(250),
            sample_staleness: TimeDelta::seconds(10),
        }
    }
}
