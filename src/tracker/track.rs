//! Single vehicle track and its exported record.

use std::fmt;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::fusion::GlobalDetection;
use crate::tracker::track_state::TrackState;

/// Identity of a track: the reporting sensor plus its local object id.
///
/// Sensors reuse small integer ids, so the sensor name is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey {
    pub sensor: String,
    pub local_id: i64,
}

impl TrackKey {
    pub fn new(sensor: impl Into<String>, local_id: i64) -> Self {
        Self {
            sensor: sensor.into(),
            local_id,
        }
    }

    pub fn of(detection: &GlobalDetection) -> Self {
        Self::new(detection.sensor(), detection.local_id())
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_id, self.sensor)
    }
}

/// A vehicle followed across frames.
///
/// The timestamp, position and velocity series always have equal length.
#[derive(Debug, Clone)]
pub struct Track {
    key: TrackKey,
    missing: u32,
    state: TrackState,
    timestamps: Vec<f64>,
    positions: Vec<Point2<f64>>,
    velocities: Vec<Vector2<f64>>,
    category: String,
    road: String,
    sensor: String,
}

impl Track {
    pub fn new(
        key: TrackKey,
        timestamp: f64,
        detection: &GlobalDetection,
        road: impl Into<String>,
    ) -> Self {
        Self {
            sensor: detection.sensor().to_string(),
            category: detection.category().to_string(),
            road: road.into(),
            key,
            missing: 0,
            state: TrackState::Active,
            timestamps: vec![timestamp],
            positions: vec![detection.position],
            velocities: vec![detection.velocity],
        }
    }

    pub fn add_measurement(
        &mut self,
        timestamp: f64,
        position: Point2<f64>,
        velocity: Vector2<f64>,
    ) {
        self.missing = 0;
        self.timestamps.push(timestamp);
        self.positions.push(position);
        self.velocities.push(velocity);
    }

    /// Count one more frame without a measurement; returns the new count.
    pub fn mark_missing(&mut self) -> u32 {
        self.missing += 1;
        self.missing
    }

    pub(crate) fn set_state(&mut self, state: TrackState) {
        self.state = state;
    }

    /// Path length: sum of distances between consecutive positions.
    pub fn length(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|w| nalgebra::distance(&w[0], &w[1]))
            .sum()
    }

    /// Number of velocity samples exactly equal to zero in both components.
    pub fn idle_sample_count(&self) -> usize {
        self.velocities
            .iter()
            .filter(|v| v.x == 0.0 && v.y == 0.0)
            .count()
    }

    pub fn key(&self) -> &TrackKey {
        &self.key
    }

    pub fn missing(&self) -> u32 {
        self.missing
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn positions(&self) -> &[Point2<f64>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vector2<f64>] {
        &self.velocities
    }

    pub fn last_position(&self) -> Option<&Point2<f64>> {
        self.positions.last()
    }

    pub fn last_velocity(&self) -> Option<&Vector2<f64>> {
        self.velocities.last()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn road(&self) -> &str {
        &self.road
    }

    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    /// Snapshot the track into an independent record.
    pub fn to_record(&self) -> TrackRecord {
        TrackRecord {
            id: self.key.clone(),
            missing: self.missing,
            category: self.category.clone(),
            road: self.road.clone(),
            sensor: self.sensor.clone(),
            length: self.length(),
            idle_count: self.idle_sample_count(),
            timestamps: self.timestamps.clone(),
            positions: self.positions.iter().map(|p| [p.x, p.y]).collect(),
            velocities: self.velocities.iter().map(|v| [v.x, v.y]).collect(),
        }
    }
}

/// Finalized, exported form of a [`Track`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: TrackKey,
    /// Missing count at finalization.
    pub missing: u32,
    #[serde(rename = "type")]
    pub category: String,
    pub road: String,
    #[serde(rename = "radar")]
    pub sensor: String,
    pub length: f64,
    pub idle_count: usize,
    pub timestamps: Vec<f64>,
    #[serde(rename = "phistory")]
    pub positions: Vec<[f64; 2]>,
    #[serde(rename = "vhistory")]
    pub velocities: Vec<[f64; 2]>,
}

impl TrackRecord {
    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn has_stops(&self) -> bool {
        self.idle_count > 0
    }
}
