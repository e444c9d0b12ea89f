//! Frame-by-frame association of detections into tracks.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FusionError, Result};
use crate::fusion::{GlobalDetection, UNKNOWN_ROAD, road_label};
use crate::tracker::region::RegionOfInterest;
use crate::tracker::statistics::{RunMetadata, RunStatistics};
use crate::tracker::track::{Track, TrackKey, TrackRecord};
use crate::tracker::track_state::TrackState;
use crate::tracker::validator::TrackValidator;

/// Configuration for the TrackManager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackManagerConfig {
    /// Consecutive missing frames tolerated before a track is finalized.
    pub max_missing: u32,
    /// Minimum path length of a valid track.
    pub min_length: f64,
}

impl Default for TrackManagerConfig {
    fn default() -> Self {
        Self {
            max_missing: 2,
            min_length: 100.0,
        }
    }
}

/// What one call to [`TrackManager::update`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    pub created: usize,
    pub updated: usize,
    pub missing: usize,
    /// Tracks finalized this frame with their validation outcome.
    pub finalized: Vec<(TrackKey, TrackState)>,
}

/// Owns the active tracks, the completed records and the run statistics.
///
/// Single writer: frames must be delivered in strictly increasing
/// timestamp order.
#[derive(Debug, Clone)]
pub struct TrackManager {
    config: TrackManagerConfig,
    validator: TrackValidator,
    roads: HashMap<String, String>,
    tracks: BTreeMap<TrackKey, Track>,
    completed: Vec<TrackRecord>,
    stats: RunStatistics,
    last_timestamp: Option<f64>,
}

impl TrackManager {
    pub fn new(config: TrackManagerConfig, region: RegionOfInterest) -> Result<Self> {
        let validator = TrackValidator::new(config.min_length, region)?;
        Ok(Self {
            config,
            validator,
            roads: HashMap::new(),
            tracks: BTreeMap::new(),
            completed: Vec::new(),
            stats: RunStatistics::default(),
            last_timestamp: None,
        })
    }

    /// Explicit sensor name to road label table. Sensors absent from the
    /// table fall back to the name prefix.
    pub fn with_road_table(mut self, roads: HashMap<String, String>) -> Self {
        self.roads = roads;
        self
    }

    fn road_for(&self, sensor: &str) -> String {
        self.roads
            .get(sensor)
            .map(String::as_str)
            .or_else(|| road_label(sensor))
            .unwrap_or(UNKNOWN_ROAD)
            .to_string()
    }

    /// Apply one frame of global detections.
    ///
    /// A frame whose timestamp does not strictly follow the previous one is
    /// rejected and leaves the manager untouched.
    pub fn update(&mut self, detections: &[GlobalDetection], timestamp: f64) -> Result<UpdateSummary> {
        if let Some(previous) = self.last_timestamp
            && !(timestamp > previous)
        {
            return Err(FusionError::NonMonotonicTimestamp {
                previous,
                current: timestamp,
            });
        }
        if !timestamp.is_finite() {
            return Err(FusionError::NonMonotonicTimestamp {
                previous: self.last_timestamp.unwrap_or(f64::NEG_INFINITY),
                current: timestamp,
            });
        }
        self.last_timestamp = Some(timestamp);

        // Step 1: index detections by identity, a repeated key keeps the last
        let mut measured: BTreeMap<TrackKey, &GlobalDetection> = BTreeMap::new();
        for det in detections {
            if let Some(prev) = measured.insert(TrackKey::of(det), det) {
                debug!(id = prev.local_id(), sensor = prev.sensor(), "duplicate identity in frame");
            }
        }

        let mut summary = UpdateSummary::default();

        // Step 2: existing tracks are either updated or missing
        let mut to_finalize = Vec::new();
        for (key, track) in self.tracks.iter_mut() {
            match measured.remove(key) {
                Some(det) => {
                    track.add_measurement(timestamp, det.position, det.velocity);
                    summary.updated += 1;
                }
                None => {
                    summary.missing += 1;
                    if track.mark_missing() > self.config.max_missing {
                        to_finalize.push(key.clone());
                    }
                }
            }
        }

        // Step 3: remaining identities start new tracks
        for (key, det) in measured {
            let road = self.road_for(det.sensor());
            debug!(track = %key, road = %road, "new track");
            self.tracks.insert(key.clone(), Track::new(key, timestamp, det, road));
            self.stats.record_created();
            summary.created += 1;
        }

        // Step 4: finalize stale tracks
        for key in to_finalize {
            if let Some(track) = self.tracks.remove(&key) {
                let state = self.finalize(track);
                summary.finalized.push((key, state));
            }
        }

        Ok(summary)
    }

    fn finalize(&mut self, mut track: Track) -> TrackState {
        track.set_state(TrackState::Finalized);
        let length = track.length();
        self.stats.record_finalized(length);

        let state = self.validator.classify(&track);
        track.set_state(state);
        if state == TrackState::Valid {
            self.completed.push(track.to_record());
            self.stats.record_valid(&track, length);
        }
        debug!(
            track = %track.key(),
            samples = track.len(),
            length,
            ?state,
            "finalized track"
        );
        state
    }

    /// Stop ingestion. Active tracks are dropped without finalization.
    pub fn finish(&mut self) -> usize {
        let dropped = self.tracks.len();
        if dropped > 0 {
            debug!(dropped, "dropping unfinished tracks at stream end");
        }
        self.tracks.clear();
        dropped
    }

    pub fn config(&self) -> &TrackManagerConfig {
        &self.config
    }

    pub fn validator(&self) -> &TrackValidator {
        &self.validator
    }

    pub fn active_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn active_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, key: &TrackKey) -> Option<&Track> {
        self.tracks.get(key)
    }

    /// Completed records in finalization order.
    pub fn completed(&self) -> &[TrackRecord] {
        &self.completed
    }

    /// Owned copies of the completed records.
    pub fn completed_tracks(&self) -> Vec<TrackRecord> {
        self.completed.clone()
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn metadata(&self) -> Result<RunMetadata> {
        self.stats.metadata()
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Dump the active tracks at debug level.
    pub fn log_state(&self) {
        debug!(active = self.tracks.len(), "tracker state");
        for track in self.tracks.values() {
            if let (Some(p), Some(v)) = (track.last_position(), track.last_velocity()) {
                debug!(
                    track = %track.key(),
                    missing = track.missing(),
                    x = p.x,
                    y = p.y,
                    vx = v.x,
                    vy = v.y,
                    "active track"
                );
            }
        }
    }
}
