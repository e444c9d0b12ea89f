//! Aggregate counters over finalized tracks.

use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};
use crate::tracker::track::Track;

/// Mean, extrema and population standard deviation of valid track lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// Counters accumulated by the track manager. Never decrease.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    tracks_per_category: BTreeMap<String, usize>,
    tracks_per_road: BTreeMap<String, usize>,
    total_length_all: f64,
    total_length_valid: f64,
    pass_by_count: usize,
    tracks_created: usize,
    tracks_finalized: usize,
    valid_lengths: Vec<f64>,
}

impl RunStatistics {
    pub(crate) fn record_created(&mut self) {
        self.tracks_created += 1;
    }

    pub(crate) fn record_finalized(&mut self, length: f64) {
        self.tracks_finalized += 1;
        self.total_length_all += length;
    }

    pub(crate) fn record_valid(&mut self, track: &Track, length: f64) {
        self.valid_lengths.push(length);
        self.total_length_valid += length;
        *self
            .tracks_per_category
            .entry(track.category().to_string())
            .or_insert(0) += 1;
        *self.tracks_per_road.entry(track.road().to_string()).or_insert(0) += 1;
        if track.idle_sample_count() == 0 {
            self.pass_by_count += 1;
        }
    }

    pub fn tracks_per_category(&self) -> &BTreeMap<String, usize> {
        &self.tracks_per_category
    }

    pub fn tracks_per_road(&self) -> &BTreeMap<String, usize> {
        &self.tracks_per_road
    }

    pub fn total_length_all(&self) -> f64 {
        self.total_length_all
    }

    pub fn total_length_valid(&self) -> f64 {
        self.total_length_valid
    }

    pub fn pass_by_count(&self) -> usize {
        self.pass_by_count
    }

    pub fn tracks_created(&self) -> usize {
        self.tracks_created
    }

    pub fn tracks_finalized(&self) -> usize {
        self.tracks_finalized
    }

    pub fn valid_count(&self) -> usize {
        self.valid_lengths.len()
    }

    pub fn valid_lengths(&self) -> &[f64] {
        &self.valid_lengths
    }

    /// Share of finalized path length that belongs to valid tracks.
    /// Zero when no finalized track has any length.
    pub fn valid_length_ratio(&self) -> f64 {
        if self.total_length_all > 0.0 {
            self.total_length_valid / self.total_length_all
        } else {
            0.0
        }
    }

    /// Length distribution over valid tracks, computed on demand.
    pub fn length_summary(&self) -> Result<LengthSummary> {
        let lengths = Array1::from(self.valid_lengths.clone());
        let mean = lengths.mean().ok_or(FusionError::EmptyDataset)?;
        Ok(LengthSummary {
            mean,
            min: lengths.fold(f64::INFINITY, |acc, &l| acc.min(l)),
            max: lengths.fold(f64::NEG_INFINITY, |acc, &l| acc.max(l)),
            std: lengths.std(0.0),
        })
    }

    pub fn metadata(&self) -> Result<RunMetadata> {
        let summary = self.length_summary()?;
        Ok(RunMetadata {
            tracks_per_category: self.tracks_per_category.clone(),
            tracks_per_road: self.tracks_per_road.clone(),
            total_length_all: self.total_length_all,
            total_length_valid: self.total_length_valid,
            valid_length_ratio: self.valid_length_ratio(),
            pass_by_count: self.pass_by_count,
            tracks_created: self.tracks_created,
            tracks_finalized: self.tracks_finalized,
            mean_length: summary.mean,
            max_length: summary.max,
            min_length: summary.min,
            std_length: summary.std,
        })
    }
}

/// Exported run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub tracks_per_category: BTreeMap<String, usize>,
    #[serde(rename = "tracks_per_lane")]
    pub tracks_per_road: BTreeMap<String, usize>,
    #[serde(rename = "total_length_all_tracks")]
    pub total_length_all: f64,
    #[serde(rename = "total_length_complete_tracks")]
    pub total_length_valid: f64,
    #[serde(rename = "percent_complete_tracks")]
    pub valid_length_ratio: f64,
    pub pass_by_count: usize,
    pub tracks_created: usize,
    pub tracks_finalized: usize,
    #[serde(rename = "mean_track_length")]
    pub mean_length: f64,
    #[serde(rename = "max_track_length")]
    pub max_length: f64,
    #[serde(rename = "min_track_length")]
    pub min_length: f64,
    #[serde(rename = "std_track_length")]
    pub std_length: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{Detection, GlobalDetection};
    use crate::tracker::track::TrackKey;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point2, Vector2};

    fn track(category: &str, road: &str, vx: f64) -> Track {
        let det = GlobalDetection {
            local: Detection::new(1, "A1", category, Point2::origin(), Vector2::zeros()),
            position: Point2::origin(),
            velocity: Vector2::new(vx, 0.0),
        };
        Track::new(TrackKey::of(&det), 0.0, &det, road)
    }

    #[test]
    fn test_empty_summary_is_an_error() {
        let stats = RunStatistics::default();
        assert!(matches!(stats.length_summary(), Err(FusionError::EmptyDataset)));
        assert!(matches!(stats.metadata(), Err(FusionError::EmptyDataset)));
    }

    #[test]
    fn test_accumulation() {
        let mut stats = RunStatistics::default();
        for _ in 0..4 {
            stats.record_created();
        }
        stats.record_finalized(50.0);
        stats.record_finalized(100.0);
        stats.record_valid(&track("car", "A1", -1.0), 100.0);
        stats.record_finalized(200.0);
        stats.record_valid(&track("car", "B", 0.0), 200.0);
        stats.record_finalized(150.0);
        stats.record_valid(&track("truck", "A1", -2.0), 150.0);

        assert_eq!(stats.tracks_created(), 4);
        assert_eq!(stats.tracks_finalized(), 4);
        assert_eq!(stats.valid_count(), 3);
        assert_eq!(stats.tracks_per_category()["car"], 2);
        assert_eq!(stats.tracks_per_category()["truck"], 1);
        assert_eq!(stats.tracks_per_road()["A1"], 2);
        assert_eq!(stats.tracks_per_road()["B"], 1);
        assert_eq!(stats.pass_by_count(), 2);
        assert_eq!(stats.total_length_all(), 500.0);
        assert_eq!(stats.total_length_valid(), 450.0);
        assert!(stats.total_length_valid() <= stats.total_length_all());

        let summary = stats.length_summary().unwrap();
        assert_abs_diff_eq!(summary.mean, 150.0, epsilon = 1e-12);
        assert_eq!(summary.min, 100.0);
        assert_eq!(summary.max, 200.0);
        // population std of [100, 200, 150]
        assert_abs_diff_eq!(summary.std, (5000.0_f64 / 3.0).sqrt(), epsilon = 1e-9);

        let meta = stats.metadata().unwrap();
        assert_abs_diff_eq!(meta.valid_length_ratio, 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_metadata_keys() {
        let mut stats = RunStatistics::default();
        stats.record_finalized(120.0);
        stats.record_valid(&track("car", "B", -1.0), 120.0);
        let value = serde_json::to_value(stats.metadata().unwrap()).unwrap();
        for key in [
            "tracks_per_category",
            "tracks_per_lane",
            "total_length_all_tracks",
            "total_length_complete_tracks",
            "percent_complete_tracks",
            "pass_by_count",
            "mean_track_length",
            "max_track_length",
            "min_track_length",
            "std_track_length",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }
}
