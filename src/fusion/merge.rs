//! Deduplication of detections reported by two sensors with overlapping coverage.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FusionError, Result};
use crate::fusion::detection::GlobalDetection;

/// A pair of sensors whose fields of view overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergePair {
    pub primary: String,
    pub secondary: String,
    /// Max distance between two detections of the same object.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Sensor name given to merged detections. When unset, a merged
    /// detection keeps the identity of its primary-sensor detection.
    #[serde(default)]
    pub merged_sensor: Option<String>,
}

fn default_tolerance() -> f64 {
    2.0
}

impl MergePair {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            tolerance: default_tolerance(),
            merged_sensor: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_merged_sensor(mut self, name: impl Into<String>) -> Self {
        self.merged_sensor = Some(name.into());
        self
    }
}

/// One-to-one matching between two detection sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairAssignment {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_primary: Vec<usize>,
    pub unmatched_secondary: Vec<usize>,
}

/// Pairwise Euclidean distances, shape (primary, secondary).
pub fn distance_matrix(primary: &[GlobalDetection], secondary: &[GlobalDetection]) -> Array2<f64> {
    let mut dists = Array2::zeros((primary.len(), secondary.len()));
    for (i, a) in primary.iter().enumerate() {
        for (j, b) in secondary.iter().enumerate() {
            dists[[i, j]] = a.distance(b);
        }
    }
    dists
}

/// Greedy nearest-first assignment of pairs within `tolerance`.
///
/// Candidates are taken in order of increasing distance, ties broken by
/// primary then secondary index. Each detection joins at most one pair.
pub fn greedy_assignment(dists: &Array2<f64>, tolerance: f64) -> PairAssignment {
    let (rows, cols) = dists.dim();

    let mut candidates: Vec<(f64, usize, usize)> = dists
        .indexed_iter()
        .filter(|&(_, &d)| d <= tolerance)
        .map(|((i, j), &d)| (d, i, j))
        .collect();
    candidates.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut row_used = vec![false; rows];
    let mut col_used = vec![false; cols];
    let mut matches = Vec::new();
    for (_, i, j) in candidates {
        if row_used[i] || col_used[j] {
            continue;
        }
        row_used[i] = true;
        col_used[j] = true;
        matches.push((i, j));
    }
    matches.sort_unstable();

    PairAssignment {
        matches,
        unmatched_primary: (0..rows).filter(|&i| !row_used[i]).collect(),
        unmatched_secondary: (0..cols).filter(|&j| !col_used[j]).collect(),
    }
}

#[derive(Debug, Clone)]
pub struct DetectionMerger {
    pair: MergePair,
}

impl DetectionMerger {
    pub fn new(pair: MergePair) -> Result<Self> {
        if !pair.tolerance.is_finite() || pair.tolerance < 0.0 {
            return Err(FusionError::InvalidConfig(format!(
                "merge tolerance must be a non-negative number, got {}",
                pair.tolerance
            )));
        }
        if pair.primary == pair.secondary {
            return Err(FusionError::InvalidConfig(format!(
                "merge pair names sensor `{}` twice",
                pair.primary
            )));
        }
        Ok(Self { pair })
    }

    pub fn pair(&self) -> &MergePair {
        &self.pair
    }

    /// Average one matched pair into a single detection.
    fn merged(&self, a: &GlobalDetection, b: &GlobalDetection) -> GlobalDetection {
        let mut local = a.local.clone();
        if let Some(name) = &self.pair.merged_sensor {
            local.sensor = name.clone();
        }
        GlobalDetection {
            local,
            position: nalgebra::center(&a.position, &b.position),
            velocity: (a.velocity + b.velocity) * 0.5,
        }
    }

    /// Merge the pair's detections in a frame.
    ///
    /// Detections from other sensors come first in their original order,
    /// followed by unmatched primary, unmatched secondary and merged
    /// detections. Returns the new frame and the number of merged pairs.
    pub fn merge(&self, frame: Vec<GlobalDetection>) -> (Vec<GlobalDetection>, usize) {
        let mut primary = Vec::new();
        let mut secondary = Vec::new();
        let mut out = Vec::with_capacity(frame.len());
        for det in frame {
            if det.sensor() == self.pair.primary {
                primary.push(det);
            } else if det.sensor() == self.pair.secondary {
                secondary.push(det);
            } else {
                out.push(det);
            }
        }

        let assignment = greedy_assignment(&distance_matrix(&primary, &secondary), self.pair.tolerance);

        let merged: Vec<GlobalDetection> = assignment
            .matches
            .iter()
            .map(|&(i, j)| self.merged(&primary[i], &secondary[j]))
            .collect();
        let count = merged.len();
        if count > 0 {
            debug!(
                primary = %self.pair.primary,
                secondary = %self.pair.secondary,
                count,
                "merged overlapping detections"
            );
        }

        out.extend(assignment.unmatched_primary.iter().map(|&i| primary[i].clone()));
        out.extend(assignment.unmatched_secondary.iter().map(|&j| secondary[j].clone()));
        out.extend(merged);
        (out, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::Detection;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point2, Vector2};

    fn gdet(id: i64, sensor: &str, x: f64, y: f64, vx: f64, vy: f64) -> GlobalDetection {
        let local = Detection::new(id, sensor, "car", Point2::new(0.0, 0.0), Vector2::zeros());
        GlobalDetection {
            local,
            position: Point2::new(x, y),
            velocity: Vector2::new(vx, vy),
        }
    }

    fn merger() -> DetectionMerger {
        DetectionMerger::new(MergePair::new("A1, ttyS0", "A1, ttyS3")).unwrap()
    }

    #[test]
    fn test_merge_averages_pair() {
        let frame = vec![
            gdet(4, "A1, ttyS0", 10.0, 10.0, -4.0, 1.0),
            gdet(9, "A1, ttyS3", 11.0, 11.0, -6.0, 0.0),
        ];
        let (out, count) = merger().merge(frame);
        assert_eq!(count, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].local_id(), 4);
        assert_eq!(out[0].sensor(), "A1, ttyS0");
        assert_abs_diff_eq!(out[0].position.x, 10.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[0].position.y, 10.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[0].velocity.x, -5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[0].velocity.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_beyond_tolerance_never_merges() {
        let frame = vec![
            gdet(1, "A1, ttyS0", 0.0, 0.0, -1.0, 0.0),
            gdet(2, "A1, ttyS3", 2.0001, 0.0, -1.0, 0.0),
        ];
        let (out, count) = merger().merge(frame);
        assert_eq!(count, 0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let frame = vec![
            gdet(1, "A1, ttyS0", 0.0, 0.0, -1.0, 0.0),
            gdet(2, "A1, ttyS3", 0.0, 2.0, -1.0, 0.0),
        ];
        assert_eq!(merger().merge(frame).1, 1);
    }

    #[test]
    fn test_one_side_empty_passes_through() {
        let frame = vec![
            gdet(1, "A1, ttyS0", 0.0, 0.0, -1.0, 0.0),
            gdet(2, "A1, ttyS0", 50.0, 0.0, -1.0, 0.0),
            gdet(3, "B, ttyS2", 0.5, 0.0, -1.0, 0.0),
        ];
        let (out, count) = merger().merge(frame.clone());
        assert_eq!(count, 0);
        assert_eq!(out.len(), 3);
        // other sensors first, then unmatched primary in order
        assert_eq!(out[0], frame[2]);
        assert_eq!(out[1], frame[0]);
        assert_eq!(out[2], frame[1]);
    }

    #[test]
    fn test_cluster_is_matched_one_to_one() {
        // three mutually close detections: only the nearest pair merges
        let frame = vec![
            gdet(1, "A1, ttyS0", 0.0, 0.0, -1.0, 0.0),
            gdet(2, "A1, ttyS3", 0.5, 0.0, -1.0, 0.0),
            gdet(3, "A1, ttyS3", 1.5, 0.0, -1.0, 0.0),
        ];
        let (out, count) = merger().merge(frame);
        assert_eq!(count, 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].local_id(), 3);
        assert_abs_diff_eq!(out[1].position.x, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_greedy_prefers_nearest() {
        // a0-b0 = 1.0, a0-b1 = 0.2, a1-b1 = 0.3
        let dists = ndarray::arr2(&[[1.0, 0.2], [5.0, 0.3]]);
        let assignment = greedy_assignment(&dists, 2.0);
        assert_eq!(assignment.matches, vec![(0, 1)]);
        assert_eq!(assignment.unmatched_primary, vec![1]);
        assert_eq!(assignment.unmatched_secondary, vec![0]);
    }

    #[test]
    fn test_merged_sensor_override() {
        let merger = DetectionMerger::new(
            MergePair::new("A1, ttyS0", "A1, ttyS3").with_merged_sensor("A1"),
        )
        .unwrap();
        let frame = vec![
            gdet(4, "A1, ttyS0", 10.0, 10.0, -4.0, 1.0),
            gdet(9, "A1, ttyS3", 10.0, 10.0, -4.0, 1.0),
        ];
        let (out, _) = merger.merge(frame);
        assert_eq!(out[0].sensor(), "A1");
        assert_eq!(out[0].local_id(), 4);
    }

    #[test]
    fn test_invalid_pairs() {
        assert!(DetectionMerger::new(MergePair::new("A", "A")).is_err());
        assert!(DetectionMerger::new(MergePair::new("A", "B").with_tolerance(-1.0)).is_err());
        assert!(DetectionMerger::new(MergePair::new("A", "B").with_tolerance(f64::NAN)).is_err());
    }
}
