//! Per-frame rejection of detections that cannot belong to an approaching vehicle.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fusion::detection::Detection;

/// Thresholds for [`DetectionFilter`]. Bounds are exclusive: a component
/// whose absolute value reaches the bound is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub excluded_categories: BTreeSet<String>,
    /// Max |speed| along the local (x, y) axes.
    pub max_speed: (f64, f64),
    /// Max |position| along the local (x, y) axes.
    pub max_position: (f64, f64),
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_categories: BTreeSet::from(["bicycle".to_string()]),
            max_speed: (50.0, 3.0),
            max_position: (200.0, 200.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetectionFilter {
    config: FilterConfig,
}

impl DetectionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Whether a single detection survives the filter.
    pub fn accepts(&self, det: &Detection) -> bool {
        let cfg = &self.config;
        !cfg.excluded_categories.contains(&det.category)
            // receding along the boresight
            && det.velocity.x <= 0.0
            && det.velocity.x.abs() < cfg.max_speed.0
            && det.velocity.y.abs() < cfg.max_speed.1
            && det.position.x.abs() < cfg.max_position.0
            && det.position.y.abs() < cfg.max_position.1
    }

    /// Return the accepted detections of a frame. The input is not modified.
    pub fn apply(&self, detections: &[Detection]) -> Vec<Detection> {
        detections
            .iter()
            .filter(|d| self.accepts(d))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point2, Vector2};

    fn det(category: &str, x: f64, y: f64, vx: f64, vy: f64) -> Detection {
        Detection::new(3, "A1", category, Point2::new(x, y), Vector2::new(vx, vy))
    }

    #[test]
    fn test_default_filter() {
        let filter = DetectionFilter::default();
        let frame = vec![
            det("car", 50.0, 1.0, -10.0, 0.5),     // kept
            det("bicycle", 50.0, 1.0, -3.0, 0.0),  // excluded category
            det("car", 50.0, 1.0, 0.1, 0.0),       // receding
            det("truck", 50.0, 1.0, -50.0, 0.0),   // x speed at bound
            det("car", 50.0, 1.0, -10.0, -3.5),    // y speed
            det("car", 200.0, 1.0, -10.0, 0.0),    // x position at bound
            det("car", 20.0, -250.0, -10.0, 0.0),  // y position
            det("truck", 0.0, 0.0, 0.0, 0.0),      // stationary is kept
        ];

        let kept = filter.apply(&frame);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], frame[0]);
        assert_eq!(kept[1], frame[7]);
        // pure: input untouched
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn test_custom_categories() {
        let filter = DetectionFilter::new(FilterConfig {
            excluded_categories: BTreeSet::from(["pedestrian".to_string()]),
            ..FilterConfig::default()
        });
        assert!(filter.accepts(&det("bicycle", 1.0, 1.0, -1.0, 0.0)));
        assert!(!filter.accepts(&det("pedestrian", 1.0, 1.0, -1.0, 0.0)));
    }

    #[test]
    fn test_empty_frame() {
        assert!(DetectionFilter::default().apply(&[]).is_empty());
    }
}
