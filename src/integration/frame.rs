//! Raw frame records as produced by the dataset reader.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};
use crate::fusion::Detection;

/// Category assigned to detections that carry none.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One detection as reported on the wire; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub radar: Option<String>,
    #[serde(default)]
    pub vehicle_class: Option<String>,
    #[serde(default)]
    pub x_pos: Option<f64>,
    #[serde(default)]
    pub y_pos: Option<f64>,
    #[serde(default)]
    pub x_speed: Option<f64>,
    #[serde(default)]
    pub y_speed: Option<f64>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(FusionError::FieldMissing { field })
}

impl RawDetection {
    /// Check required fields and build a sensor-local [`Detection`].
    ///
    /// Id, sensor name, position and velocity are required; a missing
    /// category becomes [`UNKNOWN_CATEGORY`].
    pub fn validate(&self) -> Result<Detection> {
        let local_id = required(self.id, "id")?;
        let sensor = required(self.radar.clone(), "radar")?;
        let x = required(self.x_pos, "x_pos")?;
        let y = required(self.y_pos, "y_pos")?;
        let vx = required(self.x_speed, "x_speed")?;
        let vy = required(self.y_speed, "y_speed")?;
        let category = self
            .vehicle_class
            .clone()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        Ok(Detection::new(
            local_id,
            sensor,
            category,
            Point2::new(x, y),
            Vector2::new(vx, vy),
        ))
    }
}

impl From<&Detection> for RawDetection {
    fn from(det: &Detection) -> Self {
        Self {
            id: Some(det.local_id),
            radar: Some(det.sensor.clone()),
            vehicle_class: Some(det.category.clone()),
            x_pos: Some(det.position.x),
            y_pos: Some(det.position.y),
            x_speed: Some(det.velocity.x),
            y_speed: Some(det.velocity.y),
        }
    }
}

/// The detections of one sampling instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub timestamp: f64,
    #[serde(default)]
    pub raw: Vec<RawDetection>,
}

impl RawFrame {
    pub fn new(timestamp: f64, raw: Vec<RawDetection>) -> Self {
        Self { timestamp, raw }
    }
}
