//! Detection values in the sensor-local and the shared global frame.

use nalgebra::{Point2, Vector2};

/// One sensor measurement in sensor-local coordinates.
///
/// The local x axis is the sensor boresight; a negative x velocity means the
/// object approaches the sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Sensor-assigned object id, persistent across that sensor's frames.
    pub local_id: i64,
    pub sensor: String,
    pub category: String,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
}

impl Detection {
    pub fn new(
        local_id: i64,
        sensor: impl Into<String>,
        category: impl Into<String>,
        position: Point2<f64>,
        velocity: Vector2<f64>,
    ) -> Self {
        Self {
            local_id,
            sensor: sensor.into(),
            category: category.into(),
            position,
            velocity,
        }
    }
}

/// A detection carried into the global frame.
///
/// The sensor-local measurement is kept untouched next to the transformed
/// position and velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDetection {
    pub local: Detection,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
}

impl GlobalDetection {
    pub fn local_id(&self) -> i64 {
        self.local.local_id
    }

    pub fn sensor(&self) -> &str {
        &self.local.sensor
    }

    pub fn category(&self) -> &str {
        &self.local.category
    }

    /// Euclidean distance between the global positions of two detections.
    pub fn distance(&self, other: &GlobalDetection) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}
