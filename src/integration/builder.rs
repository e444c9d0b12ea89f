//! Builder for creating Detection objects.

use nalgebra::{Point2, Vector2};

use crate::fusion::Detection;
use crate::integration::frame::{RawDetection, UNKNOWN_CATEGORY};

/// Builder for sensor-local [`Detection`]s and their raw wire form.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    id: i64,
    sensor: String,
    category: Option<String>,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sensor-assigned object id.
    pub fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Set the reporting sensor name.
    pub fn sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = sensor.into();
        self
    }

    /// Set the vehicle category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the local position (x along the boresight).
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the local velocity.
    pub fn velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::new(
            self.id,
            self.sensor,
            self.category.unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            Point2::new(self.x, self.y),
            Vector2::new(self.vx, self.vy),
        )
    }

    /// Build the wire form with every field present.
    pub fn build_raw(self) -> RawDetection {
        RawDetection::from(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .id(12)
            .sensor("B, ttyS2")
            .category("truck")
            .position(60.0, 1.5)
            .velocity(-8.0, 0.1)
            .build();

        assert_eq!(det.local_id, 12);
        assert_eq!(det.category, "truck");
        assert_eq!(det.position, Point2::new(60.0, 1.5));
    }

    #[test]
    fn test_raw_round_trip() {
        let builder = DetectionBuilder::new().id(3).sensor("A1").position(1.0, 2.0).velocity(-1.0, 0.0);
        let raw = builder.clone().build_raw();
        assert_eq!(raw.validate().unwrap(), builder.build());
    }
}
