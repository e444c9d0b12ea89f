//! Rotation of sensor-local measurements into the shared planar frame.

use nalgebra::{Point2, Rotation2, Vector2};
use tracing::warn;

use crate::fusion::detection::{Detection, GlobalDetection};
use crate::fusion::sensor::{SensorConfig, SensorRegistry};

/// Rigid transform from one sensor's local frame into the global frame.
///
/// The rotation angle is `90° - azimuth`: the azimuth is a compass bearing of
/// the boresight while the global frame measures angles counter-clockwise
/// from east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    rotation: Rotation2<f64>,
    origin: Vector2<f64>,
}

impl CoordinateTransformer {
    pub fn new(azimuth_deg: f64, easting: f64, northing: f64) -> Self {
        Self {
            rotation: Rotation2::new((90.0 - azimuth_deg).to_radians()),
            origin: Vector2::new(easting, northing),
        }
    }

    pub fn for_sensor(sensor: &SensorConfig) -> Self {
        Self::new(sensor.azimuth, sensor.easting, sensor.northing)
    }

    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    pub fn position_to_global(&self, local: &Point2<f64>) -> Point2<f64> {
        self.rotation * *local + self.origin
    }

    /// Velocities are only rotated, never translated.
    pub fn velocity_to_global(&self, local: &Vector2<f64>) -> Vector2<f64> {
        self.rotation * *local
    }

    pub fn position_to_local(&self, global: &Point2<f64>) -> Point2<f64> {
        self.rotation.inverse() * (*global - self.origin)
    }

    pub fn velocity_to_local(&self, global: &Vector2<f64>) -> Vector2<f64> {
        self.rotation.inverse() * *global
    }

    /// Produce a new global detection; `detection` itself is left as is.
    pub fn to_global(&self, detection: &Detection) -> GlobalDetection {
        GlobalDetection {
            local: detection.clone(),
            position: self.position_to_global(&detection.position),
            velocity: self.velocity_to_global(&detection.velocity),
        }
    }

    /// Transform a frame of detections using the registry.
    ///
    /// Detections whose sensor does not resolve to exactly one configuration
    /// are dropped. Returns the transformed detections and the drop count.
    pub fn transform_frame(
        detections: &[Detection],
        registry: &SensorRegistry,
    ) -> (Vec<GlobalDetection>, usize) {
        let mut out = Vec::with_capacity(detections.len());
        let mut dropped = 0;
        for det in detections {
            match registry.resolve(&det.sensor) {
                Ok(sensor) => out.push(Self::for_sensor(sensor).to_global(det)),
                Err(err) => {
                    warn!(id = det.local_id, sensor = %det.sensor, %err, "dropping detection");
                    dropped += 1;
                }
            }
        }
        (out, dropped)
    }
}
