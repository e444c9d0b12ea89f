use crate::error::{FusionError, Result};
use crate::tracker::region::RegionOfInterest;
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Accepts finalized tracks that are long enough and end inside the region.
#[derive(Debug, Clone)]
pub struct TrackValidator {
    min_length: f64,
    region: RegionOfInterest,
}

impl TrackValidator {
    pub fn new(min_length: f64, region: RegionOfInterest) -> Result<Self> {
        if !min_length.is_finite() || min_length < 0.0 {
            return Err(FusionError::InvalidConfig(format!(
                "min_length must be a non-negative number, got {min_length}"
            )));
        }
        Ok(Self { min_length, region })
    }

    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    pub fn region(&self) -> &RegionOfInterest {
        &self.region
    }

    pub fn is_long_enough(&self, track: &Track) -> bool {
        track.length() >= self.min_length
    }

    pub fn ends_in_region(&self, track: &Track) -> bool {
        track
            .last_position()
            .is_some_and(|p| self.region.contains(p))
    }

    pub fn is_valid(&self, track: &Track) -> bool {
        self.is_long_enough(track) && self.ends_in_region(track)
    }

    pub fn classify(&self, track: &Track) -> TrackState {
        if self.is_valid(track) {
            TrackState::Valid
        } else {
            TrackState::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{Detection, GlobalDetection};
    use crate::tracker::track::TrackKey;
    use nalgebra::{Point2, Vector2};

    fn track_through(points: &[[f64; 2]]) -> Track {
        let det = GlobalDetection {
            local: Detection::new(1, "B", "car", Point2::origin(), Vector2::zeros()),
            position: Point2::new(points[0][0], points[0][1]),
            velocity: Vector2::new(-1.0, 0.0),
        };
        let mut track = Track::new(TrackKey::of(&det), 0.0, &det, "B");
        for (i, p) in points.iter().enumerate().skip(1) {
            track.add_measurement(i as f64, Point2::new(p[0], p[1]), Vector2::new(-1.0, 0.0));
        }
        track
    }

    fn validator() -> TrackValidator {
        let roi = RegionOfInterest::from_coords(&[[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]])
            .unwrap();
        TrackValidator::new(100.0, roi).unwrap()
    }

    #[test]
    fn test_both_conditions_required() {
        let v = validator();
        let long_inside = track_through(&[[-100.0, 10.0], [10.0, 10.0]]);
        let long_outside = track_through(&[[-100.0, 10.0], [30.0, 10.0]]);
        let short_inside = track_through(&[[0.0, 10.0], [10.0, 10.0]]);

        assert_eq!(v.classify(&long_inside), TrackState::Valid);
        assert_eq!(v.classify(&long_outside), TrackState::Invalid);
        assert_eq!(v.classify(&short_inside), TrackState::Invalid);
    }

    #[test]
    fn test_min_length_is_inclusive() {
        let v = validator();
        let exact = track_through(&[[-90.0, 10.0], [10.0, 10.0]]);
        assert!(v.is_long_enough(&exact));
        assert!(v.is_valid(&exact));
    }

    #[test]
    fn test_invalid_min_length() {
        let roi = RegionOfInterest::from_coords(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap();
        assert!(TrackValidator::new(-1.0, roi).is_err());
    }
}
