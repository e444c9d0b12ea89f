//! Validation polygon in global coordinates.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Points closer than this to an edge count as on the boundary.
const BOUNDARY_EPS: f64 = 1e-6;

/// Region of interest: a simple polygon given by its ordered vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct RegionOfInterest {
    vertices: Vec<Point2<f64>>,
}

impl RegionOfInterest {
    pub fn new(vertices: Vec<Point2<f64>>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(FusionError::DegenerateRegion {
                vertices: vertices.len(),
            });
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(FusionError::InvalidConfig(
                "region of interest has a non-finite vertex".to_string(),
            ));
        }
        Ok(Self { vertices })
    }

    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self> {
        Self::new(coords.iter().map(|&[x, y]| Point2::new(x, y)).collect())
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Boundary-inclusive point-in-polygon test.
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        if self.edges().any(|(a, b)| on_segment(p, a, b)) {
            return true;
        }
        // Ray casting
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
        }
        inside
    }
}

fn on_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> bool {
    let ab = *b - *a;
    let ap = *p - *a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return ap.norm() <= BOUNDARY_EPS;
    }
    let t = (ap.dot(&ab) / len2).clamp(0.0, 1.0);
    (ap - ab * t).norm() <= BOUNDARY_EPS
}

impl TryFrom<Vec<[f64; 2]>> for RegionOfInterest {
    type Error = FusionError;

    fn try_from(coords: Vec<[f64; 2]>) -> Result<Self> {
        Self::from_coords(&coords)
    }
}

impl From<RegionOfInterest> for Vec<[f64; 2]> {
    fn from(region: RegionOfInterest) -> Self {
        region.vertices.iter().map(|v| [v.x, v.y]).collect()
    }
}
