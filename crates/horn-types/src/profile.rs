use serde::{Deserialize, Serialize};

/// One point of the horn wall: distance along the axis and wall radius, in millimetres.
///
/// The horn axis is the world X axis and the profile lies in the XY plane,
/// so a sample maps to the point `(axial_position, radius, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSample {
    pub axial_position: f64,
    pub radius: f64,
}

impl ProfileSample {
    pub fn new(axial_position: f64, radius: f64) -> Self {
        Self {
            axial_position,
            radius,
        }
    }

    /// Position of this sample in the profile plane.
    pub fn to_point(self) -> [f64; 3] {
        [self.axial_position, self.radius, 0.0]
    }

    /// The point on the axis at this sample's axial position.
    pub fn axis_point(self) -> [f64; 3] {
        [self.axial_position, 0.0, 0.0]
    }
}

/// Largest radius in a sample sequence, or 0 for an empty one.
pub fn max_radius(samples: &[ProfileSample]) -> f64 {
    samples.iter().map(|s| s.radius).fold(0.0, f64::max)
}
