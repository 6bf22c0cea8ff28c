use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Flare curve used to derive the horn wall radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Exponential,
    Tractrix,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Exponential => f.write_str("exponential"),
            ProfileKind::Tractrix => f.write_str("tractrix"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(ProfileKind::Exponential),
            "tractrix" => Ok(ProfileKind::Tractrix),
            other => Err(ParameterError::new(format!("unknown horn type '{other}'"))),
        }
    }
}

/// A rejected acoustic parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{reason}")]
pub struct ParameterError {
    pub reason: String,
}

impl ParameterError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Raw design inputs as supplied by a form or a config file.
///
/// Diameters are in millimetres. `horn_length` is ignored when
/// `auto_length` is set; the length is then estimated from
/// `target_frequency` and the two radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HornInputs {
    pub throat_diameter: f64,
    pub mouth_diameter: f64,
    pub target_frequency: f64,
    pub horn_length: f64,
    pub segments: u32,
    pub horn_type: ProfileKind,
    pub auto_length: bool,
}

impl Default for HornInputs {
    fn default() -> Self {
        Self {
            throat_diameter: 25.0,
            mouth_diameter: 300.0,
            target_frequency: 100.0,
            horn_length: 300.0,
            segments: 32,
            horn_type: ProfileKind::Exponential,
            auto_length: false,
        }
    }
}

impl HornInputs {
    pub fn throat_radius(&self) -> f64 {
        self.throat_diameter / 2.0
    }

    pub fn mouth_radius(&self) -> f64 {
        self.mouth_diameter / 2.0
    }
}

/// Validated input to one generation cycle.
///
/// Construction enforces `0 < throat_radius < mouth_radius`,
/// `length > 0` and `sample_count >= 2`; a value of this type is
/// always usable by the profile generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcousticParameters {
    throat_radius: f64,
    mouth_radius: f64,
    length: f64,
    kind: ProfileKind,
    sample_count: u32,
}

impl AcousticParameters {
    pub fn new(
        throat_radius: f64,
        mouth_radius: f64,
        length: f64,
        kind: ProfileKind,
        sample_count: u32,
    ) -> Result<Self, ParameterError> {
        if !throat_radius.is_finite() || throat_radius <= 0.0 {
            return Err(ParameterError::new(format!(
                "throat radius must be positive, got {throat_radius}"
            )));
        }
        if !mouth_radius.is_finite() || mouth_radius <= throat_radius {
            return Err(ParameterError::new(format!(
                "mouth radius ({mouth_radius}) must be larger than throat radius ({throat_radius})"
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(ParameterError::new(format!(
                "horn length must be positive, got {length}"
            )));
        }
        if sample_count < 2 {
            return Err(ParameterError::new(format!(
                "sample count must be at least 2, got {sample_count}"
            )));
        }
        Ok(Self {
            throat_radius,
            mouth_radius,
            length,
            kind,
            sample_count,
        })
    }

    pub fn throat_radius(&self) -> f64 {
        self.throat_radius
    }

    pub fn mouth_radius(&self) -> f64 {
        self.mouth_radius
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// ln(mouth / throat), the total expansion in nepers.
    pub fn expansion_log(&self) -> f64 {
        (self.mouth_radius / self.throat_radius).ln()
    }
}
