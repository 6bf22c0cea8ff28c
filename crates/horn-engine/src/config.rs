use std::time::Duration;

use horn_ops::{OpError, DEFAULT_RADIAL_SUBDIVISIONS, MIN_RADIAL_SUBDIVISIONS};
use horn_types::MeshTolerance;
use serde::{Deserialize, Serialize};

/// How long to wait for the geometry kernel to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds.
    pub interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            interval_ms: 100,
        }
    }
}

impl RetryPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Settings for meshing, export and kernel startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub tolerance: MeshTolerance,
    /// Angular steps of the direct lathe.
    pub radial_subdivisions: u32,
    /// Chord tolerance handed to the kernel's STL writer.
    pub export_tolerance: f64,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tolerance: MeshTolerance::default(),
            radial_subdivisions: DEFAULT_RADIAL_SUBDIVISIONS,
            export_tolerance: 0.01,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject settings the mesh providers cannot honour.
    pub fn validate(&self) -> Result<(), OpError> {
        if !self.tolerance.is_valid() {
            return Err(OpError::invalid(format!(
                "mesh tolerances must be positive, got linear={} angular={}",
                self.tolerance.linear, self.tolerance.angular
            )));
        }
        if self.radial_subdivisions < MIN_RADIAL_SUBDIVISIONS {
            return Err(OpError::invalid(format!(
                "radialSubdivisions must be at least {MIN_RADIAL_SUBDIVISIONS}, got {}",
                self.radial_subdivisions
            )));
        }
        if !(self.export_tolerance.is_finite() && self.export_tolerance > 0.0) {
            return Err(OpError::invalid(format!(
                "exportTolerance must be positive, got {}",
                self.export_tolerance
            )));
        }
        Ok(())
    }
}
