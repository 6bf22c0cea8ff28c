use std::fmt;

use horn_types::ParameterError;
use serde::{Deserialize, Serialize};

/// Stage of solid construction, reported when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionStage {
    WireClosure,
    FaceConstruction,
    Revolution,
}

impl fmt::Display for ConstructionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionStage::WireClosure => f.write_str("wire closure"),
            ConstructionStage::FaceConstruction => f.write_str("face construction"),
            ConstructionStage::Revolution => f.write_str("revolution"),
        }
    }
}

/// Which provider produced a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshSource {
    /// Solid built and triangulated by the geometry kernel.
    KernelBacked,
    /// Profile lathed directly into triangles.
    DirectLathe,
}

impl fmt::Display for MeshSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshSource::KernelBacked => f.write_str("kernel"),
            MeshSource::DirectLathe => f.write_str("lathe"),
        }
    }
}

/// Errors from horn pipeline operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("geometry construction failed at {stage}: {reason}")]
    GeometryConstruction {
        stage: ConstructionStage,
        reason: String,
    },

    #[error("mesh extraction failed: {reason}")]
    MeshExtraction { reason: String },
}

impl OpError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        OpError::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub fn construction(stage: ConstructionStage, reason: impl fmt::Display) -> Self {
        OpError::GeometryConstruction {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Failures the lathe fallback can recover from.
    pub fn is_geometry_failure(&self) -> bool {
        matches!(
            self,
            OpError::GeometryConstruction { .. } | OpError::MeshExtraction { .. }
        )
    }
}

impl From<ParameterError> for OpError {
    fn from(e: ParameterError) -> Self {
        OpError::InvalidParameter { reason: e.reason }
    }
}
