use serde::{Deserialize, Serialize};

/// Opaque handle to a solid in the geometry kernel.
/// NEVER persisted. Valid only for the current kernel session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient identifier for a wire or face held by the kernel.
/// Consumed by the next construction step; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelId(pub u64);

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("wire is not closed: {reason}")]
    WireNotClosed { reason: String },

    #[error("face construction failed: {reason}")]
    FaceFailed { reason: String },

    #[error("revolution failed: {reason}")]
    RevolveFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("export failed: {reason}")]
    ExportFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },
}

/// A straight edge between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: [f64; 3],
    pub end: [f64; 3],
}

impl LineSegment {
    pub fn new(start: [f64; 3], end: [f64; 3]) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }
}

/// Triangulation of a single kernel face.
///
/// `positions` are already in world space. `triangles` follow the
/// underlying surface's parametric orientation; when `reversed` is set the
/// face uses the surface with opposite sense and the winding must be
/// flipped before the triangles face outward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceTriangulation {
    pub positions: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub reversed: bool,
}

impl FaceTriangulation {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() || self.positions.is_empty()
    }
}

pub(crate) fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
