use horn_types::MeshError;

/// Errors while encoding, decoding or writing an exchange file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("mesh has no triangles")]
    EmptyMesh,

    #[error("mesh is malformed: {0}")]
    InvalidMesh(#[from] MeshError),

    #[error("kernel export failed: {0}")]
    KernelExport(String),

    #[error("STL parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("failed to write {path}: {reason}")]
    Io { path: String, reason: String },
}
