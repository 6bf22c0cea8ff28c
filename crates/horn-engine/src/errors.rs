use horn_format::ExportError;
use horn_ops::OpError;

/// Errors surfaced by a horn session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Input validation failed; the current generation is unchanged.
    #[error(transparent)]
    Op(#[from] OpError),

    #[error("geometry kernel unavailable after {attempts} attempts")]
    KernelUnavailable { attempts: u32 },

    /// Neither the kernel path nor the direct lathe produced a mesh.
    #[error("horn generation failed: {0}")]
    GenerationFailed(OpError),

    #[error("no horn has been generated yet")]
    NoCurrentShape,

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}
