use crate::types::*;

/// Core geometry kernel trait: the wire/face/revolve/triangulate primitives
/// the horn pipeline builds on.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
pub trait Kernel {
    /// Assemble line segments into a single closed wire.
    ///
    /// Each segment must end exactly where the next one starts, and the
    /// last must end where the first starts.
    fn make_wire(&mut self, segments: &[LineSegment]) -> Result<KernelId, KernelError>;

    /// Build a planar face bounded by a previously created wire.
    /// The wire is consumed.
    fn make_planar_face(&mut self, wire: KernelId) -> Result<KernelId, KernelError>;

    /// Revolve a planar face around an axis. The face is consumed.
    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Triangulate every face of a solid with the given chord tolerance.
    fn triangulate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<Vec<FaceTriangulation>, KernelError>;

    /// Write a solid through the kernel's own binary STL writer.
    fn export_stl(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<Vec<u8>, KernelError>;

    /// Drop a solid that is no longer current.
    fn release(&mut self, solid: &KernelSolidHandle);
}
