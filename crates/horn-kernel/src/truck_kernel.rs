//! Geometry kernel backed by the truck B-rep library.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use crate::wire::check_closed_loop;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Solid, Wire};
use truck_modeling::{InnerSpace, Point3, Rad, Vector3};

/// Vertices closer than this to the revolution axis lie on it.
const AXIS_TOLERANCE: f64 = 1e-9;

/// Chord used to measure a new solid's orientation, relative to its extent.
const ORIENTATION_CHORD: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
    /// Closed wires awaiting a face.
    wires: HashMap<u64, Wire>,
    /// Planar faces awaiting revolution.
    faces: HashMap<u64, Face>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
            wires: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub fn get_solid(&self, handle: &KernelSolidHandle) -> Option<&Solid> {
        self.solids.get(&handle.id())
    }

    /// Number of solids currently held.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn solid_or_err(&self, handle: &KernelSolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

fn on_axis(edge: &Edge, origin: Point3, axis: Vector3) -> bool {
    let off_axis = |p: Point3| (p - origin).cross(axis).magnitude();
    off_axis(edge.front().point()) <= AXIS_TOLERANCE
        && off_axis(edge.back().point()) <= AXIS_TOLERANCE
}

/// Open a closed boundary at its edges lying on the axis.
///
/// The returned wire starts and ends on the axis. `None` if no edge lies on
/// the axis; an error if the on-axis edges are not one contiguous run.
fn open_at_axis(
    boundary: &Wire,
    origin: Point3,
    axis: Vector3,
) -> Result<Option<Wire>, KernelError> {
    let mut edges: Vec<Edge> = boundary.edge_iter().cloned().collect();
    let Some(first) = edges.iter().position(|e| on_axis(e, origin, axis)) else {
        return Ok(None);
    };
    edges.rotate_left(first);

    let leading = edges
        .iter()
        .take_while(|e| on_axis(e, origin, axis))
        .count();
    edges.drain(..leading);
    while edges.last().is_some_and(|e| on_axis(e, origin, axis)) {
        edges.pop();
    }

    if edges.is_empty() || edges.iter().any(|e| on_axis(e, origin, axis)) {
        return Err(KernelError::RevolveFailed {
            reason: "profile must meet the axis along one run of edges".to_string(),
        });
    }
    Ok(Some(Wire::from_iter(edges)))
}

impl Kernel for TruckKernel {
    fn make_wire(&mut self, segments: &[LineSegment]) -> Result<KernelId, KernelError> {
        check_closed_loop(segments)?;

        // Create all vertices first so edges share endpoints.
        let n = segments.len();
        let vertices: Vec<_> = segments
            .iter()
            .map(|seg| builder::vertex(point(seg.start)))
            .collect();
        let edges: Vec<Edge> = (0..n)
            .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
            .collect();
        let wire = Wire::from_iter(edges);

        if !wire.is_closed() {
            return Err(KernelError::WireNotClosed {
                reason: "truck reports the assembled wire as open".to_string(),
            });
        }

        let id = self.alloc_id();
        self.wires.insert(id.0, wire);
        Ok(id)
    }

    fn make_planar_face(&mut self, wire: KernelId) -> Result<KernelId, KernelError> {
        let truck_wire = self
            .wires
            .remove(&wire.0)
            .ok_or(KernelError::EntityNotFound { id: wire })?;

        let face = builder::try_attach_plane(&[truck_wire]).map_err(|e| KernelError::FaceFailed {
            reason: format!("failed to create planar face: {e}"),
        })?;

        let id = self.alloc_id();
        self.faces.insert(id.0, face);
        Ok(id)
    }

    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let truck_face = self
            .faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;

        let origin = point(axis_origin);
        let axis = Vector3::new(axis_direction[0], axis_direction[1], axis_direction[2]);
        if axis.magnitude() < 1e-12 {
            return Err(KernelError::RevolveFailed {
                reason: "revolve axis has zero length".to_string(),
            });
        }
        let axis = axis.normalize();

        let boundary = truck_face
            .boundaries()
            .into_iter()
            .next()
            .ok_or_else(|| KernelError::RevolveFailed {
                reason: "face has no boundary wire".to_string(),
            })?;
        let extent = boundary
            .vertex_iter()
            .map(|v| (v.point() - origin).magnitude())
            .fold(0.0, f64::max);
        let profile = open_at_axis(&boundary, origin, axis)?;

        // A profile with an edge on the axis is swept as a cone so the axis
        // edge does not become a degenerate face.
        let swept = catch_unwind(AssertUnwindSafe(|| match &profile {
            Some(wire) => Solid::try_new(vec![builder::cone(wire, axis, Rad(angle))])
                .map_err(|e| e.to_string()),
            None => Ok(builder::rsweep(&truck_face, origin, axis, Rad(angle))),
        }))
        .map_err(|_| KernelError::RevolveFailed {
            reason: "truck sweep panicked".to_string(),
        })?;
        let mut solid = swept.map_err(|reason| KernelError::RevolveFailed {
            reason: format!("revolution is not a closed solid: {reason}"),
        })?;

        if solid.boundaries().is_empty() {
            return Err(KernelError::RevolveFailed {
                reason: "revolution produced a solid without boundary shells".to_string(),
            });
        }

        let volume = tessellation::solid_signed_volume(&solid, extent * ORIENTATION_CHORD)
            .ok_or_else(|| KernelError::RevolveFailed {
                reason: "truck triangulation panicked while orienting the solid".to_string(),
            })?;
        if volume < 0.0 {
            solid.not();
        }

        Ok(self.store_solid(solid))
    }

    fn triangulate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<Vec<FaceTriangulation>, KernelError> {
        tessellation::triangulate_solid(self.solid_or_err(solid)?, tolerance)
    }

    fn export_stl(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<Vec<u8>, KernelError> {
        tessellation::write_solid_stl(self.solid_or_err(solid)?, tolerance)
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    /// Closed trapezoid in the XY plane touching the X axis.
    fn frustum_loop() -> Vec<LineSegment> {
        let pts = [
            [0.0, 1.0, 0.0],
            [2.0, 3.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
        ];
        (0..pts.len())
            .map(|i| LineSegment::new(pts[i], pts[(i + 1) % pts.len()]))
            .collect()
    }

    #[test]
    fn test_truck_kernel_wire_face_revolve() {
        let mut kernel = TruckKernel::new();

        let wire = kernel.make_wire(&frustum_loop()).unwrap();
        let face = kernel.make_planar_face(wire).unwrap();
        let handle = kernel
            .revolve_face(face, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], TAU)
            .unwrap();

        let solid = kernel.get_solid(&handle).unwrap();
        assert_eq!(solid.boundaries().len(), 1);
        assert_eq!(kernel.solid_count(), 1);

        kernel.release(&handle);
        assert_eq!(kernel.solid_count(), 0);
    }

    #[test]
    fn test_truck_kernel_rejects_open_wire() {
        let mut kernel = TruckKernel::new();
        let mut segs = frustum_loop();
        segs[3].end = [0.0, 0.5, 0.0];

        let err = kernel.make_wire(&segs).unwrap_err();
        assert!(matches!(err, KernelError::WireNotClosed { .. }));
    }

    #[test]
    fn test_truck_kernel_wire_and_face_are_consumed() {
        let mut kernel = TruckKernel::new();
        let wire = kernel.make_wire(&frustum_loop()).unwrap();
        let face = kernel.make_planar_face(wire).unwrap();

        assert!(matches!(
            kernel.make_planar_face(wire),
            Err(KernelError::EntityNotFound { .. })
        ));

        kernel
            .revolve_face(face, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], TAU)
            .unwrap();
        assert!(matches!(
            kernel.revolve_face(face, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], TAU),
            Err(KernelError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn test_truck_kernel_rejects_zero_axis() {
        let mut kernel = TruckKernel::new();
        let wire = kernel.make_wire(&frustum_loop()).unwrap();
        let face = kernel.make_planar_face(wire).unwrap();

        let err = kernel
            .revolve_face(face, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], TAU)
            .unwrap_err();
        assert!(matches!(err, KernelError::RevolveFailed { .. }));
    }

    fn revolved_frustum(kernel: &mut TruckKernel) -> KernelSolidHandle {
        let wire = kernel.make_wire(&frustum_loop()).unwrap();
        let face = kernel.make_planar_face(wire).unwrap();
        kernel
            .revolve_face(face, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], TAU)
            .unwrap()
    }

    /// Signed volume of the facets in a binary STL buffer.
    fn stl_signed_volume(bytes: &[u8]) -> f64 {
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        assert_eq!(bytes.len(), 84 + count * 50);
        (0..count)
            .map(|i| {
                let at = 84 + i * 50 + 12;
                let v: Vec<f64> = (0..9)
                    .map(|k| {
                        let o = at + k * 4;
                        f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
                            as f64
                    })
                    .collect();
                let (a, b, c) = (&v[0..3], &v[3..6], &v[6..9]);
                let bxc = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                (a[0] * bxc[0] + a[1] * bxc[1] + a[2] * bxc[2]) / 6.0
            })
            .sum()
    }

    /// Cone frustum with radii 1 and 3 over length 2.
    fn frustum_volume() -> f64 {
        std::f64::consts::PI * 2.0 / 3.0 * (1.0 + 3.0 + 9.0)
    }

    #[test]
    fn test_truck_kernel_axis_edge_leaves_no_face() {
        let mut kernel = TruckKernel::new();
        let handle = revolved_frustum(&mut kernel);
        let solid = kernel.get_solid(&handle).unwrap();
        // Throat disk, wall and mouth disk.
        assert_eq!(solid.boundaries()[0].face_iter().count(), 3);
    }

    #[test]
    fn test_truck_kernel_solid_is_outward() {
        let mut kernel = TruckKernel::new();
        let handle = revolved_frustum(&mut kernel);
        let volume =
            tessellation::solid_signed_volume(kernel.get_solid(&handle).unwrap(), 0.01).unwrap();
        assert_relative_eq!(volume, frustum_volume(), max_relative = 0.02);
    }

    #[test]
    fn test_truck_kernel_triangulation_indices_in_range() {
        let mut kernel = TruckKernel::new();
        let handle = revolved_frustum(&mut kernel);

        let faces = kernel.triangulate(&handle, 0.05).unwrap();
        assert_eq!(faces.len(), 3);
        let mut volume = 0.0;
        for face in &faces {
            assert!(!face.is_empty());
            for tri in &face.triangles {
                for &i in tri {
                    assert!((i as usize) < face.positions.len());
                }
                // Wind each triangle the way the face is oriented.
                let (a, b, c) = if face.reversed {
                    (tri[0], tri[2], tri[1])
                } else {
                    (tri[0], tri[1], tri[2])
                };
                let [a, b, c] = [a, b, c].map(|i| face.positions[i as usize]);
                let bxc = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                volume += (a[0] * bxc[0] + a[1] * bxc[1] + a[2] * bxc[2]) / 6.0;
            }
        }
        assert_relative_eq!(volume, frustum_volume(), max_relative = 0.05);
    }

    #[test]
    fn test_truck_kernel_exports_outward_stl() {
        let mut kernel = TruckKernel::new();
        let handle = revolved_frustum(&mut kernel);
        let bytes = kernel.export_stl(&handle, 0.01).unwrap();
        assert_relative_eq!(stl_signed_volume(&bytes), frustum_volume(), max_relative = 0.02);
    }

    #[test]
    fn test_truck_kernel_exports_inverted_solid_outward() {
        let mut kernel = TruckKernel::new();
        let handle = revolved_frustum(&mut kernel);
        let mut inverted = kernel.get_solid(&handle).unwrap().clone();
        inverted.not();
        assert!(tessellation::solid_signed_volume(&inverted, 0.05).unwrap() < 0.0);

        let inverted = kernel.store_solid(inverted);
        let bytes = kernel.export_stl(&inverted, 0.01).unwrap();
        assert!(stl_signed_volume(&bytes) > 0.0);
    }

    #[test]
    fn test_truck_kernel_unknown_solid() {
        let mut kernel = TruckKernel::new();
        let bogus = KernelSolidHandle(42);
        assert!(matches!(
            kernel.triangulate(&bogus, 0.1),
            Err(KernelError::EntityNotFound { id: KernelId(42) })
        ));
        assert!(kernel.export_stl(&bogus, 0.1).is_err());
    }
}
