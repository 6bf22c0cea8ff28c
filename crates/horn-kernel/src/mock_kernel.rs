//! Deterministic in-memory kernel for tests.
//!
//! Revolves the wire's polygon analytically with a fixed angular step and
//! reports one face per wire edge. Odd-numbered faces are reported in
//! reversed orientation with their raw triangles wound against the face,
//! so callers exercise their winding correction. Failures can be injected
//! at any stage.

use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::traits::Kernel;
use crate::types::*;
use crate::wire::{check_closed_loop, CLOSURE_TOLERANCE};

/// Angular steps used for a full revolution.
const FULL_TURN_STEPS: usize = 16;

/// Stage at which the mock should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Wire,
    Face,
    Revolve,
    Triangulate,
    Export,
}

#[derive(Debug, Clone)]
struct MockSolid {
    /// Loop vertices in wire order.
    outline: Vec<[f64; 3]>,
    origin: [f64; 3],
    axis: [f64; 3],
    angle: f64,
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    failure: Option<MockFailure>,
    wires: HashMap<u64, Vec<[f64; 3]>>,
    faces: HashMap<u64, Vec<[f64; 3]>>,
    solids: HashMap<u64, MockSolid>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            failure: None,
            wires: HashMap::new(),
            faces: HashMap::new(),
            solids: HashMap::new(),
        }
    }

    /// A kernel that fails at the given stage.
    pub fn failing_at(stage: MockFailure) -> Self {
        Self {
            failure: Some(stage),
            ..Self::new()
        }
    }

    /// Change the injected failure; `None` restores normal behaviour.
    pub fn set_failure(&mut self, stage: Option<MockFailure>) {
        self.failure = stage;
    }

    /// Number of solids currently held.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn fails_at(&self, stage: MockFailure) -> bool {
        self.failure == Some(stage)
    }

    fn solid_or_err(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_wire(&mut self, segments: &[LineSegment]) -> Result<KernelId, KernelError> {
        if self.fails_at(MockFailure::Wire) {
            return Err(KernelError::WireNotClosed {
                reason: "injected wire failure".to_string(),
            });
        }
        check_closed_loop(segments)?;
        let outline = segments.iter().map(|s| s.start).collect();
        let id = self.alloc_id();
        self.wires.insert(id.0, outline);
        Ok(id)
    }

    fn make_planar_face(&mut self, wire: KernelId) -> Result<KernelId, KernelError> {
        let outline = self
            .wires
            .remove(&wire.0)
            .ok_or(KernelError::EntityNotFound { id: wire })?;
        if self.fails_at(MockFailure::Face) {
            return Err(KernelError::FaceFailed {
                reason: "injected face failure".to_string(),
            });
        }
        let id = self.alloc_id();
        self.faces.insert(id.0, outline);
        Ok(id)
    }

    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let outline = self
            .faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        if self.fails_at(MockFailure::Revolve) {
            return Err(KernelError::RevolveFailed {
                reason: "injected revolve failure".to_string(),
            });
        }
        let axis = normalized(axis_direction).ok_or_else(|| KernelError::RevolveFailed {
            reason: "revolve axis has zero length".to_string(),
        })?;

        let handle = self.alloc_handle();
        self.solids.insert(
            handle.id(),
            MockSolid {
                outline,
                origin: axis_origin,
                axis,
                angle,
            },
        );
        Ok(handle)
    }

    fn triangulate(
        &mut self,
        solid: &KernelSolidHandle,
        _tolerance: f64,
    ) -> Result<Vec<FaceTriangulation>, KernelError> {
        if self.fails_at(MockFailure::Triangulate) {
            return Err(KernelError::TessellationFailed {
                reason: "injected tessellation failure".to_string(),
            });
        }
        Ok(revolve_outline(self.solid_or_err(solid)?))
    }

    fn export_stl(
        &mut self,
        solid: &KernelSolidHandle,
        _tolerance: f64,
    ) -> Result<Vec<u8>, KernelError> {
        if self.fails_at(MockFailure::Export) {
            return Err(KernelError::ExportFailed {
                reason: "injected export failure".to_string(),
            });
        }
        let faces = revolve_outline(self.solid_or_err(solid)?);
        Ok(binary_stl(&faces))
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }
}

/// One face per outline edge: the band swept by that edge.
fn revolve_outline(solid: &MockSolid) -> Vec<FaceTriangulation> {
    let steps = ((FULL_TURN_STEPS as f64 * solid.angle.abs() / TAU).ceil() as usize).max(1);
    let n = solid.outline.len();

    (0..n)
        .map(|i| {
            let p = solid.outline[i];
            let q = solid.outline[(i + 1) % n];
            let p_on_axis = distance_to_axis(p, solid) <= CLOSURE_TOLERANCE;
            let q_on_axis = distance_to_axis(q, solid) <= CLOSURE_TOLERANCE;
            let reversed = i % 2 == 1;

            if p_on_axis && q_on_axis {
                return FaceTriangulation {
                    reversed,
                    ..Default::default()
                };
            }

            let mut positions = Vec::with_capacity(2 * (steps + 1));
            for j in 0..=steps {
                let theta = solid.angle * j as f64 / steps as f64;
                positions.push(rotate(p, solid, theta));
                positions.push(rotate(q, solid, theta));
            }

            let mut triangles = Vec::with_capacity(2 * steps);
            for j in 0..steps as u32 {
                let a = 2 * j;
                let c = a + 1;
                let b = a + 2;
                let d = a + 3;
                if !p_on_axis {
                    triangles.push([a, b, c]);
                }
                if !q_on_axis {
                    triangles.push([b, d, c]);
                }
            }
            if reversed {
                for tri in &mut triangles {
                    tri.swap(1, 2);
                }
            }

            FaceTriangulation {
                positions,
                triangles,
                reversed,
            }
        })
        .collect()
}

fn binary_stl(faces: &[FaceTriangulation]) -> Vec<u8> {
    let tri_count: usize = faces.iter().map(|f| f.triangles.len()).sum();
    let mut buf = Vec::with_capacity(84 + tri_count * 50);
    buf.extend_from_slice(b"MockKernel STL");
    buf.resize(80, 0u8);
    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for face in faces {
        for tri in &face.triangles {
            buf.extend_from_slice(&[0u8; 12]);
            for &i in tri {
                for c in face.positions[i as usize] {
                    buf.extend_from_slice(&(c as f32).to_le_bytes());
                }
            }
            buf.extend_from_slice(&0u16.to_le_bytes());
        }
    }
    buf
}

fn normalized(v: [f64; 3]) -> Option<[f64; 3]> {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    (len > 1e-12).then(|| [v[0] / len, v[1] / len, v[2] / len])
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn distance_to_axis(p: [f64; 3], solid: &MockSolid) -> f64 {
    let v = sub(p, solid.origin);
    let c = cross(solid.axis, v);
    dot(c, c).sqrt()
}

/// Rodrigues rotation of `p` about the solid's axis.
fn rotate(p: [f64; 3], solid: &MockSolid, theta: f64) -> [f64; 3] {
    let k = solid.axis;
    let v = sub(p, solid.origin);
    let (sin, cos) = theta.sin_cos();
    let kxv = cross(k, v);
    let kdv = dot(k, v) * (1.0 - cos);
    [
        solid.origin[0] + v[0] * cos + kxv[0] * sin + k[0] * kdv,
        solid.origin[1] + v[1] * cos + kxv[1] * sin + k[1] * kdv,
        solid.origin[2] + v[2] * cos + kxv[2] * sin + k[2] * kdv,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit-radius cylinder outline along +X: wall, mouth cap, axis, throat cap.
    fn cylinder_loop() -> Vec<LineSegment> {
        let pts = [
            [0.0, 1.0, 0.0],
            [2.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
        ];
        (0..pts.len())
            .map(|i| LineSegment::new(pts[i], pts[(i + 1) % pts.len()]))
            .collect()
    }

    fn revolved(kernel: &mut MockKernel) -> KernelSolidHandle {
        let wire = kernel.make_wire(&cylinder_loop()).unwrap();
        let face = kernel.make_planar_face(wire).unwrap();
        kernel
            .revolve_face(face, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], TAU)
            .unwrap()
    }

    #[test]
    fn one_face_per_edge_with_axis_face_empty() {
        let mut kernel = MockKernel::new();
        let handle = revolved(&mut kernel);
        let faces = kernel.triangulate(&handle, 0.1).unwrap();

        assert_eq!(faces.len(), 4);
        assert_eq!(faces[0].triangles.len(), 2 * FULL_TURN_STEPS);
        assert_eq!(faces[1].triangles.len(), FULL_TURN_STEPS);
        assert!(faces[2].is_empty(), "axis edge sweeps no area");
        assert_eq!(faces[3].triangles.len(), FULL_TURN_STEPS);
        assert!(!faces[0].reversed && faces[1].reversed);
    }

    #[test]
    fn rotation_keeps_distance_to_axis() {
        let mut kernel = MockKernel::new();
        let handle = revolved(&mut kernel);
        let faces = kernel.triangulate(&handle, 0.1).unwrap();
        for p in &faces[0].positions {
            assert_relative_eq!((p[1] * p[1] + p[2] * p[2]).sqrt(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn injected_failures_surface_at_their_stage() {
        let mut kernel = MockKernel::failing_at(MockFailure::Wire);
        assert!(matches!(
            kernel.make_wire(&cylinder_loop()),
            Err(KernelError::WireNotClosed { .. })
        ));

        let mut kernel = MockKernel::failing_at(MockFailure::Face);
        let wire = kernel.make_wire(&cylinder_loop()).unwrap();
        assert!(matches!(
            kernel.make_planar_face(wire),
            Err(KernelError::FaceFailed { .. })
        ));

        let mut kernel = MockKernel::failing_at(MockFailure::Triangulate);
        let handle = revolved(&mut kernel);
        assert!(kernel.triangulate(&handle, 0.1).is_err());
    }

    #[test]
    fn failure_can_be_cleared() {
        let mut kernel = MockKernel::new();
        let handle = revolved(&mut kernel);

        kernel.set_failure(Some(MockFailure::Export));
        assert!(matches!(
            kernel.export_stl(&handle, 0.1),
            Err(KernelError::ExportFailed { .. })
        ));
        assert!(kernel.triangulate(&handle, 0.1).is_ok());

        kernel.set_failure(None);
        assert!(kernel.export_stl(&handle, 0.1).is_ok());
    }

    #[test]
    fn export_writes_binary_stl_layout() {
        let mut kernel = MockKernel::new();
        let handle = revolved(&mut kernel);
        let bytes = kernel.export_stl(&handle, 0.1).unwrap();
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        assert_eq!(count, 4 * FULL_TURN_STEPS);
        assert_eq!(bytes.len(), 84 + count * 50);
    }

    #[test]
    fn release_drops_solid() {
        let mut kernel = MockKernel::new();
        let handle = revolved(&mut kernel);
        assert_eq!(kernel.solid_count(), 1);
        kernel.release(&handle);
        assert_eq!(kernel.solid_count(), 0);
        assert!(kernel.triangulate(&handle, 0.1).is_err());
    }
}
