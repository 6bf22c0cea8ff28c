//! Indexed mesh extraction from a kernel solid.

use horn_kernel::{FaceTriangulation, Kernel, KernelSolidHandle};
use horn_types::{Mesh, MeshTolerance};
use tracing::{debug, info, instrument, warn};

use crate::normals::{compute_vertex_normals, cross, dot};
use crate::types::OpError;

/// Flip every triangle of a face whose orientation opposes its surface.
///
/// Swaps the second and third index so the winding follows the face
/// rather than the underlying surface parameterization.
pub fn fix_winding(triangles: &mut [[u32; 3]], reversed: bool) {
    if reversed {
        for tri in triangles {
            tri.swap(1, 2);
        }
    }
}

/// Signed volume enclosed by a triangle set; positive when triangles wind
/// counter-clockwise seen from outside.
pub fn signed_volume(vertices: &[f32], indices: &[u32]) -> f64 {
    let pos = |i: u32| -> [f64; 3] {
        let i = i as usize * 3;
        [
            vertices[i] as f64,
            vertices[i + 1] as f64,
            vertices[i + 2] as f64,
        ]
    };
    indices
        .chunks_exact(3)
        .map(|t| dot(pos(t[0]), cross(pos(t[1]), pos(t[2]))) / 6.0)
        .sum()
}

/// Triangulate `solid` and flatten its faces into one indexed mesh.
///
/// `max_radius` is the largest distance from the axis, used to turn the
/// angular tolerance into a chord bound. Faces without a triangulation are
/// skipped; the extraction fails only when no face yields triangles.
#[instrument(skip_all, fields(linear = tolerance.linear, angular = tolerance.angular))]
pub fn extract_mesh<K: Kernel + ?Sized>(
    kernel: &mut K,
    solid: &KernelSolidHandle,
    tolerance: &MeshTolerance,
    max_radius: f64,
) -> Result<Mesh, OpError> {
    if !tolerance.is_valid() {
        return Err(OpError::invalid(format!(
            "mesh tolerances must be positive, got linear={} angular={}",
            tolerance.linear, tolerance.angular
        )));
    }

    let chord = tolerance.chord_tolerance(max_radius);
    let faces = kernel
        .triangulate(solid, chord)
        .map_err(|e| OpError::MeshExtraction {
            reason: e.to_string(),
        })?;

    let mut mesh = Mesh::new();
    let mut skipped = 0usize;
    for (face_index, face) in faces.into_iter().enumerate() {
        if !append_face(&mut mesh, face, face_index) {
            skipped += 1;
        }
    }

    if mesh.is_empty() {
        return Err(OpError::MeshExtraction {
            reason: "triangulation produced no triangles".to_string(),
        });
    }

    if signed_volume(&mesh.vertices, &mesh.indices) < 0.0 {
        debug!("solid is inside out, flipping all triangles");
        for tri in mesh.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    let (normals, degenerate) = compute_vertex_normals(&mesh.vertices, &mesh.indices);
    mesh.normals = normals;
    if degenerate > 0 {
        debug!(degenerate, "vertices with zero accumulated normal");
    }

    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        skipped_faces = skipped,
        chord,
        "extracted horn mesh"
    );
    Ok(mesh)
}

/// Append one face at the current vertex offset. Returns false if skipped.
fn append_face(mesh: &mut Mesh, face: FaceTriangulation, face_index: usize) -> bool {
    if face.is_empty() {
        return false;
    }
    let node_count = face.positions.len();
    if face
        .triangles
        .iter()
        .flatten()
        .any(|&i| i as usize >= node_count)
    {
        warn!(face_index, "face triangulation references missing nodes, skipping");
        return false;
    }
    if face.positions.iter().flatten().any(|c| !c.is_finite()) {
        warn!(face_index, "face triangulation has non-finite nodes, skipping");
        return false;
    }

    let offset = mesh.vertex_count() as u32;
    let mut triangles = face.triangles;
    fix_winding(&mut triangles, face.reversed);

    for p in &face.positions {
        mesh.vertices.extend_from_slice(&[p[0] as f32, p[1] as f32, p[2] as f32]);
    }
    for tri in &triangles {
        mesh.indices
            .extend_from_slice(&[tri[0] + offset, tri[1] + offset, tri[2] + offset]);
    }
    true
}
