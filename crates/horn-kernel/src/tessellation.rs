//! Tessellation wrapper producing per-face triangulations.
//!
//! Wraps truck-meshalgo. Faces are reported in the underlying surface's
//! orientation together with the face's own orientation flag; the caller
//! decides how to fix winding.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::types::*;
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};
use truck_modeling::{EuclideanSpace, InnerSpace};
use truck_polymesh::stl::{self, StlType};

type TruckSolid = truck_modeling::Solid;

/// Triangulate a truck Solid face by face.
///
/// Faces whose meshing produced no polygon are reported as empty
/// triangulations so the caller can skip them.
pub fn triangulate_solid(
    solid: &TruckSolid,
    tolerance: f64,
) -> std::result::Result<Vec<FaceTriangulation>, KernelError> {
    let meshed_solid = catch_unwind(AssertUnwindSafe(|| solid.triangulation(tolerance)))
        .map_err(|_| KernelError::TessellationFailed {
            reason: "truck triangulation panicked".to_string(),
        })?;

    let mut faces = Vec::new();
    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let reversed = !face.orientation();

            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(face_mesh) = maybe_mesh else {
                faces.push(FaceTriangulation {
                    reversed,
                    ..Default::default()
                });
                continue;
            };

            let positions: Vec<[f64; 3]> = face_mesh
                .positions()
                .iter()
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let triangles: Vec<[u32; 3]> = face_mesh
                .faces()
                .triangle_iter()
                .map(|tri| [tri[0].pos as u32, tri[1].pos as u32, tri[2].pos as u32])
                .collect();

            faces.push(FaceTriangulation {
                positions,
                triangles,
                reversed,
            });
        }
    }

    Ok(faces)
}

/// Signed volume of a polygon mesh; positive when its faces wind
/// counter-clockwise seen from outside.
pub fn polygon_signed_volume(mesh: &PolygonMesh) -> f64 {
    let positions = mesh.positions();
    mesh.faces()
        .triangle_iter()
        .map(|tri| {
            let a = positions[tri[0].pos].to_vec();
            let b = positions[tri[1].pos].to_vec();
            let c = positions[tri[2].pos].to_vec();
            a.dot(b.cross(c)) / 6.0
        })
        .sum()
}

/// Signed volume of `solid` measured on a mesh at `tolerance`.
///
/// Returns `None` if truck panics while meshing.
pub fn solid_signed_volume(solid: &TruckSolid, tolerance: f64) -> Option<f64> {
    catch_unwind(AssertUnwindSafe(|| solid.triangulation(tolerance).to_polygon()))
        .ok()
        .map(|mesh| polygon_signed_volume(&mesh))
}

/// Binary STL bytes for a solid, written by truck's own STL writer into memory.
///
/// The facets are wound outward even if the solid's faces are not.
pub fn write_solid_stl(
    solid: &TruckSolid,
    tolerance: f64,
) -> std::result::Result<Vec<u8>, KernelError> {
    let mut mesh = catch_unwind(AssertUnwindSafe(|| solid.triangulation(tolerance).to_polygon()))
        .map_err(|_| KernelError::ExportFailed {
            reason: "truck triangulation panicked".to_string(),
        })?;

    if mesh.positions().is_empty() {
        return Err(KernelError::ExportFailed {
            reason: "solid produced an empty mesh".to_string(),
        });
    }
    if polygon_signed_volume(&mesh) < 0.0 {
        mesh.invert();
    }

    let mut buf: Vec<u8> = Vec::new();
    stl::write(&mesh, &mut buf, StlType::Binary).map_err(|e| KernelError::ExportFailed {
        reason: format!("STL writer failed: {e}"),
    })?;
    Ok(buf)
}
