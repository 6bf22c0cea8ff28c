//! Direct lathe of a profile into triangles, with no kernel involved.

use std::f64::consts::TAU;

use horn_types::{Mesh, ProfileSample};
use tracing::{debug, instrument};

use crate::normals::compute_vertex_normals;
use crate::types::OpError;

pub const DEFAULT_RADIAL_SUBDIVISIONS: u32 = 64;
pub const MIN_RADIAL_SUBDIVISIONS: u32 = 3;

/// Sweep the profile around the X axis.
///
/// Each sample becomes a ring of `radial_subdivisions + 1` vertices at
/// `(x, r cos t, r sin t)`; the first and last vertex of a ring coincide at
/// t = 0 and t = 2pi. Adjacent rings are joined by two triangles per step,
/// wound counter-clockwise when seen from outside the wall.
#[instrument(skip_all, fields(samples = samples.len(), radial_subdivisions = radial_subdivisions))]
pub fn lathe_mesh(samples: &[ProfileSample], radial_subdivisions: u32) -> Result<Mesh, OpError> {
    if samples.len() < 2 {
        return Err(OpError::invalid(format!(
            "lathe needs at least 2 profile samples, got {}",
            samples.len()
        )));
    }
    if radial_subdivisions < MIN_RADIAL_SUBDIVISIONS {
        return Err(OpError::invalid(format!(
            "lathe needs at least {MIN_RADIAL_SUBDIVISIONS} radial subdivisions, got {radial_subdivisions}"
        )));
    }

    let steps = radial_subdivisions as usize;
    let ring = steps + 1;
    let mut mesh = Mesh {
        vertices: Vec::with_capacity(samples.len() * ring * 3),
        normals: Vec::new(),
        indices: Vec::with_capacity((samples.len() - 1) * steps * 6),
    };

    let angles: Vec<(f64, f64)> = (0..ring)
        .map(|j| {
            let theta = TAU * j as f64 / steps as f64;
            (theta.cos(), theta.sin())
        })
        .collect();

    for s in samples {
        for &(cos, sin) in &angles {
            mesh.vertices.extend_from_slice(&[
                s.axial_position as f32,
                (cos * s.radius) as f32,
                (sin * s.radius) as f32,
            ]);
        }
    }

    for i in 0..samples.len() - 1 {
        let row = (i * ring) as u32;
        let next = ((i + 1) * ring) as u32;
        for j in 0..steps as u32 {
            let a = row + j;
            let b = row + j + 1;
            let c = next + j;
            let d = next + j + 1;
            mesh.indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    let (normals, degenerate) = compute_vertex_normals(&mesh.vertices, &mesh.indices);
    mesh.normals = normals;

    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        degenerate,
        "lathed horn mesh"
    );
    Ok(mesh)
}
