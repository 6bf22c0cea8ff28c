//! STL encoders for a `Mesh`: ASCII and binary.

use horn_types::Mesh;
use tracing::debug;

use crate::errors::ExportError;

/// Object name used in the `solid`/`endsolid` lines.
pub const SOLID_NAME: &str = "horn";

const BINARY_HEADER_LEN: usize = 80;
const BINARY_FACET_LEN: usize = 50;

/// Encode `mesh` as an ASCII STL document.
///
/// Facet normals come from each triangle's winding; a degenerate triangle
/// gets a zero normal. Coordinates use the shortest decimal form that reads
/// back to the same `f32`.
pub fn write_ascii_stl(mesh: &Mesh, name: &str) -> Result<String, ExportError> {
    check_writable(mesh)?;

    let mut out = String::with_capacity(mesh.triangle_count() * 256);
    out.push_str(&format!("solid {}\n", name));

    for tri in mesh.triangles() {
        let [nx, ny, nz] = facet_normal(mesh, tri);
        out.push_str(&format!("  facet normal {} {} {}\n", nx, ny, nz));
        out.push_str("    outer loop\n");
        for idx in tri {
            let [x, y, z] = mesh.position(idx as usize);
            out.push_str(&format!("      vertex {} {} {}\n", x, y, z));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str(&format!("endsolid {}\n", name));
    debug!(triangles = mesh.triangle_count(), bytes = out.len(), "wrote ASCII STL");
    Ok(out)
}

/// Encode `mesh` as a binary STL buffer.
///
/// Layout: 80-byte header, little-endian u32 triangle count, then per
/// triangle a normal, three vertices (all f32) and a zero u16 attribute.
pub fn write_binary_stl(mesh: &Mesh, name: &str) -> Result<Vec<u8>, ExportError> {
    check_writable(mesh)?;

    let tri_count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(BINARY_HEADER_LEN + 4 + tri_count * BINARY_FACET_LEN);

    let header = format!("binary STL: {}", name);
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(BINARY_HEADER_LEN)]);
    buf.resize(BINARY_HEADER_LEN, 0u8);

    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for tri in mesh.triangles() {
        for c in facet_normal(mesh, tri) {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        for idx in tri {
            for c in mesh.position(idx as usize) {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    debug!(triangles = tri_count, bytes = buf.len(), "wrote binary STL");
    Ok(buf)
}

fn check_writable(mesh: &Mesh) -> Result<(), ExportError> {
    mesh.validate()?;
    if mesh.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    Ok(())
}

fn facet_normal(mesh: &Mesh, tri: [u32; 3]) -> [f32; 3] {
    let p0 = mesh.position(tri[0] as usize);
    let p1 = mesh.position(tri[1] as usize);
    let p2 = mesh.position(tri[2] as usize);
    let a = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let b = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
    let n = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0; 3]
    }
}
