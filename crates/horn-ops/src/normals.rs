//! Smooth per-vertex normals.

/// Angle-weighted vertex normals for an indexed triangle set.
///
/// Each triangle adds its unit face normal to its three corners, weighted
/// by the corner angle. Returns the flat normal buffer and the number of
/// vertices whose accumulated normal was zero (unreferenced vertices or
/// vertices touched only by degenerate triangles); those stay `[0, 0, 0]`.
pub fn compute_vertex_normals(vertices: &[f32], indices: &[u32]) -> (Vec<f32>, usize) {
    let vertex_count = vertices.len() / 3;
    let mut acc = vec![[0.0f64; 3]; vertex_count];

    let pos = |i: u32| -> [f64; 3] {
        let i = i as usize * 3;
        [
            vertices[i] as f64,
            vertices[i + 1] as f64,
            vertices[i + 2] as f64,
        ]
    };

    for tri in indices.chunks_exact(3) {
        let p = [pos(tri[0]), pos(tri[1]), pos(tri[2])];
        let n = cross(sub(p[1], p[0]), sub(p[2], p[0]));
        let n_len = length(n);
        if n_len <= f64::EPSILON {
            continue;
        }
        let n = scale(n, 1.0 / n_len);

        for corner in 0..3 {
            let e1 = sub(p[(corner + 1) % 3], p[corner]);
            let e2 = sub(p[(corner + 2) % 3], p[corner]);
            let denom = length(e1) * length(e2);
            if denom <= f64::EPSILON {
                continue;
            }
            let angle = (dot(e1, e2) / denom).clamp(-1.0, 1.0).acos();
            let a = &mut acc[tri[corner] as usize];
            a[0] += n[0] * angle;
            a[1] += n[1] * angle;
            a[2] += n[2] * angle;
        }
    }

    let mut degenerate = 0;
    let mut normals = Vec::with_capacity(vertex_count * 3);
    for a in &acc {
        let len = length(*a);
        if len > 1e-12 {
            normals.extend_from_slice(&[(a[0] / len) as f32, (a[1] / len) as f32, (a[2] / len) as f32]);
        } else {
            degenerate += 1;
            normals.extend_from_slice(&[0.0, 0.0, 0.0]);
        }
    }

    (normals, degenerate)
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn length(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}
