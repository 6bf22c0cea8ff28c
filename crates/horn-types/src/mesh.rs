use serde::{Deserialize, Serialize};

/// Renderer-agnostic indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals, same layout as `vertices`.
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array, three per triangle.
    pub indices: Vec<u32>,
}

/// Structural defects that make a mesh unusable by a renderer or writer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("index buffer length {len} is not a multiple of 3")]
    RaggedIndices { len: usize },

    #[error("index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("normal buffer length {normals} does not match vertex buffer length {vertices}")]
    NormalCountMismatch { normals: usize, vertices: usize },
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, index: usize) -> [f32; 3] {
        let i = index * 3;
        [self.vertices[i], self.vertices[i + 1], self.vertices[i + 2]]
    }

    pub fn normal(&self, index: usize) -> [f32; 3] {
        let i = index * 3;
        [self.normals[i], self.normals[i + 1], self.normals[i + 2]]
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Check the index and normal buffers against the vertex buffer.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices {
                len: self.indices.len(),
            });
        }
        let vertex_count = self.vertex_count();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        if !self.normals.is_empty() && self.normals.len() != self.vertices.len() {
            return Err(MeshError::NormalCountMismatch {
                normals: self.normals.len(),
                vertices: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        if self.vertices.len() < 3 {
            return None;
        }
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in self.vertices.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some(Bounds { min, max })
    }

    /// Framing hints for an external viewport.
    pub fn camera_fit(&self) -> Option<CameraFit> {
        self.bounds().map(|b| CameraFit {
            center: b.center(),
            extents: b.extents(),
            radius: b.radius(),
        })
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn extents(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Radius of the sphere through the box corners.
    pub fn radius(&self) -> f32 {
        let e = self.extents();
        0.5 * (e[0] * e[0] + e[1] * e[1] + e[2] * e[2]).sqrt()
    }
}

/// Bounding center and extents handed to the viewport with each mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFit {
    pub center: [f32; 3],
    pub extents: [f32; 3],
    pub radius: f32,
}

/// Triangulation fidelity. Smaller values give more triangles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshTolerance {
    /// Maximum chord deviation, in millimetres.
    pub linear: f64,
    /// Maximum angle between adjacent facets, in radians.
    pub angular: f64,
}

impl Default for MeshTolerance {
    fn default() -> Self {
        Self {
            linear: 0.1,
            angular: 0.1,
        }
    }
}

impl MeshTolerance {
    pub fn is_valid(&self) -> bool {
        self.linear.is_finite() && self.linear > 0.0 && self.angular.is_finite() && self.angular > 0.0
    }

    /// Single chord tolerance satisfying both bounds on a surface whose
    /// largest radius of curvature is `max_radius`.
    pub fn chord_tolerance(&self, max_radius: f64) -> f64 {
        let angular_chord = max_radius * (1.0 - (self.angular * 0.5).cos());
        if angular_chord > 0.0 {
            self.linear.min(angular_chord)
        } else {
            self.linear
        }
    }
}
