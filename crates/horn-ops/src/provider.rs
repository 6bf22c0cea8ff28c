//! Mesh providers and the kernel-then-lathe fallback strategy.

use horn_kernel::{Kernel, KernelSolidHandle};
use horn_types::{max_radius, Mesh, MeshTolerance, ProfileSample};
use tracing::{info, warn};

use crate::extract::extract_mesh;
use crate::lathe::lathe_mesh;
use crate::solid::build_solid;
use crate::types::{MeshSource, OpError};

/// A mesh together with where it came from.
#[derive(Debug, Clone)]
pub struct ProvidedMesh {
    pub mesh: Mesh,
    pub source: MeshSource,
    /// The kernel solid behind the mesh, for the kernel-backed provider.
    pub solid: Option<KernelSolidHandle>,
}

/// Something that turns a profile into a mesh.
pub trait MeshProvider {
    fn source(&self) -> MeshSource;

    fn provide(&mut self, samples: &[ProfileSample]) -> Result<ProvidedMesh, OpError>;
}

/// Solid builder followed by mesh extraction on a geometry kernel.
pub struct KernelBacked<'k, K: Kernel + ?Sized> {
    kernel: &'k mut K,
    tolerance: MeshTolerance,
}

impl<'k, K: Kernel + ?Sized> KernelBacked<'k, K> {
    pub fn new(kernel: &'k mut K, tolerance: MeshTolerance) -> Self {
        Self { kernel, tolerance }
    }
}

impl<K: Kernel + ?Sized> MeshProvider for KernelBacked<'_, K> {
    fn source(&self) -> MeshSource {
        MeshSource::KernelBacked
    }

    fn provide(&mut self, samples: &[ProfileSample]) -> Result<ProvidedMesh, OpError> {
        let solid = build_solid(&mut *self.kernel, samples)?;
        match extract_mesh(&mut *self.kernel, &solid, &self.tolerance, max_radius(samples)) {
            Ok(mesh) => Ok(ProvidedMesh {
                mesh,
                source: MeshSource::KernelBacked,
                solid: Some(solid),
            }),
            Err(e) => {
                self.kernel.release(&solid);
                Err(e)
            }
        }
    }
}

/// Radial sweep of the samples, no kernel required.
#[derive(Debug, Clone, Copy)]
pub struct DirectLathe {
    pub radial_subdivisions: u32,
}

impl MeshProvider for DirectLathe {
    fn source(&self) -> MeshSource {
        MeshSource::DirectLathe
    }

    fn provide(&mut self, samples: &[ProfileSample]) -> Result<ProvidedMesh, OpError> {
        Ok(ProvidedMesh {
            mesh: lathe_mesh(samples, self.radial_subdivisions)?,
            source: MeshSource::DirectLathe,
            solid: None,
        })
    }
}

/// Mesh a profile, preferring the kernel when one is available.
///
/// Geometry and extraction failures on the kernel path fall back to the
/// direct lathe. Parameter errors are returned as-is.
pub fn generate_mesh<K: Kernel + ?Sized>(
    kernel: Option<&mut K>,
    samples: &[ProfileSample],
    tolerance: MeshTolerance,
    radial_subdivisions: u32,
) -> Result<ProvidedMesh, OpError> {
    let mut lathe = DirectLathe {
        radial_subdivisions,
    };

    let Some(kernel) = kernel else {
        info!("no geometry kernel, lathing profile directly");
        return lathe.provide(samples);
    };

    match KernelBacked::new(kernel, tolerance).provide(samples) {
        Ok(provided) => Ok(provided),
        Err(e) if e.is_geometry_failure() => {
            warn!(error = %e, "kernel path failed, falling back to direct lathe");
            lathe.provide(samples)
        }
        Err(e) => Err(e),
    }
}
