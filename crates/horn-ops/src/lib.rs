pub mod extract;
pub mod lathe;
pub mod length;
pub mod metrics;
pub mod normals;
pub mod params;
pub mod profile;
pub mod provider;
pub mod solid;
pub mod types;

pub use extract::{extract_mesh, fix_winding, signed_volume};
pub use lathe::{lathe_mesh, DEFAULT_RADIAL_SUBDIVISIONS, MIN_RADIAL_SUBDIVISIONS};
pub use length::{estimate_length, raw_length_estimate, SPEED_OF_SOUND_MM_PER_S};
pub use metrics::HornMetrics;
pub use normals::compute_vertex_normals;
pub use params::resolve_parameters;
pub use profile::generate_profile;
pub use provider::{generate_mesh, DirectLathe, KernelBacked, MeshProvider, ProvidedMesh};
pub use solid::{build_solid, profile_outline};
pub use types::*;
