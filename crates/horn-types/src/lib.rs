pub mod mesh;
pub mod params;
pub mod profile;

pub use mesh::*;
pub use params::*;
pub use profile::*;
