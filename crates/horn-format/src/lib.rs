pub mod errors;
pub mod parse;
pub mod save;
pub mod stl;

pub use errors::ExportError;
pub use parse::{parse_ascii_stl, parse_binary_stl, StlFacet};
pub use save::{save, DEFAULT_FILE_NAME};
pub use stl::{write_ascii_stl, write_binary_stl, SOLID_NAME};
