pub mod config;
pub mod errors;
pub mod init;
pub mod session;

pub use config::{PipelineConfig, RetryPolicy};
pub use errors::EngineError;
pub use init::{initialize_kernel, KernelLoader, TruckLoader};
pub use session::{ExportRoute, Exported, Generation, HornSession, MeshSink};
