pub mod mock_kernel;
pub mod tessellation;
pub mod traits;
pub mod truck_kernel;
pub mod types;
pub mod wire;

pub use mock_kernel::{MockFailure, MockKernel};
pub use traits::*;
pub use truck_kernel::TruckKernel;
pub use types::*;
