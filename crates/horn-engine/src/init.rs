//! Startup of the geometry kernel with a bounded wait.

use horn_kernel::{Kernel, KernelError, TruckKernel};
use tracing::{debug, info, instrument, warn};

use crate::config::RetryPolicy;
use crate::errors::EngineError;

/// Source of a geometry kernel that may not be ready immediately.
pub trait KernelLoader {
    type Kernel: Kernel;

    /// Poll once. `Ok(None)` means not ready yet.
    fn try_load(&mut self) -> Result<Option<Self::Kernel>, KernelError>;
}

/// Loader for the built-in truck kernel, which is ready on first poll.
#[derive(Debug, Default, Clone, Copy)]
pub struct TruckLoader;

impl KernelLoader for TruckLoader {
    type Kernel = TruckKernel;

    fn try_load(&mut self) -> Result<Option<TruckKernel>, KernelError> {
        Ok(Some(TruckKernel::new()))
    }
}

/// Poll `loader` until it yields a kernel or the attempts run out.
///
/// Sleeps `policy.interval()` between polls. Load errors count as a failed
/// attempt and are retried like a kernel that is not ready.
#[instrument(skip_all, fields(max_attempts = policy.max_attempts, interval_ms = policy.interval_ms))]
pub async fn initialize_kernel<L: KernelLoader>(
    loader: &mut L,
    policy: &RetryPolicy,
) -> Result<L::Kernel, EngineError> {
    for attempt in 1..=policy.max_attempts {
        match loader.try_load() {
            Ok(Some(kernel)) => {
                info!(attempt, "geometry kernel ready");
                return Ok(kernel);
            }
            Ok(None) => debug!(attempt, "geometry kernel not ready"),
            Err(e) => warn!(attempt, error = %e, "geometry kernel load failed"),
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval()).await;
        }
    }

    warn!("giving up on geometry kernel");
    Err(EngineError::KernelUnavailable {
        attempts: policy.max_attempts,
    })
}
