//! Closure checks shared by every kernel before a wire is built.

use crate::types::{distance, KernelError, LineSegment};

/// Endpoints closer than this are treated as the same vertex.
pub const CLOSURE_TOLERANCE: f64 = 1e-9;

/// Verify that `segments` form one closed loop with no zero-length edges.
pub fn check_closed_loop(segments: &[LineSegment]) -> Result<(), KernelError> {
    if segments.len() < 3 {
        return Err(KernelError::WireNotClosed {
            reason: format!("a closed wire needs at least 3 edges, got {}", segments.len()),
        });
    }

    for (i, seg) in segments.iter().enumerate() {
        if seg.length() <= CLOSURE_TOLERANCE {
            return Err(KernelError::WireNotClosed {
                reason: format!("edge {i} has zero length at {:?}", seg.start),
            });
        }
        let next = &segments[(i + 1) % segments.len()];
        let gap = distance(seg.end, next.start);
        if gap > CLOSURE_TOLERANCE {
            return Err(KernelError::WireNotClosed {
                reason: format!(
                    "gap of {gap} between edge {i} and edge {}",
                    (i + 1) % segments.len()
                ),
            });
        }
    }

    Ok(())
}
