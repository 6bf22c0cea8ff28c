//! Solid of revolution from a horn profile.

use std::f64::consts::TAU;

use horn_kernel::{Kernel, KernelSolidHandle, LineSegment};
use horn_types::ProfileSample;
use tracing::{debug, info, instrument};

use crate::types::{ConstructionStage, OpError};

/// The horn axis: through the origin along +X.
pub const AXIS_ORIGIN: [f64; 3] = [0.0, 0.0, 0.0];
pub const AXIS_DIRECTION: [f64; 3] = [1.0, 0.0, 0.0];

/// Closed outline of the horn's half cross-section.
///
/// Loop order: one edge per consecutive sample pair from throat to mouth,
/// the mouth-closing edge down to the axis, the axis edge back to the
/// throat's axial position, and the throat-closing edge up to the first
/// sample. Consecutive edges share endpoints exactly.
pub fn profile_outline(samples: &[ProfileSample]) -> Result<Vec<LineSegment>, OpError> {
    if samples.len() < 2 {
        return Err(OpError::construction(
            ConstructionStage::WireClosure,
            format!("need at least 2 profile samples, got {}", samples.len()),
        ));
    }
    if let Some(i) = samples
        .windows(2)
        .position(|w| w[1].axial_position < w[0].axial_position)
    {
        return Err(OpError::construction(
            ConstructionStage::WireClosure,
            format!("axial position decreases after sample {i}"),
        ));
    }

    let first = samples[0];
    let last = samples[samples.len() - 1];

    let mut outline: Vec<LineSegment> = samples
        .windows(2)
        .map(|w| LineSegment::new(w[0].to_point(), w[1].to_point()))
        .collect();
    outline.push(LineSegment::new(last.to_point(), last.axis_point()));
    outline.push(LineSegment::new(last.axis_point(), first.axis_point()));
    outline.push(LineSegment::new(first.axis_point(), first.to_point()));

    Ok(outline)
}

/// Build the horn solid: closed wire, planar face, full revolution about +X.
///
/// Each stage must succeed before the next runs; on failure nothing is
/// kept and the error names the stage.
#[instrument(skip_all, fields(samples = samples.len()))]
pub fn build_solid<K: Kernel + ?Sized>(
    kernel: &mut K,
    samples: &[ProfileSample],
) -> Result<KernelSolidHandle, OpError> {
    let outline = profile_outline(samples)?;
    debug!(edges = outline.len(), "assembled horn outline");

    let wire = kernel
        .make_wire(&outline)
        .map_err(|e| OpError::construction(ConstructionStage::WireClosure, e))?;

    let face = kernel
        .make_planar_face(wire)
        .map_err(|e| OpError::construction(ConstructionStage::FaceConstruction, e))?;

    let solid = kernel
        .revolve_face(face, AXIS_ORIGIN, AXIS_DIRECTION, TAU)
        .map_err(|e| OpError::construction(ConstructionStage::Revolution, e))?;

    info!("built horn solid");
    Ok(solid)
}
