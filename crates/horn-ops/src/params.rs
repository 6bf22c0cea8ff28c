use horn_types::{AcousticParameters, HornInputs};
use tracing::{info, instrument};

use crate::length::estimate_length;
use crate::types::OpError;

/// Turn raw inputs into validated parameters.
///
/// Diameters are halved into radii. With `auto_length` the entered length
/// is replaced by the estimator's recommendation for `target_frequency`.
#[instrument(skip_all)]
pub fn resolve_parameters(inputs: &HornInputs) -> Result<AcousticParameters, OpError> {
    let throat_radius = inputs.throat_radius();
    let mouth_radius = inputs.mouth_radius();

    let length = if inputs.auto_length {
        estimate_length(inputs.target_frequency, throat_radius, mouth_radius)?
    } else {
        inputs.horn_length
    };

    let params = AcousticParameters::new(
        throat_radius,
        mouth_radius,
        length,
        inputs.horn_type,
        inputs.segments,
    )?;

    info!(
        throat_radius,
        mouth_radius,
        length,
        kind = %params.kind(),
        segments = params.sample_count(),
        "resolved horn parameters"
    );
    Ok(params)
}
