use tracing::debug;

use crate::types::OpError;

/// Speed of sound in air, millimetres per second.
pub const SPEED_OF_SOUND_MM_PER_S: f64 = 343_000.0;

/// Shortest length the estimator will recommend, in millimetres.
pub const MIN_ESTIMATED_LENGTH: f64 = 50.0;

/// Longest length the estimator will recommend, in millimetres.
pub const MAX_ESTIMATED_LENGTH: f64 = 2000.0;

/// Unclamped quarter-wavelength length estimate, in millimetres.
///
/// `length = (c / f) / 4 * ln(mouth / throat)`
pub fn raw_length_estimate(
    target_frequency: f64,
    throat_radius: f64,
    mouth_radius: f64,
) -> Result<f64, OpError> {
    if !target_frequency.is_finite() || target_frequency <= 0.0 {
        return Err(OpError::invalid(format!(
            "target frequency must be positive, got {target_frequency}"
        )));
    }
    if !throat_radius.is_finite() || throat_radius <= 0.0 {
        return Err(OpError::invalid(format!(
            "throat radius must be positive, got {throat_radius}"
        )));
    }
    if !mouth_radius.is_finite() || mouth_radius <= throat_radius {
        return Err(OpError::invalid(format!(
            "mouth radius ({mouth_radius}) must be larger than throat radius ({throat_radius})"
        )));
    }

    let wavelength = SPEED_OF_SOUND_MM_PER_S / target_frequency;
    let expansion_ratio = mouth_radius / throat_radius;
    Ok(wavelength / 4.0 * expansion_ratio.ln())
}

/// Recommended axial length for a target cutoff frequency, rounded to the
/// nearest millimetre and clamped to [50, 2000].
pub fn estimate_length(
    target_frequency: f64,
    throat_radius: f64,
    mouth_radius: f64,
) -> Result<f64, OpError> {
    let raw = raw_length_estimate(target_frequency, throat_radius, mouth_radius)?;
    let length = raw
        .clamp(MIN_ESTIMATED_LENGTH, MAX_ESTIMATED_LENGTH)
        .round();
    debug!(target_frequency, raw, length, "estimated horn length");
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hundred_hertz_clamps_to_maximum() {
        let raw = raw_length_estimate(100.0, 12.5, 150.0).unwrap();
        assert_relative_eq!(raw, 857.5 * 12.0f64.ln(), epsilon = 1e-9);
        assert!(raw > 2130.0 && raw < 2132.0);
        assert_eq!(estimate_length(100.0, 12.5, 150.0).unwrap(), 2000.0);
    }

    #[test]
    fn mid_range_is_rounded() {
        // 343000 / 500 / 4 * ln(12) = 171.5 * 2.4849 = 426.16
        assert_eq!(estimate_length(500.0, 12.5, 150.0).unwrap(), 426.0);
    }

    #[test]
    fn high_frequency_clamps_to_minimum() {
        assert_eq!(estimate_length(20_000.0, 12.5, 15.0).unwrap(), 50.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(estimate_length(0.0, 12.5, 150.0).is_err());
        assert!(estimate_length(-10.0, 12.5, 150.0).is_err());
        assert!(estimate_length(100.0, 0.0, 150.0).is_err());
        assert!(estimate_length(100.0, 150.0, 150.0).is_err());
        assert!(matches!(
            estimate_length(100.0, 150.0, 12.5),
            Err(OpError::InvalidParameter { .. })
        ));
    }
}
