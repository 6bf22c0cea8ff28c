use std::f64::consts::PI;

use horn_types::{AcousticParameters, ProfileSample};
use serde::Serialize;

use crate::length::SPEED_OF_SOUND_MM_PER_S;
use crate::profile::{exponential_radius, flare_constant};

/// Steps used for the exponential volume integral.
const VOLUME_STEPS: usize = 100;

/// Display-only figures derived from the horn parameters.
///
/// `flare_constant` and `volume_mm3` always use the exponential radius,
/// whatever the profile kind; for a tractrix horn they describe the
/// exponential horn with the same endpoints. `sampled_volume_mm3` is
/// integrated from the generated samples and reflects the actual wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HornMetrics {
    /// Quarter-wave cutoff, Hz.
    pub cutoff_frequency: f64,
    /// Exponential flare rate, per millimetre.
    pub flare_constant: f64,
    /// Enclosed volume of the exponential horn, cubic millimetres.
    pub volume_mm3: f64,
    /// Enclosed volume of the sampled wall, cubic millimetres.
    pub sampled_volume_mm3: f64,
}

impl HornMetrics {
    pub fn compute(params: &AcousticParameters, samples: &[ProfileSample]) -> Self {
        Self {
            cutoff_frequency: SPEED_OF_SOUND_MM_PER_S / (4.0 * params.length()),
            flare_constant: flare_constant(params),
            volume_mm3: exponential_volume(params),
            sampled_volume_mm3: sampled_volume(samples),
        }
    }

    pub fn volume_liters(&self) -> f64 {
        self.volume_mm3 * 1e-6
    }
}

/// Left Riemann sum of `pi r(x)^2 dx` over 100 equal steps.
fn exponential_volume(params: &AcousticParameters) -> f64 {
    let dx = params.length() / VOLUME_STEPS as f64;
    (0..VOLUME_STEPS)
        .map(|i| {
            let r = exponential_radius(params, i as f64 * dx);
            PI * r * r * dx
        })
        .sum()
}

/// Exact volume of the stacked frustums between consecutive samples.
fn sampled_volume(samples: &[ProfileSample]) -> f64 {
    samples
        .windows(2)
        .map(|w| {
            let h = w[1].axial_position - w[0].axial_position;
            let (r0, r1) = (w[0].radius, w[1].radius);
            PI * h * (r0 * r0 + r0 * r1 + r1 * r1) / 3.0
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::generate_profile;
    use approx::assert_relative_eq;
    use horn_types::ProfileKind;

    #[test]
    fn exponential_metrics() {
        let params =
            AcousticParameters::new(12.5, 150.0, 300.0, ProfileKind::Exponential, 32).unwrap();
        let samples = generate_profile(&params);
        let m = HornMetrics::compute(&params, &samples);

        assert_relative_eq!(m.cutoff_frequency, 343_000.0 / 1200.0);
        assert_relative_eq!(m.flare_constant, 12.0f64.ln() / 300.0);

        // Analytic: pi r0^2 (e^(2kL) - 1) / (2k); the left sum undershoots slightly.
        let k = m.flare_constant;
        let exact = PI * 12.5 * 12.5 * (144.0 - 1.0) / (2.0 * k);
        assert!(m.volume_mm3 < exact);
        assert_relative_eq!(m.volume_mm3, exact, max_relative = 0.03);
        assert_relative_eq!(m.sampled_volume_mm3, exact, max_relative = 0.01);
    }

    #[test]
    fn tractrix_reports_exponential_volume_alongside_sampled() {
        let exp = AcousticParameters::new(12.5, 150.0, 300.0, ProfileKind::Exponential, 32).unwrap();
        let trac = AcousticParameters::new(12.5, 150.0, 300.0, ProfileKind::Tractrix, 32).unwrap();
        let me = HornMetrics::compute(&exp, &generate_profile(&exp));
        let mt = HornMetrics::compute(&trac, &generate_profile(&trac));

        assert_eq!(me.volume_mm3, mt.volume_mm3);
        assert_eq!(me.flare_constant, mt.flare_constant);
        assert!(mt.sampled_volume_mm3 < me.sampled_volume_mm3);
    }

    #[test]
    fn cylinder_frustum_volume() {
        let samples = [ProfileSample::new(0.0, 2.0), ProfileSample::new(10.0, 2.0)];
        assert_relative_eq!(sampled_volume(&samples), PI * 4.0 * 10.0, epsilon = 1e-9);
    }
}
