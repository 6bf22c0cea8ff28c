//! Horn wall profiles.
//!
//! Both curves are anchored: the first sample sits at the throat
//! `(0, throat_radius)` and the last at the mouth `(length, mouth_radius)`,
//! exactly. Every sample radius lies in `[throat_radius, mouth_radius]`.

use horn_types::{AcousticParameters, ProfileKind, ProfileSample};
use tracing::{debug, instrument};

/// Fraction of the horn length at which the tractrix taper reaches its knee.
const TRACTRIX_KNEE: f64 = 0.3;

/// Exponent applied to the tractrix smoothing divisor.
const TRACTRIX_TAPER_EXPONENT: f64 = 0.3;

/// Sample the horn wall into `sample_count + 1` points from throat to mouth.
///
/// Parameters are validated on construction, so this cannot fail.
#[instrument(skip_all, fields(kind = %params.kind(), samples = params.sample_count() + 1))]
pub fn generate_profile(params: &AcousticParameters) -> Vec<ProfileSample> {
    let n = params.sample_count() as usize;
    let length = params.length();
    let throat = params.throat_radius();
    let mouth = params.mouth_radius();

    let mut samples = Vec::with_capacity(n + 1);
    let mut floor = throat;
    for i in 0..=n {
        let t = i as f64 / n as f64;
        let x = t * length;
        let raw = match params.kind() {
            ProfileKind::Exponential => exponential_radius(params, x),
            ProfileKind::Tractrix => tractrix_radius(params, x),
        };
        // The tractrix taper can dip below an earlier sample for gentle
        // expansions; keep the wall non-decreasing.
        let radius = raw.clamp(throat, mouth).max(floor);
        floor = radius;
        samples.push(ProfileSample::new(x, radius));
    }

    samples[0] = ProfileSample::new(0.0, throat);
    samples[n] = ProfileSample::new(length, mouth);

    debug!(
        mid_radius = samples[n / 2].radius,
        "generated horn profile"
    );
    samples
}

/// Flare constant `k = ln(mouth / throat) / length`, per millimetre.
pub fn flare_constant(params: &AcousticParameters) -> f64 {
    params.expansion_log() / params.length()
}

/// `r(x) = throat * e^(k x)`.
pub fn exponential_radius(params: &AcousticParameters, x: f64) -> f64 {
    params.throat_radius() * (flare_constant(params) * x).exp()
}

/// Tapered exponential used as a tractrix-like flare.
///
/// This is a design approximation, not the solution of the tractrix
/// differential equation: the exponential radius is divided by
/// `((1 + (x / (0.3 L))^2)^0.5)^0.3`, which slows the flare towards the
/// mouth. Callers clamp the result into the throat/mouth range.
///
/// At `x = L` the taper leaves the radius well short of the mouth (about
/// `mouth / 1.45` for a 0.3 L knee), and `generate_profile` pins the last
/// sample to the mouth anyway. The final segment therefore jumps to the
/// mouth radius in one step.
pub fn tractrix_radius(params: &AcousticParameters, x: f64) -> f64 {
    let base = exponential_radius(params, x);
    let u = x / (params.length() * TRACTRIX_KNEE);
    let divisor = (1.0 + u * u).sqrt().powf(TRACTRIX_TAPER_EXPONENT);
    base / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exponential() -> AcousticParameters {
        AcousticParameters::new(12.5, 150.0, 300.0, ProfileKind::Exponential, 32).unwrap()
    }

    #[test]
    fn exponential_midpoint_matches_closed_form() {
        let params = exponential();
        assert_relative_eq!(flare_constant(&params), 12.0f64.ln() / 300.0);
        assert_relative_eq!(flare_constant(&params), 0.008282, epsilon = 1e-6);

        let samples = generate_profile(&params);
        assert_eq!(samples.len(), 33);
        let mid = samples[16];
        assert_relative_eq!(mid.axial_position, 150.0);
        // 12.5 * sqrt(12)
        assert_relative_eq!(mid.radius, 12.5 * 12.0f64.sqrt(), epsilon = 1e-9);
        assert!((mid.radius - 43.3).abs() < 0.05);
    }

    #[test]
    fn endpoints_are_exact() {
        for kind in [ProfileKind::Exponential, ProfileKind::Tractrix] {
            let params = AcousticParameters::new(12.5, 150.0, 300.0, kind, 7).unwrap();
            let samples = generate_profile(&params);
            assert_eq!(samples.first().unwrap(), &ProfileSample::new(0.0, 12.5));
            assert_eq!(samples.last().unwrap(), &ProfileSample::new(300.0, 150.0));
        }
    }

    #[test]
    fn tractrix_tapers_below_exponential() {
        let exp = exponential();
        let trac = AcousticParameters::new(12.5, 150.0, 300.0, ProfileKind::Tractrix, 32).unwrap();
        let e = generate_profile(&exp);
        let t = generate_profile(&trac);
        for i in 1..32 {
            assert!(t[i].radius <= e[i].radius, "sample {i}");
        }
    }

    #[test]
    fn tractrix_last_segment_steps_to_the_mouth() {
        let trac = AcousticParameters::new(12.5, 150.0, 300.0, ProfileKind::Tractrix, 32).unwrap();
        let at_mouth = 150.0 / (1.0 + (300.0f64 / 90.0).powi(2)).sqrt().powf(0.3);
        assert_relative_eq!(tractrix_radius(&trac, 300.0), at_mouth, epsilon = 1e-9);
        assert!((at_mouth - 103.2).abs() < 0.1);

        let t = generate_profile(&trac);
        assert!(t[31].radius < 100.0);
        assert_eq!(t[32].radius, 150.0);
        assert_relative_eq!(t[32].axial_position - t[31].axial_position, 9.375);
    }

    #[test]
    fn gentle_tractrix_stays_monotonic_and_clamped() {
        let params = AcousticParameters::new(50.0, 55.0, 400.0, ProfileKind::Tractrix, 64).unwrap();
        let samples = generate_profile(&params);
        for w in samples.windows(2) {
            assert!(w[1].radius >= w[0].radius);
            assert!(w[1].axial_position >= w[0].axial_position);
        }
        assert!(samples.iter().all(|s| s.radius >= 50.0 && s.radius <= 55.0));
    }
}
