//! # Exposure Duration
//!
//! Beam-on time per hour, the duty-cycle fraction it implies, and the
//! exposure time needed to reach a target film intensity.

use serde::{Deserialize, Serialize};

use crate::calculations::{is_positive, PUBLIC_DOSE_LIMIT_MR_HR};
use crate::isotope::TimeUnit;
use crate::snapshot::InputSnapshot;
use crate::units::{Hours, Minutes, Seconds};

/// Total beam-on minutes per hour.
///
/// A valid override (finite, ≥ 0) wins outright. Otherwise a blank per-exposure
/// time or count gives 0, and so do negative values.
pub fn total_exposure_minutes(snapshot: &InputSnapshot) -> f64 {
    if let Some(value) = snapshot.total_exposure_minutes_override {
        if value.is_finite() && value >= 0.0 {
            return value;
        }
    }

    let (Some(per_exposure), Some(count)) =
        (snapshot.time_per_exposure, snapshot.number_of_exposures)
    else {
        return 0.0;
    };

    if !per_exposure.is_finite() || !count.is_finite() || per_exposure < 0.0 || count < 0.0 {
        return 0.0;
    }

    let per_exposure = match snapshot.exposure_time_unit {
        TimeUnit::Minutes => Minutes(per_exposure),
        TimeUnit::Seconds => Seconds(per_exposure).into(),
    };
    (per_exposure * count).0
}

/// Fraction of each hour the source is out (0 when nothing is scheduled).
pub fn time_fraction(total_minutes: f64) -> f64 {
    if is_positive(total_minutes) {
        Hours::from(Minutes(total_minutes)).0
    } else {
        0.0
    }
}

/// Maximum instantaneous dose rate at the public boundary that still averages
/// to the public limit over an hour. `None` when nothing is scheduled.
pub fn max_dose_at_public(time_fraction: f64) -> Option<f64> {
    is_positive(time_fraction).then(|| PUBLIC_DOSE_LIMIT_MR_HR / time_fraction)
}

/// Inputs to the required exposure time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureTimeInput {
    pub activity_ci: f64,
    pub isotope_constant: f64,
    pub distance_ft: f64,
    pub attenuation: f64,
    pub target_intensity: f64,
}

/// Minutes needed to deliver `target_intensity` at `distance_ft`.
///
/// Intensity at distance is `Ci × Γ × attenuation / d²` (mR/hr); the target
/// divided by that rate is the exposure in hours.
pub fn required_exposure_minutes(input: &ExposureTimeInput) -> f64 {
    let factors = [
        input.activity_ci,
        input.isotope_constant,
        input.distance_ft,
        input.attenuation,
        input.target_intensity,
    ];
    if !factors.iter().all(|&v| is_positive(v)) {
        return 0.0;
    }

    let intensity = input.activity_ci * input.isotope_constant * input.attenuation
        / (input.distance_ft * input.distance_ft);
    let minutes = Minutes::from(Hours(input.target_intensity / intensity)).0;

    if minutes.is_finite() {
        minutes.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::FormField;

    fn snapshot(per_exposure: &str, count: &str) -> InputSnapshot {
        InputSnapshot::default()
            .with_field(FormField::TimePerExposure, per_exposure)
            .with_field(FormField::NumberOfExposures, count)
    }

    #[test]
    fn test_minutes_times_count() {
        assert_eq!(total_exposure_minutes(&snapshot("10", "3")), 30.0);
    }

    #[test]
    fn test_seconds_are_converted() {
        let s = snapshot("90", "4").with_field(FormField::ExposureTimeUnit, "seconds");
        assert_eq!(total_exposure_minutes(&s), 6.0);
    }

    #[test]
    fn test_blank_inputs_give_zero() {
        assert_eq!(total_exposure_minutes(&snapshot("", "3")), 0.0);
        assert_eq!(total_exposure_minutes(&snapshot("10", "")), 0.0);
    }

    #[test]
    fn test_negative_inputs_give_zero() {
        assert_eq!(total_exposure_minutes(&snapshot("-10", "3")), 0.0);
        assert_eq!(total_exposure_minutes(&snapshot("10", "-3")), 0.0);
    }

    #[test]
    fn test_override_wins() {
        let s = snapshot("10", "3").with_field(FormField::TotalExposureMinutesOverride, "12");
        assert_eq!(total_exposure_minutes(&s), 12.0);

        // Zero is a valid override
        let s = snapshot("10", "3").with_field(FormField::TotalExposureMinutesOverride, "0");
        assert_eq!(total_exposure_minutes(&s), 0.0);

        // Negative overrides are ignored
        let s = snapshot("10", "3").with_field(FormField::TotalExposureMinutesOverride, "-5");
        assert_eq!(total_exposure_minutes(&s), 30.0);
    }

    #[test]
    fn test_time_fraction() {
        assert_eq!(time_fraction(30.0), 0.5);
        assert_eq!(time_fraction(0.0), 0.0);
        assert_eq!(time_fraction(-4.0), 0.0);
    }

    #[test]
    fn test_max_dose_at_public() {
        assert_eq!(max_dose_at_public(0.5), Some(4.0));
        assert_eq!(max_dose_at_public(0.0), None);
    }

    #[test]
    fn test_required_exposure_minutes() {
        let input = ExposureTimeInput {
            activity_ci: 100.0,
            isotope_constant: 5200.0,
            distance_ft: 2.0,
            attenuation: 1.0,
            target_intensity: 2.0,
        };
        // 520000 / 4 = 130000 mR/hr; 2 / 130000 h * 60
        let expected = 2.0 / 130_000.0 * 60.0;
        assert!((required_exposure_minutes(&input) - expected).abs() < 1e-12);

        let shielded = ExposureTimeInput { attenuation: 0.5, ..input };
        assert!((required_exposure_minutes(&shielded) - 2.0 * expected).abs() < 1e-12);
    }

    #[test]
    fn test_required_exposure_zero_guards() {
        let input = ExposureTimeInput {
            activity_ci: 100.0,
            isotope_constant: 5200.0,
            distance_ft: 2.0,
            attenuation: 1.0,
            target_intensity: 2.0,
        };
        let minutes = |input: ExposureTimeInput| required_exposure_minutes(&input);
        assert_eq!(minutes(ExposureTimeInput { distance_ft: 0.0, ..input }), 0.0);
        assert_eq!(minutes(ExposureTimeInput { isotope_constant: 0.0, ..input }), 0.0);
        assert_eq!(minutes(ExposureTimeInput { target_intensity: -1.0, ..input }), 0.0);
        assert_eq!(minutes(ExposureTimeInput { activity_ci: f64::NAN, ..input }), 0.0);
    }
}
