//! # Shot & Safety Calculations
//!
//! Every formula here is a pure function of an [`InputSnapshot`]. None of them
//! fail: missing, non-finite or non-positive inputs give zero results and, where
//! relevant, a warning.
//!
//! ## Propagation
//!
//! ```text
//! activity ─┐
//! isotope ──┼─────────────────────────────► emergency distance
//!           │
//! time/count/override ─► total minutes ─► time fraction ─┬─► unshielded distance
//!           │                                            │
//! layers (+ collimator) ─► attenuation ──────────────────┴─► 2 / 100 mR/hr boundaries
//!           │                  │
//! distance, target ────────────┴─────────────────────────► required exposure time
//!
//! focus spot + shot cards ─► shot geometry ─┐
//! job/source completeness ──────────────────┴─► warnings
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rt_core::calculations::calculate;
//! use rt_core::config::EngineConfig;
//! use rt_core::snapshot::{FormField, InputSnapshot};
//!
//! let snapshot = InputSnapshot::default()
//!     .with_field(FormField::SourceActivity, "100")
//!     .with_field(FormField::TimePerExposure, "10")
//!     .with_field(FormField::NumberOfExposures, "3");
//!
//! let result = calculate(&snapshot, &EngineConfig::default());
//! assert_eq!(result.time_fraction, 0.5);
//! assert!((result.boundary_public_ft - 360.555).abs() < 1e-3);
//! ```

pub mod boundary;
pub mod exposure;
pub mod geometry;
pub mod shielding;
pub mod warnings;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::snapshot::InputSnapshot;

// Re-export commonly used types
pub use boundary::DoseInputs;
pub use exposure::ExposureTimeInput;
pub use geometry::{CheckStatus, FieldRecommendation, ShotGeometry};
pub use warnings::{Severity, Warning, WarningKind};

/// Public dose-rate limit, mR/hr
pub const PUBLIC_DOSE_LIMIT_MR_HR: f64 = 2.0;

/// Radiation-area dose-rate limit, mR/hr
pub const RADIATION_AREA_LIMIT_MR_HR: f64 = 100.0;

/// Finite and strictly positive
pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Every derived quantity for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Gamma constant of the selected isotope, mR/hr per Ci at 1 ft
    pub isotope_constant: f64,

    pub total_exposure_minutes: f64,

    /// Same value as the total, shown as beam-on minutes per hour
    pub beam_minutes_per_hour: f64,

    pub time_fraction: f64,

    /// Instantaneous dose rate allowed at the public boundary
    pub max_dose_at_public_mr_hr: Option<f64>,

    /// Unified attenuation (layers, plus collimator when enabled)
    pub attenuation_factor: f64,

    /// 2 mR/hr boundary, ft
    pub boundary_public_ft: f64,

    /// 100 mR/hr boundary, ft
    pub boundary_radiation_area_ft: f64,

    pub distance_without_shielding_ft: f64,

    pub distance_with_shielding_ft: f64,

    pub emergency_distance_ft: f64,

    pub shots: Vec<ShotGeometry>,

    /// Exposure needed to reach the target intensity
    pub exposure_minutes: f64,

    pub warnings: Vec<Warning>,
}

impl CalculationResult {
    /// True when every evaluated shot passes its enabled checks.
    pub fn all_shots_pass(&self) -> bool {
        self.shots.iter().all(ShotGeometry::passes)
    }
}

/// Run every calculation for `snapshot`.
pub fn calculate(snapshot: &InputSnapshot, config: &EngineConfig) -> CalculationResult {
    let isotope_constant = snapshot.isotope.constant();
    let activity_ci = snapshot.source_activity_ci.unwrap_or(0.0);
    let focus_spot_in = snapshot.focus_spot_in.unwrap_or(0.0);

    let total_minutes = exposure::total_exposure_minutes(snapshot);
    let time_fraction = exposure::time_fraction(total_minutes);
    let attenuation = shielding::effective_attenuation(&snapshot.layers, config);

    let dose = DoseInputs {
        activity_ci,
        isotope_constant,
        time_fraction,
        attenuation,
    };

    let shots: Vec<ShotGeometry> = snapshot
        .shots
        .iter()
        .map(|shot| geometry::evaluate_shot(focus_spot_in, shot, config))
        .collect();

    let exposure_minutes = exposure::required_exposure_minutes(&ExposureTimeInput {
        activity_ci,
        isotope_constant,
        distance_ft: snapshot.exposure_distance_ft.unwrap_or(0.0),
        attenuation,
        target_intensity: snapshot.target_intensity.unwrap_or(0.0),
    });

    let warnings = warnings::collect_warnings(snapshot, &shots);

    tracing::debug!(
        isotope = %snapshot.isotope,
        total_minutes,
        time_fraction,
        attenuation,
        shots = shots.len(),
        warnings = warnings.len(),
        "calculated shot plan"
    );

    CalculationResult {
        isotope_constant,
        total_exposure_minutes: total_minutes,
        beam_minutes_per_hour: total_minutes,
        time_fraction,
        max_dose_at_public_mr_hr: exposure::max_dose_at_public(time_fraction),
        attenuation_factor: attenuation,
        boundary_public_ft: boundary::boundary_distance(&dose, PUBLIC_DOSE_LIMIT_MR_HR),
        boundary_radiation_area_ft: boundary::boundary_distance(&dose, RADIATION_AREA_LIMIT_MR_HR),
        distance_without_shielding_ft: boundary::distance_without_shielding(
            &dose,
            PUBLIC_DOSE_LIMIT_MR_HR,
        ),
        distance_with_shielding_ft: boundary::distance_with_shielding(
            &dose,
            PUBLIC_DOSE_LIMIT_MR_HR,
        ),
        emergency_distance_ft: boundary::emergency_distance(&dose, PUBLIC_DOSE_LIMIT_MR_HR),
        shots,
        exposure_minutes,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{FormField, LayerField, ShotField};

    fn field_job() -> InputSnapshot {
        InputSnapshot::default()
            .with_field(FormField::UnitSite, "Crude Unit")
            .with_field(FormField::JobDate, "2026-10-16")
            .with_field(FormField::DrawingNumber, "ISO-2231")
            .with_field(FormField::FocusSpot, "0.1")
            .with_field(FormField::SourceActivity, "100")
            .with_field(FormField::TimePerExposure, "10")
            .with_field(FormField::NumberOfExposures, "3")
    }

    #[test]
    fn test_end_to_end_boundaries() {
        let result = calculate(&field_job(), &EngineConfig::default());
        assert_eq!(result.isotope_constant, 5200.0);
        assert_eq!(result.total_exposure_minutes, 30.0);
        assert_eq!(result.beam_minutes_per_hour, 30.0);
        assert_eq!(result.time_fraction, 0.5);
        assert_eq!(result.max_dose_at_public_mr_hr, Some(4.0));
        assert_eq!(result.attenuation_factor, 1.0);
        assert!((result.boundary_public_ft - 130_000.0_f64.sqrt()).abs() < 1e-9);
        assert!((result.boundary_radiation_area_ft - 2_600.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(result.distance_with_shielding_ft, result.boundary_public_ft);
        assert_eq!(result.distance_without_shielding_ft, result.boundary_public_ft);
        assert!((result.emergency_distance_ft - 260_000.0_f64.sqrt()).abs() < 1e-9);
        assert!(result.warnings[0].is_all_clear());
    }

    #[test]
    fn test_shielding_pulls_boundary_in() {
        let (snapshot, id) = field_job().with_layer_added();
        let snapshot = snapshot.with_layer_field(id, LayerField::HvlCount, "2")
            .unwrap();
        let result = calculate(&snapshot, &EngineConfig::default());

        assert_eq!(result.attenuation_factor, 0.25);
        assert!((result.boundary_public_ft - (130_000.0_f64 * 0.25).sqrt()).abs() < 1e-9);
        assert!(result.distance_without_shielding_ft > result.distance_with_shielding_ft);
    }

    #[test]
    fn test_collimator_variant_uses_one_attenuation_everywhere() {
        let snapshot = field_job()
            .with_field(FormField::ExposureDistance, "10")
            .with_field(FormField::TargetIntensity, "2");
        let config = EngineConfig {
            include_collimator_hvl: true,
            collimator_hvl_count: 1.0,
            ..EngineConfig::default()
        };

        let plain = calculate(&snapshot, &EngineConfig::default());
        let collimated = calculate(&snapshot, &config);

        assert_eq!(collimated.attenuation_factor, 0.5);
        let expected_boundary = plain.boundary_public_ft / 2.0_f64.sqrt();
        assert!((collimated.boundary_public_ft - expected_boundary).abs() < 1e-9);
        assert!((collimated.exposure_minutes - plain.exposure_minutes * 2.0).abs() < 1e-12);
        // Unshielded and emergency distances never see the collimator
        assert_eq!(collimated.distance_without_shielding_ft, plain.distance_without_shielding_ft);
        assert_eq!(collimated.emergency_distance_ft, plain.emergency_distance_ft);
    }

    #[test]
    fn test_nothing_scheduled() {
        let snapshot = field_job().with_field(FormField::NumberOfExposures, "");
        let result = calculate(&snapshot, &EngineConfig::default());
        assert_eq!(result.time_fraction, 0.0);
        assert_eq!(result.max_dose_at_public_mr_hr, None);
        assert_eq!(result.boundary_public_ft, 0.0);
        assert!(result.emergency_distance_ft > 0.0);
    }

    #[test]
    fn test_unknown_isotope_zeroes_dose() {
        let snapshot = field_job().with_field(FormField::Isotope, "Cs-137");
        let result = calculate(&snapshot, &EngineConfig::default());
        assert_eq!(result.isotope_constant, 0.0);
        assert_eq!(result.boundary_public_ft, 0.0);
        assert_eq!(result.emergency_distance_ft, 0.0);
    }

    #[test]
    fn test_shots_are_evaluated_in_order() {
        let (snapshot, first) = field_job().with_shot_added();
        let (snapshot, second) = snapshot.with_shot_added();
        let snapshot = snapshot
            .with_shot_field(first, ShotField::Pdd, "4")
            .unwrap()
            .with_shot_field(first, ShotField::Spd, "10")
            .unwrap()
            .with_shot_field(second, ShotField::Pdd, "4")
            .unwrap()
            .with_shot_field(second, ShotField::Spd, "20")
            .unwrap();

        let result = calculate(&snapshot, &EngineConfig::default());
        assert_eq!(result.shots[0].shot_id, first);
        assert_eq!(result.shots[1].shot_id, second);
        assert!(!result.all_shots_pass());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].message, "Shot 1: UG exceeds 0.024.");
    }

    #[test]
    fn test_result_serialization() {
        let result = calculate(&field_job(), &EngineConfig::default());
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("boundary_public_ft"));
        assert!(json.contains("NoActiveWarnings"));

        let roundtrip: CalculationResult = serde_json::from_str(&json).unwrap();
        assert!((roundtrip.boundary_public_ft - result.boundary_public_ft).abs() < 1e-9);
        assert_eq!(roundtrip.warnings, result.warnings);
    }
}
