//! # Shot Geometry
//!
//! Image-quality geometry for a single shot from the focal spot size `d` and
//! the two distances on the shot card.
//!
//! ## Formulas
//!
//! - Unsharpness: `Ug = d × PDD / SPD`, acceptable up to 0.024 in
//! - Magnification: `(SPD + PDD) / SPD`
//! - Blow-up: `PDD / SPD × 100`, acceptable up to 20%
//! - Required SPD: the larger of `d × PDD / 0.024` and `PDD / 0.2`
//!
//! A second, field-rule acceptance method multiplies PDD by a focal-spot
//! banded factor (6, 7 or 8). It is reported alongside the threshold method,
//! never merged with it.
//!
//! ## Example
//!
//! ```rust
//! use rt_core::calculations::geometry::{evaluate_shot, CheckStatus};
//! use rt_core::config::EngineConfig;
//! use rt_core::snapshot::{ListEntry, ShotCard};
//! use uuid::Uuid;
//!
//! let shot = ShotCard { pdd_in: 4.0, spd_in: 20.0, ..ShotCard::blank(Uuid::new_v4()) };
//! let result = evaluate_shot(0.1, &shot, &EngineConfig::default());
//!
//! assert!((result.ug - 0.02).abs() < 1e-12);
//! assert_eq!(result.ug_status, CheckStatus::Pass);
//! assert!((result.required_spd_final - 20.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::is_positive;
use crate::config::EngineConfig;
use crate::snapshot::ShotCard;

/// Maximum acceptable geometric unsharpness, inches
pub const UG_LIMIT_IN: f64 = 0.024;

/// Maximum acceptable blow-up as a ratio (20%)
pub const BLOW_UP_LIMIT_RATIO: f64 = 0.2;

/// Pass/fail outcome of a single acceptance check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    fn failing_when(exceeded: bool) -> Self {
        if exceeded {
            CheckStatus::Fail
        } else {
            CheckStatus::Pass
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
        }
    }
}

/// Focal-spot multiplier method: SPD should be at least PDD × multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldRecommendation {
    /// 6, 7 or 8 by focal spot band; 0 when the focal spot is not positive
    pub required_multiplier: u8,

    /// PDD × multiplier, inches
    pub recommended_spd_in: f64,

    /// Unsharpness if the shot were taken at the recommended SPD
    pub ug_at_recommended: f64,
}

/// Geometry results for one shot card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotGeometry {
    pub shot_id: Uuid,

    pub pdd_in: f64,

    pub spd_in: f64,

    /// Geometric unsharpness, inches
    pub ug: f64,

    pub magnification: f64,

    pub blow_up_percent: f64,

    /// SPD that brings Ug down to the limit
    pub required_spd_for_ug: f64,

    /// SPD that brings blow-up down to 20%
    pub required_spd_for_blow_up: f64,

    /// The binding (larger) of the two required SPDs
    pub required_spd_final: f64,

    pub ug_status: CheckStatus,

    /// `None` when the blow-up check is switched off
    pub blow_up_status: Option<CheckStatus>,

    /// `None` when the multiplier heuristic is switched off
    pub recommendation: Option<FieldRecommendation>,
}

impl ShotGeometry {
    /// True when every enabled acceptance check passes.
    pub fn passes(&self) -> bool {
        self.ug_status == CheckStatus::Pass && self.blow_up_status != Some(CheckStatus::Fail)
    }

    /// Check if geometry could be evaluated (focal spot and both distances positive)
    pub fn is_complete(&self) -> bool {
        self.magnification > 0.0
    }
}

/// Multiplier band for a focal spot size.
pub fn required_multiplier(focus_spot_in: f64) -> u8 {
    if !is_positive(focus_spot_in) {
        0
    } else if focus_spot_in < 0.12 {
        6
    } else if focus_spot_in < 0.14 {
        7
    } else {
        8
    }
}

/// Field recommendation from focal spot and PDD.
///
/// Needs only `d` and PDD, so it is available before an SPD has been entered.
pub fn field_recommendation(focus_spot_in: f64, pdd_in: f64) -> FieldRecommendation {
    let required_multiplier = required_multiplier(focus_spot_in);
    let recommended_spd_in = if is_positive(pdd_in) && required_multiplier > 0 {
        pdd_in * f64::from(required_multiplier)
    } else {
        0.0
    };
    let ug_at_recommended = if recommended_spd_in > 0.0 {
        focus_spot_in * pdd_in / recommended_spd_in
    } else {
        0.0
    };

    FieldRecommendation {
        required_multiplier,
        recommended_spd_in,
        ug_at_recommended,
    }
}

/// Evaluate one shot card against the focal spot size.
pub fn evaluate_shot(focus_spot_in: f64, shot: &ShotCard, config: &EngineConfig) -> ShotGeometry {
    let d = focus_spot_in;
    let pdd = shot.pdd_in;
    let spd = shot.spd_in;

    let recommendation = config
        .use_multiplier_heuristic
        .then(|| field_recommendation(d, pdd));
    let blow_up_status = config.check_blow_up.then_some(CheckStatus::Pass);

    if !(is_positive(d) && is_positive(pdd) && is_positive(spd)) {
        return ShotGeometry {
            shot_id: shot.id,
            pdd_in: pdd,
            spd_in: spd,
            ug: 0.0,
            magnification: 0.0,
            blow_up_percent: 0.0,
            required_spd_for_ug: 0.0,
            required_spd_for_blow_up: 0.0,
            required_spd_final: 0.0,
            ug_status: CheckStatus::Pass,
            blow_up_status,
            recommendation,
        };
    }

    let ug = d * pdd / spd;
    let blow_up_percent = pdd / spd * 100.0;
    let required_spd_for_ug = d * pdd / UG_LIMIT_IN;
    let required_spd_for_blow_up = pdd / BLOW_UP_LIMIT_RATIO;

    ShotGeometry {
        shot_id: shot.id,
        pdd_in: pdd,
        spd_in: spd,
        ug,
        magnification: (spd + pdd) / spd,
        blow_up_percent,
        required_spd_for_ug,
        required_spd_for_blow_up,
        required_spd_final: required_spd_for_ug.max(required_spd_for_blow_up),
        ug_status: CheckStatus::failing_when(ug > UG_LIMIT_IN),
        blow_up_status: config
            .check_blow_up
            .then(|| CheckStatus::failing_when(blow_up_percent > BLOW_UP_LIMIT_RATIO * 100.0)),
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ListEntry;

    fn shot(pdd_in: f64, spd_in: f64) -> ShotCard {
        ShotCard {
            pdd_in,
            spd_in,
            ..ShotCard::blank(Uuid::new_v4())
        }
    }

    fn strict() -> EngineConfig {
        EngineConfig {
            check_blow_up: true,
            use_multiplier_heuristic: false,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_unsharpness_pass() {
        let result = evaluate_shot(0.1, &shot(4.0, 20.0), &EngineConfig::default());
        assert!((result.ug - 0.02).abs() < 1e-12);
        assert!((result.magnification - 1.2).abs() < 1e-12);
        assert!((result.blow_up_percent - 20.0).abs() < 1e-12);
        assert_eq!(result.ug_status, CheckStatus::Pass);
        assert!(result.passes());
    }

    #[test]
    fn test_unsharpness_fail() {
        let result = evaluate_shot(0.1, &shot(4.0, 10.0), &EngineConfig::default());
        assert!((result.ug - 0.04).abs() < 1e-12);
        assert_eq!(result.ug_status, CheckStatus::Fail);
        assert!(!result.passes());
    }

    #[test]
    fn test_required_spd_takes_binding_constraint() {
        let result = evaluate_shot(0.1, &shot(4.0, 20.0), &EngineConfig::default());
        assert!((result.required_spd_for_ug - 0.4 / 0.024).abs() < 1e-9);
        assert!((result.required_spd_for_blow_up - 20.0).abs() < 1e-12);
        assert!((result.required_spd_final - 20.0).abs() < 1e-12);

        // Large focal spot: unsharpness binds instead
        let big = evaluate_shot(0.2, &shot(4.0, 20.0), &EngineConfig::default());
        assert!((big.required_spd_final - big.required_spd_for_ug).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_geometry_is_zeroed() {
        let invalid = [(0.0, 4.0, 20.0), (0.1, 0.0, 20.0), (0.1, 4.0, 0.0), (0.1, 4.0, -5.0)];
        for (d, pdd, spd) in invalid {
            let result = evaluate_shot(d, &shot(pdd, spd), &strict());
            assert_eq!(result.ug, 0.0);
            assert_eq!(result.magnification, 0.0);
            assert_eq!(result.required_spd_final, 0.0);
            assert!(!result.is_complete());
            assert!(result.passes());
        }
    }

    #[test]
    fn test_multiplier_bands() {
        assert_eq!(required_multiplier(0.0), 0);
        assert_eq!(required_multiplier(0.1), 6);
        assert_eq!(required_multiplier(0.12), 7);
        assert_eq!(required_multiplier(0.13), 7);
        assert_eq!(required_multiplier(0.14), 8);
        assert_eq!(required_multiplier(0.3), 8);
    }

    #[test]
    fn test_field_recommendation() {
        let result = evaluate_shot(0.1, &shot(4.0, 20.0), &EngineConfig::default());
        let rec = result.recommendation.unwrap();
        assert_eq!(rec.required_multiplier, 6);
        assert!((rec.recommended_spd_in - 24.0).abs() < 1e-12);
        assert!((rec.ug_at_recommended - 0.4 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_recommendation_without_spd() {
        let result = evaluate_shot(0.13, &shot(5.0, 0.0), &EngineConfig::default());
        assert_eq!(result.ug, 0.0);
        let rec = result.recommendation.unwrap();
        assert_eq!(rec.required_multiplier, 7);
        assert!((rec.recommended_spd_in - 35.0).abs() < 1e-12);
    }

    #[test]
    fn test_heuristic_can_be_disabled() {
        let result = evaluate_shot(0.1, &shot(4.0, 20.0), &strict());
        assert!(result.recommendation.is_none());
    }

    #[test]
    fn test_blow_up_check() {
        // 5/20 = 25% blow-up, Ug = 0.1*5/20 = 0.025 also fails
        let both = evaluate_shot(0.1, &shot(5.0, 20.0), &strict());
        assert_eq!(both.blow_up_status, Some(CheckStatus::Fail));

        // Tiny focal spot: Ug passes, blow-up alone fails
        let blow_up_only = evaluate_shot(0.01, &shot(5.0, 20.0), &strict());
        assert_eq!(blow_up_only.ug_status, CheckStatus::Pass);
        assert_eq!(blow_up_only.blow_up_status, Some(CheckStatus::Fail));
        assert!(!blow_up_only.passes());

        // Same shot with the check off passes
        let lenient = evaluate_shot(0.01, &shot(5.0, 20.0), &EngineConfig::default());
        assert_eq!(lenient.blow_up_status, None);
        assert!(lenient.passes());
    }

    #[test]
    fn test_exactly_twenty_percent_passes() {
        let result = evaluate_shot(0.01, &shot(4.0, 20.0), &strict());
        assert_eq!(result.blow_up_status, Some(CheckStatus::Pass));
    }
}
