//! # Boundary Distances
//!
//! Inverse-square distances at which a dose-rate limit is met. All four
//! variants share one radicand, `Ci × Γ × [time fraction] × [attenuation] / limit`,
//! and differ only in which factors they keep.
//!
//! ```rust
//! use rt_core::calculations::boundary::{boundary_distance, DoseInputs};
//!
//! let dose = DoseInputs {
//!     activity_ci: 100.0,
//!     isotope_constant: 5200.0,
//!     time_fraction: 0.5,
//!     attenuation: 1.0,
//! };
//! let d = boundary_distance(&dose, 2.0);
//! assert!((d - 130_000.0_f64.sqrt()).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::is_positive;

/// Source strength, duty cycle and shielding for one calculation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseInputs {
    pub activity_ci: f64,

    /// mR/hr per Ci at 1 ft
    pub isotope_constant: f64,

    pub time_fraction: f64,

    pub attenuation: f64,
}

/// `sqrt(product of factors / limit)`, or 0 if any factor or the limit is not positive.
fn guarded_distance(factors: &[f64], dose_limit: f64) -> f64 {
    if !is_positive(dose_limit) || !factors.iter().all(|&v| is_positive(v)) {
        return 0.0;
    }
    let radicand = factors.iter().product::<f64>() / dose_limit;
    let distance = radicand.sqrt();
    if distance.is_finite() {
        distance
    } else {
        0.0
    }
}

/// Distance (ft) at which the time-averaged, shielded dose rate equals `dose_limit`.
pub fn boundary_distance(dose: &DoseInputs, dose_limit: f64) -> f64 {
    guarded_distance(
        &[dose.activity_ci, dose.isotope_constant, dose.time_fraction, dose.attenuation],
        dose_limit,
    )
}

/// Time-averaged distance with all shielding ignored.
pub fn distance_without_shielding(dose: &DoseInputs, dose_limit: f64) -> f64 {
    guarded_distance(&[dose.activity_ci, dose.isotope_constant, dose.time_fraction], dose_limit)
}

/// Time-averaged distance with every shielding source applied.
///
/// `dose.attenuation` is the unified factor, so this matches
/// [`boundary_distance`]; it is reported separately next to the unshielded value.
pub fn distance_with_shielding(dose: &DoseInputs, dose_limit: f64) -> f64 {
    boundary_distance(dose, dose_limit)
}

/// Worst case: continuous beam, no shielding.
pub fn emergency_distance(dose: &DoseInputs, dose_limit: f64) -> f64 {
    guarded_distance(&[dose.activity_ci, dose.isotope_constant], dose_limit)
}
