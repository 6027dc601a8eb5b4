//! # Shielding Attenuation
//!
//! Each layer cuts intensity by `0.5^hvl_count`; the stack-up factor is the
//! product over all layers, so layer order never matters.
//!
//! ```rust
//! use rt_core::calculations::shielding::attenuation;
//! use rt_core::snapshot::InputSnapshot;
//!
//! assert_eq!(attenuation(&[]), 1.0);
//!
//! let (snapshot, id) = InputSnapshot::default().with_layer_added();
//! let snapshot = snapshot
//!     .with_layer_field(id, "hvlCount".parse().unwrap(), "2")
//!     .unwrap();
//! assert_eq!(attenuation(&snapshot.layers), 0.25);
//! ```

use crate::config::EngineConfig;
use crate::snapshot::MaterialLayer;

/// Factor for a number of half-value layers. A NaN count counts as zero; an
/// infinite count blocks everything.
pub fn hvl_factor(hvl_count: f64) -> f64 {
    let count = if hvl_count.is_nan() { 0.0 } else { hvl_count };
    0.5_f64.powf(count)
}

/// Cumulative attenuation of the layer stack-up (1 for no layers).
pub fn attenuation(layers: &[MaterialLayer]) -> f64 {
    layers
        .iter()
        .map(|layer| hvl_factor(layer.hvl_count))
        .product()
}

/// Attenuation used by every shielded quantity: the layer stack-up plus, when
/// the config enables it, the collimator's half-value layers.
pub fn effective_attenuation(layers: &[MaterialLayer], config: &EngineConfig) -> f64 {
    attenuation(layers) * hvl_factor(config.collimator_hvl())
}
