//! # Engine Configuration
//!
//! Switches that select between the two acceptance/shielding variants the
//! calculator has carried over time. Every switch defaults to the behaviour
//! of the current field form.
//!
//! ```json
//! {
//!   "include_collimator_hvl": true,
//!   "collimator_hvl_count": 2.0,
//!   "use_multiplier_heuristic": true,
//!   "check_blow_up": true
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{RtError, RtResult};

/// Calculation variant switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fold a fixed collimator HVL count into the unified attenuation
    pub include_collimator_hvl: bool,

    /// Half-value layers provided by the collimator
    pub collimator_hvl_count: f64,

    /// Compute the focal-spot multiplier field recommendation per shot
    pub use_multiplier_heuristic: bool,

    /// Treat blow-up above 20% as an independent shot failure
    pub check_blow_up: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            include_collimator_hvl: false,
            collimator_hvl_count: 0.0,
            use_multiplier_heuristic: true,
            check_blow_up: false,
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> RtResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            RtError::file_error("read config", path.display().to_string(), e.to_string())
        })?;
        serde_json::from_str(&contents).map_err(|e| RtError::SerializationError {
            reason: format!("Invalid config in {}: {}", path.display(), e),
        })
    }

    /// Collimator half-value layers that apply under this config.
    pub fn collimator_hvl(&self) -> f64 {
        if self.include_collimator_hvl && self.collimator_hvl_count.is_finite() {
            self.collimator_hvl_count.max(0.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn test_defaults_match_field_form() {
        let config = EngineConfig::default();
        assert!(!config.include_collimator_hvl);
        assert!(config.use_multiplier_heuristic);
        assert!(!config.check_blow_up);
        assert_eq!(config.collimator_hvl(), 0.0);
    }

    #[test]
    fn test_collimator_only_counts_when_enabled() {
        let config = EngineConfig {
            collimator_hvl_count: 3.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.collimator_hvl(), 0.0);

        let enabled = EngineConfig {
            include_collimator_hvl: true,
            ..config
        };
        assert_eq!(enabled.collimator_hvl(), 3.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"check_blow_up": true}"#).unwrap();
        assert!(config.check_blow_up);
        assert!(config.use_multiplier_heuristic);
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_dir().join("rt_core_test_config.json");
        let json = r#"{"include_collimator_hvl": true, "collimator_hvl_count": 2}"#;
        std::fs::write(&path, json).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.collimator_hvl(), 2.0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load(Path::new("/nonexistent/rt-config.json"));
        assert!(matches!(result, Err(RtError::FileError { .. })));
    }
}
