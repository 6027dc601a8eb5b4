//! # Unit Types
//!
//! Lightweight newtype wrappers for the time units that flow through the
//! exposure calculations. Distances stay as plain `f64` fields whose names
//! carry the unit (`_in`, `_ft`), the same way the snapshot and result
//! records do.
//!
//! ## Example
//!
//! ```rust
//! use rt_core::units::{Hours, Minutes, Seconds};
//!
//! let per_exposure: Minutes = Seconds(90.0).into();
//! assert_eq!(per_exposure.0, 1.5);
//!
//! let beam_on: Minutes = Hours(0.5).into();
//! assert_eq!(beam_on.0, 30.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(pub f64);

/// Duration in minutes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Minutes(pub f64);

/// Duration in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(pub f64);

impl From<Seconds> for Minutes {
    fn from(s: Seconds) -> Self {
        Minutes(s.0 / 60.0)
    }
}

impl From<Hours> for Minutes {
    fn from(h: Hours) -> Self {
        Minutes(h.0 * 60.0)
    }
}

impl From<Minutes> for Hours {
    fn from(m: Minutes) -> Self {
        Hours(m.0 / 60.0)
    }
}

/// Repeating an exposure `n` times
impl Mul<f64> for Minutes {
    type Output = Minutes;
    fn mul(self, rhs: f64) -> Minutes {
        Minutes(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversions() {
        assert_eq!(Minutes::from(Seconds(30.0)).0, 0.5);
        assert_eq!(Minutes::from(Hours(2.0)).0, 120.0);
        assert_eq!(Hours::from(Minutes(45.0)).0, 0.75);
    }

    #[test]
    fn test_minutes_scaling() {
        assert_eq!((Minutes(10.0) * 3.0).0, 30.0);
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&Minutes(12.5)).unwrap();
        assert_eq!(json, "12.5");
    }
}
