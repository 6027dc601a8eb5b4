//! # Sources, Shielding Materials and Time Units
//!
//! Fixed lookup data for the calculator: gamma constants for the supported
//! isotopes, the shielding materials a layer can be made of, and the unit the
//! per-exposure time is entered in.
//!
//! ## Example
//!
//! ```rust
//! use rt_core::isotope::Isotope;
//!
//! let source = Isotope::from_code("IR192");
//! assert_eq!(source.constant(), 5200.0);
//!
//! // Anything unrecognised contributes no dose at all
//! assert_eq!(Isotope::from_code("Cs-137").constant(), 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// Gamma-emitting isotope loaded in the exposure device.
///
/// Serializes to the same codes the form uses (`"IR192"`, `"Co-60"`, `"Se-75"`).
/// Unrecognised codes deserialize to [`Isotope::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Isotope {
    /// Iridium-192
    #[default]
    Ir192,
    /// Cobalt-60
    Co60,
    /// Selenium-75
    Se75,
    /// Any code outside the table; its constant is zero
    Unknown,
}

impl Isotope {
    /// Supported isotopes for selection lists
    pub const ALL: [Isotope; 3] = [Isotope::Ir192, Isotope::Co60, Isotope::Se75];

    /// Gamma constant in mR/hr per curie at 1 ft.
    pub fn constant(&self) -> f64 {
        match self {
            Isotope::Ir192 => 5200.0,
            Isotope::Co60 => 14000.0,
            Isotope::Se75 => 2200.0,
            Isotope::Unknown => 0.0,
        }
    }

    /// Form code (e.g., "IR192")
    pub fn code(&self) -> &'static str {
        match self {
            Isotope::Ir192 => "IR192",
            Isotope::Co60 => "Co-60",
            Isotope::Se75 => "Se-75",
            Isotope::Unknown => "Unknown",
        }
    }

    /// Look up an isotope by form code. Matching is exact, like the select box.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "IR192" => Isotope::Ir192,
            "Co-60" => Isotope::Co60,
            "Se-75" => Isotope::Se75,
            _ => Isotope::Unknown,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Isotope::Ir192 => "Iridium-192",
            Isotope::Co60 => "Cobalt-60",
            Isotope::Se75 => "Selenium-75",
            Isotope::Unknown => "Unknown isotope",
        }
    }
}

impl From<String> for Isotope {
    fn from(code: String) -> Self {
        Isotope::from_code(&code)
    }
}

impl From<Isotope> for String {
    fn from(isotope: Isotope) -> Self {
        isotope.code().to_string()
    }
}

impl std::fmt::Display for Isotope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Material of a shielding layer. Display-only: attenuation uses the layer's HVL count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShieldMaterial {
    #[default]
    Steel,
    Concrete,
    Lead,
    Tungsten,
}

impl ShieldMaterial {
    /// All materials for selection lists
    pub const ALL: [ShieldMaterial; 4] = [
        ShieldMaterial::Steel,
        ShieldMaterial::Concrete,
        ShieldMaterial::Lead,
        ShieldMaterial::Tungsten,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShieldMaterial::Steel => "Steel",
            ShieldMaterial::Concrete => "Concrete",
            ShieldMaterial::Lead => "Lead",
            ShieldMaterial::Tungsten => "Tungsten",
        }
    }

    /// Parse a material name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        ShieldMaterial::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for ShieldMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unit the per-exposure time is entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub fn code(&self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        }
    }

    /// Anything other than "seconds" is treated as minutes, matching the form.
    pub fn from_code(code: &str) -> Self {
        if code.trim() == "seconds" {
            TimeUnit::Seconds
        } else {
            TimeUnit::Minutes
        }
    }
}
