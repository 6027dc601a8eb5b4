//! # rt_core - Radiography Shot & Safety Calculation Engine
//!
//! `rt_core` plans industrial radiography shots: boundary distances for
//! public-dose limits, image-quality geometry for each shot, and the exposure
//! time needed to reach a target intensity. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: every calculation is a pure function of an [`InputSnapshot`]
//! - **Never fails**: missing or invalid input degrades to zero plus a warning
//! - **Immutable edits**: field and list edits return a new snapshot
//! - **Advisory only**: results support planning, not compliance sign-off
//!
//! ## Quick Start
//!
//! ```rust
//! use rt_core::{calculate, EngineConfig, FormField, InputSnapshot};
//!
//! let snapshot = InputSnapshot::default()
//!     .with_field(FormField::SourceActivity, "100")
//!     .with_field(FormField::TimePerExposure, "10")
//!     .with_field(FormField::NumberOfExposures, "3");
//!
//! let result = calculate(&snapshot, &EngineConfig::default());
//! println!("2 mR/hr boundary: {:.1} ft", result.boundary_public_ft);
//! ```
//!
//! ## Modules
//!
//! - [`snapshot`] - Input snapshot, field edits, layer and shot lists
//! - [`calculations`] - Shielding, exposure, boundaries, geometry, warnings
//! - [`isotope`] - Isotopes, shield materials, time units
//! - [`config`] - Engine switches
//! - [`session`] - Key/value persistence of form state and drafts
//! - [`report`] - Paginated text and PDF report
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod errors;
pub mod isotope;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, CalculationResult};
pub use config::EngineConfig;
pub use errors::{RtError, RtResult};
pub use isotope::{Isotope, ShieldMaterial, TimeUnit};
pub use snapshot::{FormField, InputSnapshot, LayerField, MaterialLayer, ShotCard, ShotField};
