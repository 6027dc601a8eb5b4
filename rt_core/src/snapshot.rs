//! # Input Snapshot
//!
//! `InputSnapshot` is the immutable record of everything the form holds at one
//! moment. The engine reads it and nothing else; every edit produces a new
//! snapshot rather than mutating the old one.
//!
//! ## Structure
//!
//! ```text
//! InputSnapshot
//! ├── job: JobInfo (unit/site, date, drawing number, CML)
//! ├── source fields (isotope, focus spot, activity)
//! ├── exposure fields (unit, time per exposure, count, override)
//! ├── layers: Vec<MaterialLayer> (shielding stack-up)
//! ├── shots: Vec<ShotCard> (PDD/SPD per planned shot)
//! └── exposure_distance_ft, target_intensity
//! ```
//!
//! Numeric form fields are `Option<f64>`: `None` means the field is blank, and
//! `Some(0.0)` is a real zero that is never replaced by a default.
//!
//! ## Example
//!
//! ```rust
//! use rt_core::snapshot::{FormField, InputSnapshot};
//!
//! let snapshot = InputSnapshot::default()
//!     .with_field(FormField::SourceActivity, "100")
//!     .with_field(FormField::TimePerExposure, "10")
//!     .with_field(FormField::NumberOfExposures, "3");
//!
//! assert_eq!(snapshot.source_activity_ci, Some(100.0));
//!
//! let (snapshot, shot_id) = snapshot.with_shot_added();
//! assert!(snapshot.shots.iter().any(|s| s.id == shot_id));
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{RtError, RtResult};
use crate::isotope::{Isotope, ShieldMaterial, TimeUnit};

/// Default target film intensity used when nothing has been entered
pub const DEFAULT_TARGET_INTENSITY: f64 = 2.0;

/// Parse a raw form value as a number.
///
/// Blank, unparsable and non-finite text all come back as `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format an optional number back to its raw form text (blank for `None`).
pub fn format_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Job identification fields shown at the top of the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobInfo {
    /// Unit or site name
    pub unit_site: String,

    /// Job date as entered (free text, usually YYYY-MM-DD)
    pub job_date: String,

    /// Drawing number
    pub drawing_number: String,

    /// Condition monitoring location
    pub cml: String,
}

/// One layer of the shielding stack-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLayer {
    /// List identity only
    pub id: Uuid,

    pub material: ShieldMaterial,

    /// Layer thickness in inches (display only)
    pub thickness_in: f64,

    /// Number of half-value layers this thickness represents
    pub hvl_count: f64,
}

/// One planned shot: the two distances that drive image geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotCard {
    /// List identity only
    pub id: Uuid,

    /// Pipe-to-detector distance in inches
    pub pdd_in: f64,

    /// Source-to-pipe distance in inches
    pub spd_in: f64,
}

/// Entries of the layer and shot lists.
///
/// Lists are caller-owned; the helpers below return new vectors instead of
/// mutating in place.
pub trait ListEntry: Clone {
    /// Name used in error messages ("layer", "shot")
    const LIST_NAME: &'static str;

    fn id(&self) -> Uuid;

    /// A freshly added entry with zeroed fields
    fn blank(id: Uuid) -> Self;
}

impl ListEntry for MaterialLayer {
    const LIST_NAME: &'static str = "layer";

    fn id(&self) -> Uuid {
        self.id
    }

    fn blank(id: Uuid) -> Self {
        MaterialLayer {
            id,
            material: ShieldMaterial::Steel,
            thickness_in: 0.0,
            hvl_count: 0.0,
        }
    }
}

impl ListEntry for ShotCard {
    const LIST_NAME: &'static str = "shot";

    fn id(&self) -> Uuid {
        self.id
    }

    fn blank(id: Uuid) -> Self {
        ShotCard {
            id,
            pdd_in: 0.0,
            spd_in: 0.0,
        }
    }
}

/// Append a blank entry with a new identifier.
pub fn append_entry<T: ListEntry>(list: &[T]) -> (Vec<T>, Uuid) {
    let id = Uuid::new_v4();
    let mut next = list.to_vec();
    next.push(T::blank(id));
    (next, id)
}

/// Remove the entry with `id`. Unknown ids leave the list unchanged.
pub fn remove_entry<T: ListEntry>(list: &[T], id: Uuid) -> Vec<T> {
    list.iter().filter(|entry| entry.id() != id).cloned().collect()
}

/// Apply `edit` to the entry with `id`, returning the new list.
pub fn edit_entry<T: ListEntry>(
    list: &[T],
    id: Uuid,
    edit: impl FnOnce(&mut T) -> RtResult<()>,
) -> RtResult<Vec<T>> {
    let mut next = list.to_vec();
    let entry = next
        .iter_mut()
        .find(|entry| entry.id() == id)
        .ok_or_else(|| RtError::entry_not_found(T::LIST_NAME, id))?;
    edit(entry)?;
    Ok(next)
}

/// Editable fields of a material layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerField {
    Material,
    Thickness,
    HvlCount,
}

impl FromStr for LayerField {
    type Err = RtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "material" => Ok(LayerField::Material),
            "thickness" => Ok(LayerField::Thickness),
            "hvlCount" => Ok(LayerField::HvlCount),
            other => Err(RtError::invalid_input(
                "layer field",
                other,
                "Expected material, thickness or hvlCount",
            )),
        }
    }
}

impl MaterialLayer {
    /// Set one field from its raw form value. Non-numeric numbers become 0.
    pub fn set_field(&mut self, field: LayerField, raw: &str) -> RtResult<()> {
        match field {
            LayerField::Material => {
                self.material = ShieldMaterial::from_name(raw).ok_or_else(|| {
                    RtError::invalid_input(
                        "material",
                        raw,
                        "Expected Steel, Concrete, Lead or Tungsten",
                    )
                })?;
            }
            LayerField::Thickness => self.thickness_in = parse_number(raw).unwrap_or(0.0),
            LayerField::HvlCount => self.hvl_count = parse_number(raw).unwrap_or(0.0),
        }
        Ok(())
    }
}

/// Editable fields of a shot card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotField {
    Pdd,
    Spd,
}

impl FromStr for ShotField {
    type Err = RtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdd" => Ok(ShotField::Pdd),
            "spd" => Ok(ShotField::Spd),
            other => Err(RtError::invalid_input("shot field", other, "Expected pdd or spd")),
        }
    }
}

impl ShotCard {
    /// Set one distance from its raw form value. Non-numeric values become 0.
    pub fn set_field(&mut self, field: ShotField, raw: &str) {
        let value = parse_number(raw).unwrap_or(0.0);
        match field {
            ShotField::Pdd => self.pdd_in = value,
            ShotField::Spd => self.spd_in = value,
        }
    }
}

/// Scalar form fields, identified by the same ids the form uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    UnitSite,
    JobDate,
    DrawingNumber,
    Cml,
    Isotope,
    FocusSpot,
    SourceActivity,
    ExposureTimeUnit,
    TimePerExposure,
    NumberOfExposures,
    TotalExposureMinutesOverride,
    ExposureDistance,
    TargetIntensity,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        FormField::UnitSite,
        FormField::JobDate,
        FormField::DrawingNumber,
        FormField::Cml,
        FormField::Isotope,
        FormField::FocusSpot,
        FormField::SourceActivity,
        FormField::ExposureTimeUnit,
        FormField::TimePerExposure,
        FormField::NumberOfExposures,
        FormField::TotalExposureMinutesOverride,
        FormField::ExposureDistance,
        FormField::TargetIntensity,
    ];

    /// Field identifier (e.g., "focusSpot")
    pub fn id(&self) -> &'static str {
        match self {
            FormField::UnitSite => "unitSite",
            FormField::JobDate => "jobDate",
            FormField::DrawingNumber => "drawingNumber",
            FormField::Cml => "cml",
            FormField::Isotope => "isotope",
            FormField::FocusSpot => "focusSpot",
            FormField::SourceActivity => "sourceActivity",
            FormField::ExposureTimeUnit => "exposureTimeUnit",
            FormField::TimePerExposure => "timePerExposure",
            FormField::NumberOfExposures => "numberOfExposures",
            FormField::TotalExposureMinutesOverride => "totalExposureMinutesOverride",
            FormField::ExposureDistance => "exposureDistance",
            FormField::TargetIntensity => "targetIntensity",
        }
    }
}

impl FromStr for FormField {
    type Err = RtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| RtError::invalid_input("field", s, "Unknown form field id"))
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Everything the engine needs for one calculation pass.
///
/// ## JSON Example
///
/// ```json
/// {
///   "job": { "unit_site": "Unit 4", "job_date": "2026-10-16", "drawing_number": "D-101", "cml": "" },
///   "isotope": "IR192",
///   "focus_spot_in": 0.1,
///   "source_activity_ci": 100.0,
///   "exposure_time_unit": "minutes",
///   "time_per_exposure": 10.0,
///   "number_of_exposures": 3.0,
///   "total_exposure_minutes_override": null,
///   "layers": [],
///   "shots": [{ "id": "5b6f0c7e-2a55-4c3e-9f6e-8f2d8d7a9b10", "pdd_in": 4.0, "spd_in": 20.0 }],
///   "exposure_distance_ft": 2.0,
///   "target_intensity": 2.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub job: JobInfo,

    pub isotope: Isotope,

    /// Focal spot size d, inches
    pub focus_spot_in: Option<f64>,

    /// Source activity, curies
    pub source_activity_ci: Option<f64>,

    pub exposure_time_unit: TimeUnit,

    /// Time per exposure in `exposure_time_unit`
    pub time_per_exposure: Option<f64>,

    pub number_of_exposures: Option<f64>,

    /// Replaces the computed total when present and ≥ 0
    pub total_exposure_minutes_override: Option<f64>,

    pub layers: Vec<MaterialLayer>,

    pub shots: Vec<ShotCard>,

    /// Distance for the required-exposure-time calculation, feet
    pub exposure_distance_ft: Option<f64>,

    /// Target film intensity, mR
    pub target_intensity: Option<f64>,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        InputSnapshot {
            job: JobInfo::default(),
            isotope: Isotope::Ir192,
            focus_spot_in: None,
            source_activity_ci: None,
            exposure_time_unit: TimeUnit::Minutes,
            time_per_exposure: None,
            number_of_exposures: Some(0.0),
            total_exposure_minutes_override: None,
            layers: Vec::new(),
            shots: Vec::new(),
            exposure_distance_ft: Some(0.0),
            target_intensity: Some(DEFAULT_TARGET_INTENSITY),
        }
    }
}

impl InputSnapshot {
    /// True when job info or source info is incomplete.
    ///
    /// Drives a warning only; calculations still run.
    pub fn missing_required(&self) -> bool {
        let positive = |v: Option<f64>| v.is_some_and(|v| v > 0.0);
        self.job.unit_site.is_empty()
            || self.job.job_date.is_empty()
            || self.job.drawing_number.is_empty()
            || !positive(self.focus_spot_in)
            || !positive(self.source_activity_ci)
    }

    /// Return a copy with one scalar field set from its raw form value.
    pub fn with_field(&self, field: FormField, raw: &str) -> Self {
        let mut next = self.clone();
        match field {
            FormField::UnitSite => next.job.unit_site = raw.to_string(),
            FormField::JobDate => next.job.job_date = raw.to_string(),
            FormField::DrawingNumber => next.job.drawing_number = raw.to_string(),
            FormField::Cml => next.job.cml = raw.to_string(),
            FormField::Isotope => next.isotope = Isotope::from_code(raw),
            FormField::FocusSpot => next.focus_spot_in = parse_number(raw),
            FormField::SourceActivity => next.source_activity_ci = parse_number(raw),
            FormField::ExposureTimeUnit => next.exposure_time_unit = TimeUnit::from_code(raw),
            FormField::TimePerExposure => next.time_per_exposure = parse_number(raw),
            FormField::NumberOfExposures => next.number_of_exposures = parse_number(raw),
            FormField::TotalExposureMinutesOverride => {
                next.total_exposure_minutes_override = parse_number(raw)
            }
            FormField::ExposureDistance => next.exposure_distance_ft = parse_number(raw),
            FormField::TargetIntensity => next.target_intensity = parse_number(raw),
        }
        next
    }

    /// Raw form text for a scalar field.
    pub fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::UnitSite => self.job.unit_site.clone(),
            FormField::JobDate => self.job.job_date.clone(),
            FormField::DrawingNumber => self.job.drawing_number.clone(),
            FormField::Cml => self.job.cml.clone(),
            FormField::Isotope => self.isotope.code().to_string(),
            FormField::FocusSpot => format_number(self.focus_spot_in),
            FormField::SourceActivity => format_number(self.source_activity_ci),
            FormField::ExposureTimeUnit => self.exposure_time_unit.code().to_string(),
            FormField::TimePerExposure => format_number(self.time_per_exposure),
            FormField::NumberOfExposures => format_number(self.number_of_exposures),
            FormField::TotalExposureMinutesOverride => {
                format_number(self.total_exposure_minutes_override)
            }
            FormField::ExposureDistance => format_number(self.exposure_distance_ft),
            FormField::TargetIntensity => format_number(self.target_intensity),
        }
    }

    pub fn with_layer_added(&self) -> (Self, Uuid) {
        let (layers, id) = append_entry(&self.layers);
        (InputSnapshot { layers, ..self.clone() }, id)
    }

    pub fn with_layer_removed(&self, id: Uuid) -> Self {
        InputSnapshot {
            layers: remove_entry(&self.layers, id),
            ..self.clone()
        }
    }

    pub fn with_layer_field(&self, id: Uuid, field: LayerField, raw: &str) -> RtResult<Self> {
        let layers = edit_entry(&self.layers, id, |layer| layer.set_field(field, raw))?;
        Ok(InputSnapshot { layers, ..self.clone() })
    }

    pub fn with_shot_added(&self) -> (Self, Uuid) {
        let (shots, id) = append_entry(&self.shots);
        (InputSnapshot { shots, ..self.clone() }, id)
    }

    pub fn with_shot_removed(&self, id: Uuid) -> Self {
        InputSnapshot {
            shots: remove_entry(&self.shots, id),
            ..self.clone()
        }
    }

    pub fn with_shot_field(&self, id: Uuid, field: ShotField, raw: &str) -> RtResult<Self> {
        let shots = edit_entry(&self.shots, id, |shot| {
            shot.set_field(field, raw);
            Ok(())
        })?;
        Ok(InputSnapshot { shots, ..self.clone() })
    }

    /// A fresh session starts with one blank layer and one blank shot.
    pub fn with_starter_entries(self) -> Self {
        let mut next = self;
        if next.layers.is_empty() {
            next = next.with_layer_added().0;
        }
        if next.shots.is_empty() {
            next = next.with_shot_added().0;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_default_snapshot() {
        let snapshot = InputSnapshot::default();
        assert_eq!(snapshot.isotope, Isotope::Ir192);
        assert_eq!(snapshot.exposure_time_unit, TimeUnit::Minutes);
        assert_eq!(snapshot.target_intensity, Some(2.0));
        assert!(snapshot.layers.is_empty());
        assert!(snapshot.missing_required());
    }

    #[test]
    fn test_with_field_touches_one_field() {
        let before = InputSnapshot::default();
        let after = before.with_field(FormField::FocusSpot, "0.1");
        assert_eq!(after.focus_spot_in, Some(0.1));
        assert_eq!(InputSnapshot { focus_spot_in: None, ..after }, before);
    }

    #[test]
    fn test_zero_is_kept() {
        let snapshot = InputSnapshot::default().with_field(FormField::TargetIntensity, "0");
        assert_eq!(snapshot.target_intensity, Some(0.0));
        assert_eq!(snapshot.field_value(FormField::TargetIntensity), "0");
    }

    #[test]
    fn test_required_fields() {
        let snapshot = InputSnapshot::default()
            .with_field(FormField::UnitSite, "Unit 4")
            .with_field(FormField::JobDate, "2026-10-16")
            .with_field(FormField::DrawingNumber, "D-101")
            .with_field(FormField::FocusSpot, "0.1")
            .with_field(FormField::SourceActivity, "100");
        assert!(!snapshot.missing_required());

        let no_activity = snapshot.with_field(FormField::SourceActivity, "0");
        assert!(no_activity.missing_required());
    }

    #[test]
    fn test_form_field_ids_roundtrip() {
        for field in FormField::ALL {
            assert_eq!(field.id().parse::<FormField>().unwrap(), field);
        }
        assert!("beamMinutes".parse::<FormField>().is_err());
    }

    #[test]
    fn test_add_edit_remove_layer() {
        let (snapshot, id) = InputSnapshot::default().with_layer_added();
        assert_eq!(snapshot.layers.len(), 1);
        assert_eq!(snapshot.layers[0].hvl_count, 0.0);

        let edited = snapshot.with_layer_field(id, LayerField::HvlCount, "2.5").unwrap();
        assert_eq!(edited.layers[0].hvl_count, 2.5);
        // The original snapshot is untouched
        assert_eq!(snapshot.layers[0].hvl_count, 0.0);

        let edited = edited.with_layer_field(id, LayerField::Material, "Lead").unwrap();
        assert_eq!(edited.layers[0].material, ShieldMaterial::Lead);

        let coerced = edited.with_layer_field(id, LayerField::HvlCount, "lots").unwrap();
        assert_eq!(coerced.layers[0].hvl_count, 0.0);

        let removed = edited.with_layer_removed(id);
        assert!(removed.layers.is_empty());
    }

    #[test]
    fn test_edit_unknown_entry_fails() {
        let snapshot = InputSnapshot::default();
        let result = snapshot.with_shot_field(Uuid::new_v4(), ShotField::Pdd, "4");
        assert!(matches!(result, Err(RtError::EntryNotFound { .. })));
    }

    #[test]
    fn test_remove_unknown_entry_is_noop() {
        let (snapshot, _) = InputSnapshot::default().with_shot_added();
        let after = snapshot.with_shot_removed(Uuid::new_v4());
        assert_eq!(after.shots, snapshot.shots);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let (once, first) = InputSnapshot::default().with_shot_added();
        let (twice, second) = once.with_shot_added();
        assert_ne!(first, second);
        assert_eq!(twice.shots.len(), 2);
    }

    #[test]
    fn test_starter_entries() {
        let snapshot = InputSnapshot::default().with_starter_entries();
        assert_eq!(snapshot.layers.len(), 1);
        assert_eq!(snapshot.shots.len(), 1);

        // Existing entries are left alone
        let again = snapshot.clone().with_starter_entries();
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_snapshot_serialization() {
        let (snapshot, _) = InputSnapshot::default()
            .with_field(FormField::Isotope, "Se-75")
            .with_shot_added();
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        assert!(json.contains("\"Se-75\""));

        let roundtrip: InputSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, snapshot);

        // Missing keys fall back to defaults
        let sparse: InputSnapshot = serde_json::from_str(r#"{"source_activity_ci": 50}"#).unwrap();
        assert_eq!(sparse.source_activity_ci, Some(50.0));
        assert_eq!(sparse.target_intensity, Some(2.0));
    }
}
