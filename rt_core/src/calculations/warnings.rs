//! # Warnings
//!
//! Aggregates the advisory warnings shown beside the results. Order is fixed:
//! the missing-inputs warning first, then per-shot warnings in shot order. An
//! empty list is never returned; a neutral marker stands in for "all clear".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::geometry::{CheckStatus, ShotGeometry, BLOW_UP_LIMIT_RATIO, UG_LIMIT_IN};
use crate::snapshot::InputSnapshot;

/// How prominently a warning should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Neutral marker
    Info,
    /// Incomplete form
    Caution,
    /// A shot fails an acceptance check
    Critical,
}

/// What triggered a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WarningKind {
    MissingRequiredInputs,
    UnsharpnessExceeded { shot_number: usize, shot_id: Uuid },
    BlowUpExceeded { shot_number: usize, shot_id: Uuid },
    NoActiveWarnings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
}

impl Warning {
    fn new(kind: WarningKind) -> Self {
        let (severity, message) = match kind {
            WarningKind::MissingRequiredInputs => (
                Severity::Caution,
                "Missing required inputs in Job Information or Source Information.".to_string(),
            ),
            WarningKind::UnsharpnessExceeded { shot_number, .. } => (
                Severity::Critical,
                format!("Shot {}: UG exceeds {}.", shot_number, UG_LIMIT_IN),
            ),
            WarningKind::BlowUpExceeded { shot_number, .. } => (
                Severity::Critical,
                format!("Shot {}: blow-up exceeds {}%.", shot_number, BLOW_UP_LIMIT_RATIO * 100.0),
            ),
            WarningKind::NoActiveWarnings => (Severity::Info, "No active warnings.".to_string()),
        };
        Warning { kind, severity, message }
    }

    /// True for the neutral "no active warnings" marker
    pub fn is_all_clear(&self) -> bool {
        self.kind == WarningKind::NoActiveWarnings
    }
}

/// Collect warnings for a snapshot and its evaluated shots.
pub fn collect_warnings(snapshot: &InputSnapshot, shots: &[ShotGeometry]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if snapshot.missing_required() {
        warnings.push(Warning::new(WarningKind::MissingRequiredInputs));
    }

    for (index, shot) in shots.iter().enumerate() {
        let shot_number = index + 1;
        if shot.ug_status == CheckStatus::Fail {
            warnings.push(Warning::new(WarningKind::UnsharpnessExceeded {
                shot_number,
                shot_id: shot.shot_id,
            }));
        }
        if shot.blow_up_status == Some(CheckStatus::Fail) {
            warnings.push(Warning::new(WarningKind::BlowUpExceeded {
                shot_number,
                shot_id: shot.shot_id,
            }));
        }
    }

    if warnings.is_empty() {
        warnings.push(Warning::new(WarningKind::NoActiveWarnings));
    }

    warnings
}
