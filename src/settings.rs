//! Admin-configurable engine settings
//!
//! Status thresholds and the two phase weight tables (one per project type).
//! These are held by the external admin-settings collaborator and passed into
//! the engine explicitly — there is no module-level mutable state — which also
//! makes every computation trivially safe to invoke from concurrent callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{PhaseId, ProjectType};

/// Minimum separation between adjacent status thresholds, in percentage
/// points. Keeps the three status buckets meaningfully distinct.
pub const MIN_THRESHOLD_GAP: f64 = 10.0;

/// Status derivation thresholds
///
/// Each value is a completion percentage in [0, 100]. The required ordering is
/// `on_track > at_risk > impacted`, strictly descending, with at least
/// [`MIN_THRESHOLD_GAP`] points between adjacent thresholds. Use
/// [`validate_thresholds`] before accepting admin edits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusThresholds {
    /// Completion at or above this is On Track
    pub on_track: f64,
    /// Completion at or above this (but below `on_track`) is At Risk
    pub at_risk: f64,
    /// Floor of the Impacted bucket; anything below `at_risk` lands here
    pub impacted: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            on_track: 90.0,
            at_risk: 75.0,
            impacted: 60.0,
        }
    }
}

impl StatusThresholds {
    /// Validate this configuration (see [`validate_thresholds`])
    pub fn validate(&self) -> ThresholdValidation {
        validate_thresholds(self.on_track, self.at_risk, self.impacted)
    }
}

/// Result of threshold validation
///
/// A form-validation helper result, not a fault: `error` carries a
/// human-readable reason suitable for rendering next to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ThresholdValidation {
    fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(reason.into()),
        }
    }
}

/// Validate a candidate threshold configuration
///
/// Checks, in order:
/// 1. every threshold is within [0, 100]
/// 2. thresholds are strictly descending (`on_track > at_risk > impacted`)
/// 3. adjacent thresholds are at least [`MIN_THRESHOLD_GAP`] points apart
///
/// Never panics; returns a structured result for inline form rendering.
pub fn validate_thresholds(on_track: f64, at_risk: f64, impacted: f64) -> ThresholdValidation {
    for (label, value) in [
        ("On Track", on_track),
        ("At Risk", at_risk),
        ("Impacted", impacted),
    ] {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return ThresholdValidation::fail(format!(
                "{} threshold must be between 0 and 100 (got {})",
                label, value
            ));
        }
    }

    if on_track <= at_risk {
        return ThresholdValidation::fail(
            "On Track threshold must be greater than At Risk threshold",
        );
    }
    if at_risk <= impacted {
        return ThresholdValidation::fail(
            "At Risk threshold must be greater than Impacted threshold",
        );
    }

    if on_track - at_risk < MIN_THRESHOLD_GAP {
        return ThresholdValidation::fail(format!(
            "On Track and At Risk thresholds must be at least {} points apart",
            MIN_THRESHOLD_GAP
        ));
    }
    if at_risk - impacted < MIN_THRESHOLD_GAP {
        return ThresholdValidation::fail(format!(
            "At Risk and Impacted thresholds must be at least {} points apart",
            MIN_THRESHOLD_GAP
        ));
    }

    ThresholdValidation::ok()
}

/// Phase weight table
///
/// Maps each phase to its contribution weight (a percentage) for overall
/// completion. The table is authoritative; the `weight` cached on a
/// [`crate::model::Phase`] is a display convenience refreshed on recompute.
///
/// Weights do not have to sum to 100 — the engine normalizes against the
/// actual total — but each entry must be a finite value in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    weights: BTreeMap<PhaseId, f64>,
}

impl WeightTable {
    /// Build a table from explicit per-phase weights, in the fixed phase order
    pub fn new(feasibility: f64, planning: f64, execution: f64, close: f64) -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(PhaseId::Feasibility, feasibility);
        weights.insert(PhaseId::Planning, planning);
        weights.insert(PhaseId::Execution, execution);
        weights.insert(PhaseId::Close, close);
        Self { weights }
    }

    /// Default weights for Complex Projects
    pub fn complex_default() -> Self {
        Self::new(15.0, 35.0, 45.0, 5.0)
    }

    /// Default weights for Asset Purchases
    ///
    /// Feasibility carries weight 0: the phase exists on the record but
    /// contributes nothing to overall completion.
    pub fn asset_purchase_default() -> Self {
        Self::new(0.0, 45.0, 50.0, 5.0)
    }

    /// Weight for a phase; absent phases weigh 0
    pub fn get(&self, phase: PhaseId) -> f64 {
        self.weights.get(&phase).copied().unwrap_or(0.0)
    }

    /// Set the weight for a phase
    pub fn set(&mut self, phase: PhaseId, weight: f64) {
        self.weights.insert(phase, weight);
    }

    /// Sum of the weights in play — positive entries only, matching what
    /// the engine uses as its normalization denominator. Zero-weight phases
    /// (and any malformed negative entry) are excluded.
    pub fn total(&self) -> f64 {
        self.weights.values().filter(|w| **w > 0.0).sum()
    }

    /// Check every entry is a finite percentage in [0, 100]
    pub fn is_well_formed(&self) -> bool {
        self.weights
            .values()
            .all(|w| w.is_finite() && (0.0..=100.0).contains(w))
    }
}

/// Complete engine configuration: thresholds plus both weight tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub thresholds: StatusThresholds,
    pub complex_weights: WeightTable,
    pub asset_purchase_weights: WeightTable,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            thresholds: StatusThresholds::default(),
            complex_weights: WeightTable::complex_default(),
            asset_purchase_weights: WeightTable::asset_purchase_default(),
        }
    }
}

impl EngineSettings {
    /// The weight table applying to a project type
    pub fn weights_for(&self, project_type: ProjectType) -> &WeightTable {
        match project_type {
            ProjectType::ComplexProject => &self.complex_weights,
            ProjectType::AssetPurchase => &self.asset_purchase_weights,
        }
    }
}
