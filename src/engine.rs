//! Completion and status computation engine
//!
//! The single authoritative implementation of the three derivation rules:
//! - sub-items → phase completion (N/A items excluded from the average)
//! - phase completions → overall completion (weighted, normalized against
//!   the actual weight total)
//! - overall completion → status (three-bucket thermometer)
//!
//! Every caller in the crate (the model's recompute lifecycle, the
//! persistence adapter) routes through these functions; no other completion
//! math exists. All functions are pure and synchronous.

use std::collections::BTreeMap;

use crate::model::{PhaseId, ProjectStatus, SubItem};
use crate::settings::{StatusThresholds, WeightTable};

/// Clamp a raw percentage into [0, 100], coercing non-finite values to 0.
///
/// Persisted records occasionally carry garbage numeric values; the engine
/// never lets those surface as NaN in a derived result.
pub(crate) fn normalize_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Compute a phase's completion percentage from its sub-items.
///
/// Sub-items flagged N/A are excluded entirely: they leave the denominator
/// as well as the numerator, so a phase of `[80, N/A]` completes at 80, not
/// 40. An empty list, or a list where every item is N/A, completes at 0.
///
/// The result is the arithmetic mean of the remaining values, rounded
/// half-away-from-zero to the nearest integer, and is invariant under
/// reordering of the list.
pub fn phase_completion(sub_items: &[SubItem]) -> u8 {
    let applicable: Vec<f64> = sub_items
        .iter()
        .filter(|item| !item.is_na)
        .map(|item| normalize_percent(item.value))
        .collect();

    if applicable.is_empty() {
        return 0;
    }

    let mean = applicable.iter().sum::<f64>() / applicable.len() as f64;
    mean.round() as u8
}

/// Compute a project's overall completion from its per-phase completions.
///
/// Each phase present in the weight table with a weight > 0 contributes
/// `completion * weight` to a weighted sum; the result is the sum divided by
/// the total of the weights actually in play, rounded to the nearest integer.
///
/// Dividing by the actual weight total (rather than assuming 100) keeps the
/// result correct when an admin's custom table does not sum to exactly 100.
/// Phases absent from the table, or carrying a zero weight (Feasibility on an
/// Asset Purchase), contribute nothing. Zero total weight yields 0.
pub fn overall_completion(completions: &BTreeMap<PhaseId, u8>, weights: &WeightTable) -> u8 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (&phase, &completion) in completions {
        let weight = weights.get(phase);
        if weight > 0.0 {
            weighted_sum += f64::from(completion) * weight;
            total_weight += weight;
        }
    }

    if total_weight > 0.0 {
        (weighted_sum / total_weight).round() as u8
    } else {
        0
    }
}

/// Derive a project's status from its overall completion.
///
/// Evaluated top-down against the raw completion percentage:
/// - `completion >= on_track` → OnTrack
/// - `completion >= at_risk`  → AtRisk
/// - otherwise                → Impacted
///
/// Lower bounds are inclusive, so a completion sitting exactly on a threshold
/// resolves to the higher status. Status is always recomputed from scratch —
/// there is no transition history and no hysteresis, so status moves freely
/// in both directions as sub-item values change.
pub fn determine_status(completion: u8, thresholds: &StatusThresholds) -> ProjectStatus {
    let completion = f64::from(completion);
    if completion >= thresholds.on_track {
        ProjectStatus::OnTrack
    } else if completion >= thresholds.at_risk {
        ProjectStatus::AtRisk
    } else {
        ProjectStatus::Impacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: f64, is_na: bool) -> SubItem {
        SubItem {
            id: "item".to_string(),
            name: "Item".to_string(),
            value,
            is_na,
        }
    }

    #[test]
    fn test_phase_completion_excludes_na_from_denominator() {
        // The N/A item leaves the average entirely; it is not a weighted-in zero
        let items = vec![item(80.0, false), item(60.0, true)];
        assert_eq!(phase_completion(&items), 80);
    }

    #[test]
    fn test_phase_completion_all_na_is_zero() {
        let items = vec![item(100.0, true), item(50.0, true)];
        assert_eq!(phase_completion(&items), 0);
    }

    #[test]
    fn test_phase_completion_empty_is_zero() {
        assert_eq!(phase_completion(&[]), 0);
    }

    #[test]
    fn test_phase_completion_mean_and_rounding() {
        // mean(100, 75) = 87.5, rounds half away from zero to 88
        let items = vec![item(100.0, false), item(75.0, false)];
        assert_eq!(phase_completion(&items), 88);
    }

    #[test]
    fn test_phase_completion_order_invariant() {
        let forward = vec![item(10.0, false), item(90.0, false), item(30.0, true)];
        let reversed: Vec<SubItem> = forward.iter().rev().cloned().collect();
        assert_eq!(phase_completion(&forward), phase_completion(&reversed));
    }

    #[test]
    fn test_phase_completion_coerces_garbage_values() {
        let items = vec![item(f64::NAN, false), item(80.0, false)];
        assert_eq!(phase_completion(&items), 40);

        let items = vec![item(250.0, false), item(-40.0, false)];
        // Clamped to 100 and 0 before averaging
        assert_eq!(phase_completion(&items), 50);
    }

    #[test]
    fn test_determine_status_inclusive_boundaries() {
        let thresholds = StatusThresholds {
            on_track: 90.0,
            at_risk: 80.0,
            impacted: 0.0,
        };
        assert_eq!(determine_status(90, &thresholds), ProjectStatus::OnTrack);
        assert_eq!(determine_status(89, &thresholds), ProjectStatus::AtRisk);
        assert_eq!(determine_status(80, &thresholds), ProjectStatus::AtRisk);
        assert_eq!(determine_status(79, &thresholds), ProjectStatus::Impacted);
        assert_eq!(determine_status(0, &thresholds), ProjectStatus::Impacted);
        assert_eq!(determine_status(100, &thresholds), ProjectStatus::OnTrack);
    }

    #[test]
    fn test_normalize_percent() {
        assert_eq!(normalize_percent(50.0), 50.0);
        assert_eq!(normalize_percent(-10.0), 0.0);
        assert_eq!(normalize_percent(150.0), 100.0);
        assert_eq!(normalize_percent(f64::NAN), 0.0);
        assert_eq!(normalize_percent(f64::INFINITY), 0.0);
    }
}
