//! Persistence-boundary record normalization
//!
//! The hosted backend accumulated several near-identical project shapes over
//! time: `subItems` as an array, `subItems` keyed by id, and sub-items
//! carrying `target`/`actual` pairs instead of a single `value`. This module
//! collapses all of them into the canonical [`Project`] shape in one place,
//! so the engine and everything above it never deal with representation
//! ambiguity.
//!
//! Coercion policy: numeric fields accept numbers or numeric strings and fall
//! back to 0 (never NaN), a missing N/A flag means applicable, and missing
//! phases are filled from the catalog with zeroed values. Fallbacks are
//! logged at `warn` level. Only a structurally unusable record — top level
//! not an object, or no usable id — is an error.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::catalog;
use crate::engine;
use crate::error::{Error, Result};
use crate::model::{Phase, PhaseId, Project, ProjectStatus, ProjectType, SubItem};
use crate::settings::EngineSettings;

/// Normalize a persisted record of any historical shape into a [`Project`]
///
/// The returned project has all derived fields recomputed against `settings`,
/// regardless of what (possibly stale) derived values the record carried.
pub fn project_from_value(record: &Value, settings: &EngineSettings) -> Result<Project> {
    let obj = record
        .as_object()
        .ok_or_else(|| Error::InvalidInput("project record is not an object".to_string()))?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| Error::InvalidInput("project record has no usable id".to_string()))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let project_type = obj
        .get("projectType")
        .or_else(|| obj.get("type"))
        .and_then(Value::as_str)
        .and_then(ProjectType::parse)
        .unwrap_or_else(|| {
            warn!(project = %id, "record has no recognizable project type, assuming complex");
            ProjectType::ComplexProject
        });

    let budget = coerce_money(obj.get("budget"));
    let spent = coerce_money(obj.get("spent"));

    let created_at = coerce_timestamp(obj.get("createdAt").or_else(|| obj.get("created_at")));
    let updated_at = coerce_timestamp(obj.get("updatedAt").or_else(|| obj.get("updated_at")));

    let phases = read_phases(obj.get("phases"), id);

    let mut project = Project {
        id,
        name,
        project_type,
        // Placeholder; recompute below derives the real value
        status: ProjectStatus::Impacted,
        overall_completion: 0,
        budget,
        spent,
        phases,
        created_at,
        updated_at,
    };
    project.recompute(settings);
    Ok(project)
}

/// Read the phase collection, tolerating both the array and the
/// keyed-by-name representations; missing phases come from the catalog
fn read_phases(value: Option<&Value>, project_id: Uuid) -> Vec<Phase> {
    let mut phases = Vec::with_capacity(PhaseId::ALL.len());
    for phase_id in PhaseId::ALL {
        let entry = value.and_then(|v| find_phase_entry(v, phase_id));
        match entry {
            Some(entry) => phases.push(read_phase(phase_id, entry)),
            None => {
                warn!(
                    project = %project_id,
                    phase = phase_id.as_str(),
                    "record is missing a phase, filling from catalog"
                );
                phases.push(catalog::empty_phase(phase_id));
            }
        }
    }
    phases
}

fn find_phase_entry<'a>(phases: &'a Value, phase_id: PhaseId) -> Option<&'a Value> {
    match phases {
        Value::Array(entries) => entries.iter().find(|entry| {
            entry
                .get("id")
                .or_else(|| entry.get("name"))
                .and_then(Value::as_str)
                .and_then(PhaseId::parse)
                == Some(phase_id)
        }),
        Value::Object(map) => map
            .iter()
            .find(|(key, _)| PhaseId::parse(key) == Some(phase_id))
            .map(|(_, v)| v),
        _ => None,
    }
}

fn read_phase(phase_id: PhaseId, entry: &Value) -> Phase {
    let sub_items = match entry.get("subItems") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| read_sub_item(item, None))
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, item)| read_sub_item(item, Some(key.as_str())))
            .collect(),
        _ => {
            warn!(
                phase = phase_id.as_str(),
                "phase entry has no sub-items, filling from catalog"
            );
            catalog::phase_sub_items(phase_id)
        }
    };

    Phase {
        id: phase_id,
        // Display caches; recompute refreshes both from settings
        weight: 0.0,
        completion: 0,
        sub_items,
    }
}

/// Read one sub-item, whichever historical field set it carries
///
/// `key` is the object key in the keyed representation and doubles as the id
/// when the item body has none. Items with no usable id at all are dropped.
fn read_sub_item(item: &Value, key: Option<&str>) -> Option<SubItem> {
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .or(key)
        .map(str::to_string);
    let Some(id) = id else {
        warn!("dropping sub-item with no id");
        return None;
    };

    let name = item
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(&id)
        .to_string();

    // The target/actual representation predates the single value field;
    // convert it to a percentage of target met. Targets and actuals are raw
    // quantities (counts, hours), not percentages, so only the computed
    // ratio is clamped to [0, 100].
    let value = if item.get("value").is_some() {
        coerce_percent(item.get("value"))
    } else if item.get("target").is_some() || item.get("actual").is_some() {
        let target = coerce_quantity(item.get("target"));
        let actual = coerce_quantity(item.get("actual"));
        if target > 0.0 {
            engine::normalize_percent(actual / target * 100.0)
        } else {
            0.0
        }
    } else {
        0.0
    };

    let is_na = item
        .get("isNA")
        .or_else(|| item.get("isNa"))
        .or_else(|| item.get("na"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(SubItem {
        id,
        name,
        value,
        is_na,
    })
}

/// Coerce a percentage-like value: numbers pass through (clamped to
/// [0, 100]), numeric strings parse, everything else falls back to 0
fn coerce_percent(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => engine::normalize_percent(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(parsed) => engine::normalize_percent(parsed),
            Err(_) => {
                warn!(raw = %s, "non-numeric completion value, coercing to 0");
                0.0
            }
        },
        Some(Value::Null) | None => 0.0,
        Some(other) => {
            warn!(raw = %other, "unexpected completion value type, coercing to 0");
            0.0
        }
    }
}

/// Coerce a raw non-negative quantity (a target or actual): number or
/// numeric string, fallback 0. Unlike [`coerce_percent`] this does NOT clamp
/// to 100 — legacy targets routinely exceed it — only negatives and
/// non-finite values are rejected.
fn coerce_quantity(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or_else(|_| {
            warn!(raw = %s, "non-numeric target/actual value, coercing to 0");
            0.0
        }),
        Some(Value::Null) | None => 0.0,
        Some(other) => {
            warn!(raw = %other, "unexpected target/actual value type, coercing to 0");
            0.0
        }
    };
    if raw.is_finite() && raw >= 0.0 {
        raw
    } else {
        0.0
    }
}

/// Coerce a monetary field: number or numeric string, fallback 0
fn coerce_money(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or_else(|_| {
            warn!(raw = %s, "non-numeric monetary value, coercing to 0");
            0.0
        }),
        _ => 0.0,
    };
    if raw.is_finite() {
        raw
    } else {
        0.0
    }
}

fn coerce_timestamp(value: Option<&Value>) -> DateTime<Utc> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_record() {
        let settings = EngineSettings::default();
        let err = project_from_value(&json!([1, 2, 3]), &settings).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_record_without_id() {
        let settings = EngineSettings::default();
        let err = project_from_value(&json!({"name": "No Id"}), &settings).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_coerce_percent_variants() {
        assert_eq!(coerce_percent(Some(&json!(42.5))), 42.5);
        assert_eq!(coerce_percent(Some(&json!("80"))), 80.0);
        assert_eq!(coerce_percent(Some(&json!(" 60 "))), 60.0);
        assert_eq!(coerce_percent(Some(&json!("garbage"))), 0.0);
        assert_eq!(coerce_percent(Some(&json!(null))), 0.0);
        assert_eq!(coerce_percent(Some(&json!(150))), 100.0);
        assert_eq!(coerce_percent(Some(&json!(-3))), 0.0);
        assert_eq!(coerce_percent(None), 0.0);
    }

    #[test]
    fn test_target_actual_conversion() {
        // Targets above 100 are raw quantities, not percentages: 50 of 200
        // is 25%, not 50-of-clamped-100
        let item = json!({"id": "procurement", "target": 200, "actual": 50});
        let parsed = read_sub_item(&item, None).unwrap();
        assert_eq!(parsed.value, 25.0);

        // Only the computed ratio clamps
        let item = json!({"id": "procurement", "target": 40, "actual": 60});
        assert_eq!(read_sub_item(&item, None).unwrap().value, 100.0);

        // Zero or missing target never divides
        let item = json!({"id": "procurement", "target": 0, "actual": 50});
        assert_eq!(read_sub_item(&item, None).unwrap().value, 0.0);

        // Negative and garbage inputs coerce to 0 before the ratio
        let item = json!({"id": "procurement", "target": 200, "actual": -10});
        assert_eq!(read_sub_item(&item, None).unwrap().value, 0.0);
        let item = json!({"id": "procurement", "target": "200", "actual": "50"});
        assert_eq!(read_sub_item(&item, None).unwrap().value, 25.0);
    }

    #[test]
    fn test_missing_phase_filled_from_catalog() {
        let settings = EngineSettings::default();
        let record = json!({
            "id": "3fa5b1c2-9d4e-4f6a-8b7c-0d1e2f3a4b5c",
            "name": "Partial Record",
            "projectType": "complexProject",
            "phases": [
                {"id": "feasibility", "subItems": [
                    {"id": "riskAssessment", "value": 100, "isNA": false}
                ]}
            ]
        });

        let project = project_from_value(&record, &settings).unwrap();
        assert_eq!(project.phases.len(), 4);
        assert_eq!(
            project.phase(PhaseId::Planning).unwrap().sub_items.len(),
            catalog::phase_sub_items(PhaseId::Planning).len()
        );
    }
}
