//! Fixed phase composition catalog
//!
//! Each phase has a fixed set of tracked deliverables; every project of
//! either type starts from the same composition. Sub-item ids are the stable
//! camelCase identifiers used by the persisted records.

use crate::model::{Phase, PhaseId, SubItem};

/// Sub-item template: stable id plus display label
struct SubItemTemplate {
    id: &'static str,
    name: &'static str,
}

/// The standard deliverables tracked in a phase
fn templates(phase: PhaseId) -> &'static [SubItemTemplate] {
    match phase {
        PhaseId::Feasibility => &[
            SubItemTemplate {
                id: "riskAssessment",
                name: "Risk Assessment",
            },
            SubItemTemplate {
                id: "projectCharter",
                name: "Project Charter",
            },
        ],
        PhaseId::Planning => &[
            SubItemTemplate {
                id: "budgetApproval",
                name: "Budget Approval",
            },
            SubItemTemplate {
                id: "engineeringDesign",
                name: "Engineering Design",
            },
            SubItemTemplate {
                id: "resourcePlan",
                name: "Resource Plan",
            },
        ],
        PhaseId::Execution => &[
            SubItemTemplate {
                id: "procurement",
                name: "Procurement",
            },
            SubItemTemplate {
                id: "installation",
                name: "Installation",
            },
            SubItemTemplate {
                id: "commissioning",
                name: "Commissioning",
            },
        ],
        PhaseId::Close => &[
            SubItemTemplate {
                id: "finalDocumentation",
                name: "Final Documentation",
            },
            SubItemTemplate {
                id: "handoverAcceptance",
                name: "Handover & Acceptance",
            },
            SubItemTemplate {
                id: "lessonsLearned",
                name: "Lessons Learned",
            },
        ],
    }
}

/// The standard sub-items for a phase, zeroed and applicable
pub fn phase_sub_items(phase: PhaseId) -> Vec<SubItem> {
    templates(phase)
        .iter()
        .map(|t| SubItem {
            id: t.id.to_string(),
            name: t.name.to_string(),
            value: 0.0,
            is_na: false,
        })
        .collect()
}

/// An empty phase entry with the standard composition
///
/// Weight and completion start at 0; [`crate::model::Project::recompute`]
/// fills both from the active settings.
pub fn empty_phase(phase: PhaseId) -> Phase {
    Phase {
        id: phase,
        weight: 0.0,
        completion: 0,
        sub_items: phase_sub_items(phase),
    }
}

/// The four phases of a fresh project, in lifecycle order
pub fn initial_phases() -> Vec<Phase> {
    PhaseId::ALL.iter().map(|&p| empty_phase(p)).collect()
}
