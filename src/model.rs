//! Canonical data model for CapEx projects
//!
//! One shape, used everywhere: `Project` → four `Phase`s → `SubItem`s.
//! Historical persisted variants are collapsed into this shape by
//! [`crate::adapter`] at the persistence boundary, so nothing past that
//! boundary ever deals with alternate representations.
//!
//! Derived fields (`Phase::completion`, `Project::overall_completion`,
//! `Project::status`) are owned by [`Project::recompute`], which routes all
//! math through [`crate::engine`]. The mutation entry points
//! (`set_sub_item_value`, `set_sub_item_na`) recompute automatically, so a
//! project handed back to the persistence collaborator is always internally
//! consistent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::engine;
use crate::error::{Error, Result};
use crate::settings::EngineSettings;

/// The four fixed project phases
///
/// Declaration order is lifecycle order (Feasibility → Close) and is the
/// order phases appear on a project record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PhaseId {
    Feasibility,
    Planning,
    Execution,
    Close,
}

impl PhaseId {
    /// All phases in lifecycle order
    pub const ALL: [PhaseId; 4] = [
        PhaseId::Feasibility,
        PhaseId::Planning,
        PhaseId::Execution,
        PhaseId::Close,
    ];

    /// Stable identifier as stored in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseId::Feasibility => "feasibility",
            PhaseId::Planning => "planning",
            PhaseId::Execution => "execution",
            PhaseId::Close => "close",
        }
    }

    /// Parse from a persisted identifier (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "feasibility" => Some(PhaseId::Feasibility),
            "planning" => Some(PhaseId::Planning),
            "execution" => Some(PhaseId::Execution),
            "close" | "closeout" | "close-out" => Some(PhaseId::Close),
            _ => None,
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PhaseId::Feasibility => "Feasibility",
            PhaseId::Planning => "Planning",
            PhaseId::Execution => "Execution",
            PhaseId::Close => "Close",
        }
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Capital project type, selecting which phase weight table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectType {
    ComplexProject,
    AssetPurchase,
}

impl ProjectType {
    /// Stable identifier as stored in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::ComplexProject => "complexProject",
            ProjectType::AssetPurchase => "assetPurchase",
        }
    }

    /// Parse from a persisted identifier
    ///
    /// Accepts the historical spellings that accumulated in the backend:
    /// camelCase, space-separated, and the bare short forms.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "complexproject" | "complex" => Some(ProjectType::ComplexProject),
            "assetpurchase" | "asset" => Some(ProjectType::AssetPurchase),
            _ => None,
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectType::ComplexProject => "Complex Project",
            ProjectType::AssetPurchase => "Asset Purchase",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Derived project health status
///
/// Never set directly by a user; recomputed from overall completion against
/// the configured thresholds on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    OnTrack,
    AtRisk,
    Impacted,
}

impl ProjectStatus {
    /// Stable identifier as stored in persisted records
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::OnTrack => "onTrack",
            ProjectStatus::AtRisk => "atRisk",
            ProjectStatus::Impacted => "impacted",
        }
    }

    /// Parse from a persisted identifier
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "ontrack" => Some(ProjectStatus::OnTrack),
            "atrisk" => Some(ProjectStatus::AtRisk),
            "impacted" => Some(ProjectStatus::Impacted),
            _ => None,
        }
    }

    /// Human-readable display name (status badge label)
    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectStatus::OnTrack => "On Track",
            ProjectStatus::AtRisk => "At Risk",
            ProjectStatus::Impacted => "Impacted",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One measurable unit of progress within a phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubItem {
    /// Stable identifier, unique within its phase
    pub id: String,
    /// Display label (not used by the engine's math)
    pub name: String,
    /// Completion percentage in [0, 100]
    pub value: f64,
    /// When true, the item is excluded from the phase average entirely
    #[serde(rename = "isNA", default)]
    pub is_na: bool,
}

/// One of the four project phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: PhaseId,
    /// Display cache of this phase's weight from the active table.
    /// The weight table in [`EngineSettings`] remains authoritative.
    pub weight: f64,
    /// Derived: N/A-excluded average of sub-item values
    pub completion: u8,
    pub sub_items: Vec<SubItem>,
}

impl Phase {
    /// Look up a sub-item by id
    pub fn sub_item(&self, id: &str) -> Option<&SubItem> {
        self.sub_items.iter().find(|item| item.id == id)
    }
}

/// A capital project: the aggregate root
///
/// All four phases are always present; on an Asset Purchase the Feasibility
/// phase carries weight 0 and contributes nothing to overall completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub project_type: ProjectType,
    /// Derived: see [`crate::engine::determine_status`]
    pub status: ProjectStatus,
    /// Derived: see [`crate::engine::overall_completion`]
    pub overall_completion: u8,
    /// Approved budget, monetary
    pub budget: f64,
    /// Amount spent to date, monetary
    pub spent: f64,
    pub phases: Vec<Phase>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with the standard phase composition
    ///
    /// The id comes from the caller — persistence owns identity, this library
    /// never generates it. Derived fields are computed immediately, so a
    /// fresh project starts at 0% / Impacted.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        project_type: ProjectType,
        settings: &EngineSettings,
    ) -> Self {
        let now = Utc::now();
        let mut project = Self {
            id,
            name: name.into(),
            project_type,
            status: ProjectStatus::Impacted,
            overall_completion: 0,
            budget: 0.0,
            spent: 0.0,
            phases: crate::catalog::initial_phases(),
            created_at: now,
            updated_at: now,
        };
        project.recompute(settings);
        project
    }

    /// Look up a phase by id
    pub fn phase(&self, id: PhaseId) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == id)
    }

    fn phase_mut(&mut self, id: PhaseId) -> Option<&mut Phase> {
        self.phases.iter_mut().find(|p| p.id == id)
    }

    /// Set a sub-item's completion value and re-derive everything
    pub fn set_sub_item_value(
        &mut self,
        phase: PhaseId,
        item_id: &str,
        value: f64,
        settings: &EngineSettings,
    ) -> Result<()> {
        let item = self.sub_item_mut(phase, item_id)?;
        item.value = engine::normalize_percent(value);
        self.touch();
        self.recompute(settings);
        Ok(())
    }

    /// Toggle a sub-item's N/A flag and re-derive everything
    pub fn set_sub_item_na(
        &mut self,
        phase: PhaseId,
        item_id: &str,
        is_na: bool,
        settings: &EngineSettings,
    ) -> Result<()> {
        let item = self.sub_item_mut(phase, item_id)?;
        item.is_na = is_na;
        self.touch();
        self.recompute(settings);
        Ok(())
    }

    fn sub_item_mut(&mut self, phase: PhaseId, item_id: &str) -> Result<&mut SubItem> {
        let phase_entry = self
            .phase_mut(phase)
            .ok_or_else(|| Error::NotFound(format!("phase {}", phase.as_str())))?;
        phase_entry
            .sub_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "sub-item {} in phase {}",
                    item_id,
                    phase.as_str()
                ))
            })
    }

    /// Re-derive all computed fields from current sub-item state
    ///
    /// Refreshes every phase's completion and cached display weight, then
    /// overall completion and status. Pure recomputation from scratch —
    /// deterministic, idempotent, and it does not touch `updated_at` (only
    /// the mutation entry points do).
    pub fn recompute(&mut self, settings: &EngineSettings) {
        let weights = settings.weights_for(self.project_type);

        let mut completions: BTreeMap<PhaseId, u8> = BTreeMap::new();
        for phase in &mut self.phases {
            phase.completion = engine::phase_completion(&phase.sub_items);
            phase.weight = weights.get(phase.id);
            completions.insert(phase.id, phase.completion);
        }

        self.overall_completion = engine::overall_completion(&completions, weights);
        self.status = engine::determine_status(self.overall_completion, &settings.thresholds);

        debug!(
            project = %self.id,
            overall = self.overall_completion,
            status = self.status.as_str(),
            "recomputed project completion"
        );
    }

    /// Budget remaining (negative when overspent)
    pub fn budget_remaining(&self) -> f64 {
        self.budget - self.spent
    }

    /// Whether spend has exceeded the approved budget
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budget
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
