//! Collaborator seams
//!
//! Traits for the two external collaborators this core depends on: the
//! project repository (hosted relational backend in production) and the
//! admin-settings provider. Any persistence technology satisfies these
//! contracts; the in-memory implementations here back the tests and serve as
//! the reference behavior.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::Project;
use crate::settings::EngineSettings;

/// Project repository contract
///
/// Supplies and accepts canonical [`Project`] records. Implementations that
/// read historical shapes should normalize through [`crate::adapter`] before
/// returning records.
pub trait ProjectStore {
    /// Fetch a project by id; `Error::NotFound` when absent
    fn load(&self, id: Uuid) -> Result<Project>;

    /// Persist a project (insert or replace)
    fn save(&self, project: &Project) -> Result<()>;

    /// All stored projects, unordered
    fn list(&self) -> Result<Vec<Project>>;

    /// Remove a project; `Error::NotFound` when absent
    fn delete(&self, id: Uuid) -> Result<()>;
}

/// Admin-settings provider contract
///
/// An update is accepted only after its thresholds validate; a rejected
/// update leaves the previous settings in place.
pub trait SettingsProvider {
    /// Current engine settings
    fn settings(&self) -> Result<EngineSettings>;

    /// Replace the settings after validation
    fn update(&self, settings: EngineSettings) -> Result<()>;
}

/// In-memory project store (reference implementation, test support)
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<Uuid, Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, id: Uuid) -> Result<Project> {
        self.projects
            .read()
            .map_err(|_| Error::InvalidInput("project store lock poisoned".to_string()))?
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))
    }

    fn save(&self, project: &Project) -> Result<()> {
        self.projects
            .write()
            .map_err(|_| Error::InvalidInput("project store lock poisoned".to_string()))?
            .insert(project.id, project.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Project>> {
        Ok(self
            .projects
            .read()
            .map_err(|_| Error::InvalidInput("project store lock poisoned".to_string()))?
            .values()
            .cloned()
            .collect())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        self.projects
            .write()
            .map_err(|_| Error::InvalidInput("project store lock poisoned".to_string()))?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))
    }
}

/// In-memory settings provider (reference implementation, test support)
#[derive(Debug)]
pub struct MemorySettings {
    settings: RwLock<EngineSettings>,
}

impl MemorySettings {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl SettingsProvider for MemorySettings {
    fn settings(&self) -> Result<EngineSettings> {
        Ok(self
            .settings
            .read()
            .map_err(|_| Error::InvalidInput("settings lock poisoned".to_string()))?
            .clone())
    }

    fn update(&self, settings: EngineSettings) -> Result<()> {
        let validation = settings.thresholds.validate();
        if !validation.is_valid {
            return Err(Error::InvalidInput(
                validation
                    .error
                    .unwrap_or_else(|| "invalid thresholds".to_string()),
            ));
        }
        if !settings.complex_weights.is_well_formed()
            || !settings.asset_purchase_weights.is_well_formed()
        {
            return Err(Error::InvalidInput(
                "phase weights must be between 0 and 100".to_string(),
            ));
        }

        *self
            .settings
            .write()
            .map_err(|_| Error::InvalidInput("settings lock poisoned".to_string()))? = settings;
        Ok(())
    }
}
