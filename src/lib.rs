//! # CapTrack Core Library
//!
//! Shared core for the CapEx project tracking dashboard including:
//! - Canonical data model (Project / Phase / SubItem)
//! - Completion and status computation engine
//! - Admin settings (status thresholds, phase weight tables) with validation
//! - Persistence-boundary adapter for historical record shapes
//! - Collaborator traits (project store, settings provider)
//!
//! The library is pure and synchronous: it performs no I/O beyond optionally
//! loading its default configuration from a TOML file, and every derived
//! value (phase completion, overall completion, status) is recomputed from
//! scratch on demand.

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod ports;
pub mod settings;

pub use error::{Error, Result};
pub use model::{PhaseId, Project, ProjectStatus, ProjectType};
pub use settings::{EngineSettings, StatusThresholds, WeightTable};
