//! Engine configuration loading
//!
//! Default thresholds and weight tables can be supplied by a TOML file; when
//! the file is absent the built-in defaults apply. A file that parses but
//! carries an invalid configuration (bad threshold ordering, out-of-range
//! weights) is rejected outright rather than silently corrected, so a typo
//! in the defaults file cannot change every project's status quietly.
//!
//! ```toml
//! [thresholds]
//! onTrack = 90.0
//! atRisk = 75.0
//! impacted = 60.0
//!
//! [complexWeights]
//! feasibility = 15.0
//! planning = 35.0
//! execution = 45.0
//! close = 5.0
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::settings::{EngineSettings, StatusThresholds, WeightTable};

/// On-disk settings file; every section is optional and falls back to the
/// built-in default
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SettingsFile {
    thresholds: Option<ThresholdsSection>,
    complex_weights: Option<WeightsSection>,
    asset_purchase_weights: Option<WeightsSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ThresholdsSection {
    on_track: f64,
    at_risk: f64,
    impacted: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeightsSection {
    feasibility: f64,
    planning: f64,
    execution: f64,
    close: f64,
}

impl WeightsSection {
    fn into_table(self) -> WeightTable {
        WeightTable::new(self.feasibility, self.planning, self.execution, self.close)
    }
}

/// Parse and validate engine settings from TOML text
pub fn settings_from_toml(text: &str) -> Result<EngineSettings> {
    let file: SettingsFile = toml::from_str(text)
        .map_err(|e| Error::Config(format!("Failed to parse settings file: {}", e)))?;

    let defaults = EngineSettings::default();
    let settings = EngineSettings {
        thresholds: file
            .thresholds
            .map(|t| StatusThresholds {
                on_track: t.on_track,
                at_risk: t.at_risk,
                impacted: t.impacted,
            })
            .unwrap_or(defaults.thresholds),
        complex_weights: file
            .complex_weights
            .map(WeightsSection::into_table)
            .unwrap_or(defaults.complex_weights),
        asset_purchase_weights: file
            .asset_purchase_weights
            .map(WeightsSection::into_table)
            .unwrap_or(defaults.asset_purchase_weights),
    };

    let validation = settings.thresholds.validate();
    if !validation.is_valid {
        return Err(Error::Config(format!(
            "Invalid thresholds in settings file: {}",
            validation.error.unwrap_or_default()
        )));
    }
    if !settings.complex_weights.is_well_formed()
        || !settings.asset_purchase_weights.is_well_formed()
    {
        return Err(Error::Config(
            "Phase weights in settings file must be between 0 and 100".to_string(),
        ));
    }

    Ok(settings)
}

/// Load engine settings from a TOML file
///
/// A missing file is not an error: the built-in defaults apply. An existing
/// but unreadable or invalid file is.
pub fn load_settings(path: &Path) -> Result<EngineSettings> {
    if !path.exists() {
        info!(
            "Settings file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(EngineSettings::default());
    }

    let text = std::fs::read_to_string(path)?;
    let settings = settings_from_toml(&text)?;
    info!("Loaded engine settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhaseId;

    #[test]
    fn test_full_file_parses() {
        let settings = settings_from_toml(
            r#"
            [thresholds]
            onTrack = 85.0
            atRisk = 70.0
            impacted = 50.0

            [complexWeights]
            feasibility = 10.0
            planning = 40.0
            execution = 45.0
            close = 5.0

            [assetPurchaseWeights]
            feasibility = 0.0
            planning = 50.0
            execution = 45.0
            close = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(settings.thresholds.on_track, 85.0);
        assert_eq!(settings.complex_weights.get(PhaseId::Planning), 40.0);
        assert_eq!(
            settings.asset_purchase_weights.get(PhaseId::Feasibility),
            0.0
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings = settings_from_toml(
            r#"
            [thresholds]
            onTrack = 95.0
            atRisk = 80.0
            impacted = 60.0
            "#,
        )
        .unwrap();

        assert_eq!(settings.thresholds.on_track, 95.0);
        assert_eq!(settings.complex_weights, WeightTable::complex_default());
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        assert_eq!(settings_from_toml("").unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let err = settings_from_toml(
            r#"
            [thresholds]
            onTrack = 70.0
            atRisk = 80.0
            impacted = 60.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let err = settings_from_toml(
            r#"
            [complexWeights]
            feasibility = 150.0
            planning = 35.0
            execution = 45.0
            close = 5.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unparseable_file_rejected() {
        let err = settings_from_toml("not [ valid toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
