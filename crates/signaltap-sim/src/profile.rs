//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Equipment profile definitions and the TOML-backed catalog."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! Profiles describe one simulated machine: three sensors with ranges, four
//! KPI tiles, an AI baseline with three insights, and the equipment-specific
//! auxiliary outputs. The built-in catalog ships with the crate; alternative
//! catalogs use the same `[profiles.<id>]` layout.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::outputs::AuxOutputs;

pub const SENSOR_COUNT: usize = 3;
pub const KPI_COUNT: usize = 4;
pub const INSIGHT_COUNT: usize = 3;

const BUILTIN_CATALOG: &str = include_str!("../profiles/demo_profiles.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Cnc,
    Chiller,
    Compressor,
    Plc,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 4] = [
        ProfileKind::Cnc,
        ProfileKind::Chiller,
        ProfileKind::Compressor,
        ProfileKind::Plc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Cnc => "cnc",
            ProfileKind::Chiller => "chiller",
            ProfileKind::Compressor => "compressor",
            ProfileKind::Plc => "plc",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub name: String,
    pub unit: String,
    pub min: f32,
    pub max: f32,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Physical signal source, e.g. "CT Coil" or "4-20mA RTD".
    #[serde(default)]
    pub source: String,
    /// Reading at boot, before any smoothing.
    pub value: f32,
}

fn default_decimals() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_true")]
    pub good: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    #[default]
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub severity: InsightSeverity,
    pub confidence: u8,
    pub timeframe: String,
}

/// Predictive-maintenance summary shown next to the live sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    /// Health in percent; stored fractional so smoothing can move in both directions.
    pub health_score: f32,
    #[serde(default)]
    pub anomaly_count: u8,
    pub failure_probability: f32,
    #[serde(default)]
    pub next_maintenance: String,
    #[serde(default)]
    pub model_status: String,
    #[serde(default)]
    pub data_points: u64,
    pub insights: [Insight; INSIGHT_COUNT],
}

impl AiState {
    /// Health rounded to the nearest whole percent.
    pub fn health_percent(&self) -> u8 {
        self.health_score.round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub kind: ProfileKind,
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    pub sensors: [SensorSpec; SENSOR_COUNT],
    pub kpis: [Kpi; KPI_COUNT],
    pub ai: AiState,
    #[serde(default)]
    pub outputs: Option<AuxOutputs>,
}

impl ProfileDefinition {
    /// Auxiliary outputs at boot, falling back to neutral values for the kind.
    pub fn initial_outputs(&self) -> AuxOutputs {
        self.outputs
            .clone()
            .unwrap_or_else(|| AuxOutputs::neutral(self.kind))
    }

    fn validate(&self, id: &str) -> Result<(), ProfileError> {
        for sensor in &self.sensors {
            if sensor.min.is_nan() || sensor.max.is_nan() || sensor.min >= sensor.max {
                return Err(ProfileError::InvalidRange {
                    profile: id.to_string(),
                    sensor: sensor.name.clone(),
                    min: sensor.min,
                    max: sensor.max,
                });
            }
        }
        let bounded = [
            ("ai.health_score", self.ai.health_score),
            ("ai.failure_probability", self.ai.failure_probability),
        ];
        for (field, value) in bounded {
            if !(0.0..=100.0).contains(&value) {
                return Err(ProfileError::OutOfBounds {
                    profile: id.to_string(),
                    field,
                    value,
                });
            }
        }
        if let Some(outputs) = &self.outputs {
            if outputs.kind() != self.kind {
                return Err(ProfileError::OutputKindMismatch {
                    profile: id.to_string(),
                    kind: self.kind,
                    found: outputs.kind(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered set of profiles keyed by id; order defines the rotation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfileCatalog {
    #[serde(default)]
    profiles: IndexMap<String, ProfileDefinition>,
}

impl ProfileCatalog {
    /// The four demonstration profiles compiled into the crate.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ProfileError> {
        let catalog: ProfileCatalog = toml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile catalog {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid profile catalog {}", path.display()))
    }

    /// Load from `path` when given, otherwise the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin().context("built-in profile catalog is invalid"),
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.profiles.is_empty() {
            return Err(ProfileError::Empty);
        }
        for (id, definition) in &self.profiles {
            definition.validate(id)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<(&str, &ProfileDefinition)> {
        self.profiles
            .get_index(index)
            .map(|(id, definition)| (id.as_str(), definition))
    }

    pub fn index_of(&self, id: &str) -> Result<usize, ProfileError> {
        self.profiles
            .get_index_of(id)
            .ok_or_else(|| ProfileError::UnknownProfile(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileDefinition)> + '_ {
        self.profiles
            .iter()
            .map(|(id, definition)| (id.as_str(), definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_catalog_has_four_kinds_in_order() -> anyhow::Result<()> {
        let catalog = ProfileCatalog::builtin()?;
        let kinds: Vec<ProfileKind> = catalog.iter().map(|(_, def)| def.kind).collect();
        assert_eq!(kinds, ProfileKind::ALL.to_vec());
        let (id, cnc) = catalog.get(0).expect("first profile");
        assert_eq!(id, "cnc");
        assert_eq!(cnc.sensors[0].name, "Spindle Load");
        assert_eq!(cnc.ai.health_percent(), 87);
        assert!(cnc.initial_outputs().as_cnc().is_some());
        Ok(())
    }

    #[test]
    fn index_of_reports_unknown_profiles() -> anyhow::Result<()> {
        let catalog = ProfileCatalog::builtin()?;
        assert_eq!(catalog.index_of("plc")?, 3);
        assert!(matches!(
            catalog.index_of("boiler"),
            Err(ProfileError::UnknownProfile(_))
        ));
        Ok(())
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = ProfileCatalog::from_toml_str("").unwrap_err();
        assert!(matches!(err, ProfileError::Empty));
    }

    #[test]
    fn inverted_sensor_range_is_rejected() {
        let raw = BUILTIN_CATALOG.replacen("min = 0.0\nmax = 100.0", "min = 100.0\nmax = 0.0", 1);
        assert_ne!(raw, BUILTIN_CATALOG);
        let err = ProfileCatalog::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidRange { .. }));
    }

    #[test]
    fn mismatched_outputs_are_rejected() {
        let raw = BUILTIN_CATALOG.replacen("kind = \"cnc\"\npart_count", "kind = \"plc\"\npart_count", 1);
        assert_ne!(raw, BUILTIN_CATALOG);
        let err = ProfileCatalog::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ProfileError::OutputKindMismatch { .. }));
    }

    #[test]
    fn wrong_sensor_count_fails_to_parse() {
        let raw = r#"
            [profiles.solo]
            kind = "cnc"
            name = "Solo"

            [[profiles.solo.sensors]]
            name = "Only"
            unit = "%"
            min = 0.0
            max = 1.0
            value = 0.5
        "#;
        let err = ProfileCatalog::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ProfileError::Parse(_)));
    }

    #[test]
    fn loads_catalog_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(BUILTIN_CATALOG.as_bytes())?;
        let catalog = ProfileCatalog::load(Some(file.path()))?;
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.ids().collect::<Vec<_>>(),
            vec!["cnc", "chiller", "compressor", "plc"]
        );
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ProfileCatalog::from_path(Path::new("/nonexistent/profiles.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/profiles.toml"));
    }
}
