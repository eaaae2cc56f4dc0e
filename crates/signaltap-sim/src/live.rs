//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Live view of a profile: current readings, KPIs, AI summary and outputs."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use crate::outputs::AuxOutputs;
use crate::profile::{AiState, Kpi, ProfileDefinition, ProfileKind, SensorSpec, KPI_COUNT, SENSOR_COUNT};

/// Mutable counterpart of a [`ProfileDefinition`]; the definition itself is
/// kept untouched as the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveProfile {
    id: String,
    pub(crate) definition: ProfileDefinition,
    pub(crate) sensors: [f32; SENSOR_COUNT],
    pub(crate) kpis: [Kpi; KPI_COUNT],
    pub(crate) ai: AiState,
    pub(crate) outputs: AuxOutputs,
}

impl LiveProfile {
    pub fn new(id: impl Into<String>, definition: ProfileDefinition) -> Self {
        let sensors = [
            definition.sensors[0].value,
            definition.sensors[1].value,
            definition.sensors[2].value,
        ];
        Self {
            id: id.into(),
            sensors,
            kpis: definition.kpis.clone(),
            ai: definition.ai.clone(),
            outputs: definition.initial_outputs(),
            definition,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ProfileKind {
        self.definition.kind
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ProfileDefinition {
        &self.definition
    }

    pub fn sensor_specs(&self) -> &[SensorSpec; SENSOR_COUNT] {
        &self.definition.sensors
    }

    pub fn sensor_value(&self, index: usize) -> Option<f32> {
        self.sensors.get(index).copied()
    }

    pub fn sensor_values(&self) -> [f32; SENSOR_COUNT] {
        self.sensors
    }

    pub fn kpis(&self) -> &[Kpi; KPI_COUNT] {
        &self.kpis
    }

    pub fn ai(&self) -> &AiState {
        &self.ai
    }

    pub fn outputs(&self) -> &AuxOutputs {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileCatalog;

    #[test]
    fn starts_from_catalog_baseline() -> anyhow::Result<()> {
        let catalog = ProfileCatalog::builtin()?;
        let (id, definition) = catalog.get(1).expect("chiller");
        let live = LiveProfile::new(id, definition.clone());
        assert_eq!(live.id(), "chiller");
        assert_eq!(live.kind(), ProfileKind::Chiller);
        assert_eq!(live.sensor_values(), [28.5, 2.3, 8.1]);
        assert_eq!(live.sensor_value(3), None);
        assert_eq!(live.kpis()[3].value, "OK");
        assert_eq!(live.ai().data_points, 125_840);
        assert!(live.outputs().as_chiller().is_some());
        Ok(())
    }
}
