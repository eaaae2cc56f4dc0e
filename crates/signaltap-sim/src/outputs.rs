//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Per-equipment auxiliary outputs (stack lights, LEDs, I/O, modes)."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::ProfileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StackLight {
    #[default]
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CncLeds {
    pub run: bool,
    pub feed: bool,
    pub spindle: bool,
    pub coolant: bool,
    pub program: bool,
    pub error: bool,
    pub fault: bool,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CncOutputs {
    pub part_count: u32,
    pub stack_light: StackLight,
    pub leds: CncLeds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChillerOutputs {
    pub error_code: String,
}

impl Default for ChillerOutputs {
    fn default() -> Self {
        Self {
            error_code: ChillerOutputs::NO_ERROR.to_string(),
        }
    }
}

impl ChillerOutputs {
    pub const NO_ERROR: &'static str = "---";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompressorMode {
    #[default]
    Load,
    Idle,
    Fault,
}

impl CompressorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressorMode::Load => "LOAD",
            CompressorMode::Idle => "IDLE",
            CompressorMode::Fault => "FAULT",
        }
    }
}

impl fmt::Display for CompressorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorOutputs {
    /// Gauge reading mirrored from the tank pressure target.
    pub pressure: f32,
    /// Gauge reading mirrored from the oil temperature target.
    pub oil_temp: f32,
    pub mode: CompressorMode,
}

/// Discrete and analog I/O of a PLC panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlcOutputs {
    pub di: [bool; 8],
    pub dq: [bool; 8],
    /// Analog output 0 in percent.
    pub aq0: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AuxOutputs {
    Cnc(CncOutputs),
    Chiller(ChillerOutputs),
    Compressor(CompressorOutputs),
    Plc(PlcOutputs),
}

impl AuxOutputs {
    /// Neutral outputs for a profile whose catalog entry does not define any.
    pub fn neutral(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Cnc => AuxOutputs::Cnc(CncOutputs::default()),
            ProfileKind::Chiller => AuxOutputs::Chiller(ChillerOutputs::default()),
            ProfileKind::Compressor => AuxOutputs::Compressor(CompressorOutputs::default()),
            ProfileKind::Plc => AuxOutputs::Plc(PlcOutputs::default()),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            AuxOutputs::Cnc(_) => ProfileKind::Cnc,
            AuxOutputs::Chiller(_) => ProfileKind::Chiller,
            AuxOutputs::Compressor(_) => ProfileKind::Compressor,
            AuxOutputs::Plc(_) => ProfileKind::Plc,
        }
    }

    pub fn as_cnc(&self) -> Option<&CncOutputs> {
        match self {
            AuxOutputs::Cnc(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_cnc_mut(&mut self) -> Option<&mut CncOutputs> {
        match self {
            AuxOutputs::Cnc(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_chiller(&self) -> Option<&ChillerOutputs> {
        match self {
            AuxOutputs::Chiller(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_chiller_mut(&mut self) -> Option<&mut ChillerOutputs> {
        match self {
            AuxOutputs::Chiller(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_compressor(&self) -> Option<&CompressorOutputs> {
        match self {
            AuxOutputs::Compressor(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_compressor_mut(&mut self) -> Option<&mut CompressorOutputs> {
        match self {
            AuxOutputs::Compressor(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_plc(&self) -> Option<&PlcOutputs> {
        match self {
            AuxOutputs::Plc(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_plc_mut(&mut self) -> Option<&mut PlcOutputs> {
        match self {
            AuxOutputs::Plc(outputs) => Some(outputs),
            _ => None,
        }
    }
}
