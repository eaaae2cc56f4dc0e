//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Error types for profile catalog loading and validation."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use thiserror::Error;

use crate::profile::ProfileKind;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to parse profile catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("profile catalog defines no profiles")]
    Empty,
    #[error("profile `{profile}` sensor `{sensor}` has invalid range [{min}, {max}]")]
    InvalidRange {
        profile: String,
        sensor: String,
        min: f32,
        max: f32,
    },
    #[error("profile `{profile}` field `{field}` value {value} outside [0, 100]")]
    OutOfBounds {
        profile: String,
        field: &'static str,
        value: f32,
    },
    #[error("profile `{profile}` of kind {kind} carries {found} outputs")]
    OutputKindMismatch {
        profile: String,
        kind: ProfileKind,
        found: ProfileKind,
    },
    #[error("profile `{0}` not found in catalog")]
    UnknownProfile(String),
}
