//! ---
//! sigtap_section: "02-shared-runtime"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Shared primitives and utilities for the simulation runtime."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! Core shared primitives for the SignalTap workspace.
//! This crate exposes configuration loading, logging, uptime helpers and
//! tick timing utilities consumed by the engine and its drivers.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod time;

pub use config::{AppConfig, LoadedAppConfig, LoggingConfig, SimulationConfig};
pub use logging::{init_tracing, LogFormat};
pub use metrics::{JitterHistogram, JitterSummary, LoopTimingReporter};
pub use time::{format_uptime_hms, UptimeClock};
