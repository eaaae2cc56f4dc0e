//! ---
//! sigtap_section: "03-tick-scheduling"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Runtime helpers supporting the tick driver."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! Real-time scheduling helpers for the SignalTap drivers.

pub mod scheduling;

pub use scheduling::RateLimiter;
