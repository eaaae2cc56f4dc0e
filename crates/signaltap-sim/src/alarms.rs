//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Bounded dynamic alarm registry with dedup and oldest-eviction."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
//! Alarms raised by the physics models and the OTA simulator land here.
//!
//! The registry holds at most [`MAX_DYNAMIC_ALARMS`] entries. Raising a message
//! that is already active is a no-op; otherwise the first inactive slot is
//! reused and, when every slot is active, the entry with the smallest trigger
//! time is overwritten.

use std::fmt;

use serde::{Deserialize, Serialize};
use signaltap_common::format_uptime_hms;
use tracing::debug;

pub const MAX_DYNAMIC_ALARMS: usize = 8;

/// Alarm text is bounded to this many bytes.
pub const MAX_ALARM_MESSAGE_LEN: usize = 79;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSeverity {
    Error,
    Warning,
    #[default]
    Info,
}

impl AlarmSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmSeverity::Error => "error",
            AlarmSeverity::Warning => "warning",
            AlarmSeverity::Info => "info",
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicAlarm {
    severity: AlarmSeverity,
    message: String,
    time: String,
    acked: bool,
    active: bool,
    trigger_time_ms: u64,
}

impl DynamicAlarm {
    fn raised(severity: AlarmSeverity, message: String, now_ms: u64) -> Self {
        Self {
            severity,
            message,
            time: format_uptime_hms(now_ms),
            acked: false,
            active: true,
            trigger_time_ms: now_ms,
        }
    }

    pub fn severity(&self) -> AlarmSeverity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Uptime at which the alarm was raised, formatted `HH:MM:SS`.
    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn is_acked(&self) -> bool {
        self.acked
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn trigger_time_ms(&self) -> u64 {
        self.trigger_time_ms
    }
}

/// Outcome of [`AlarmRegistry::raise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmInsert {
    /// An active alarm with the same text already exists.
    Duplicate,
    Inserted { slot: usize },
    /// Every slot was active; the oldest entry was overwritten.
    Evicted { slot: usize, evicted: DynamicAlarm },
}

impl AlarmInsert {
    pub fn is_new(&self) -> bool {
        !matches!(self, AlarmInsert::Duplicate)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlarmRegistry {
    slots: [DynamicAlarm; MAX_DYNAMIC_ALARMS],
    high_water: usize,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, severity: AlarmSeverity, message: &str, now_ms: u64) -> AlarmInsert {
        let message = bounded_message(message);
        if self.is_active(message) {
            return AlarmInsert::Duplicate;
        }
        let alarm = DynamicAlarm::raised(severity, message.to_owned(), now_ms);

        if let Some(slot) = self.slots.iter().position(|slot| !slot.active) {
            self.slots[slot] = alarm;
            self.high_water = self.high_water.max(slot + 1);
            return AlarmInsert::Inserted { slot };
        }

        let mut oldest = 0;
        for (index, slot) in self.slots.iter().enumerate().skip(1) {
            if slot.trigger_time_ms < self.slots[oldest].trigger_time_ms {
                oldest = index;
            }
        }
        let evicted = std::mem::replace(&mut self.slots[oldest], alarm);
        AlarmInsert::Evicted {
            slot: oldest,
            evicted,
        }
    }

    pub fn is_active(&self, message: &str) -> bool {
        let message = bounded_message(message);
        self.slots
            .iter()
            .any(|slot| slot.active && slot.message == message)
    }

    /// Active alarms in slot order.
    pub fn active(&self) -> impl Iterator<Item = &DynamicAlarm> + '_ {
        self.slots.iter().filter(|slot| slot.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// The `index`-th active alarm in slot order.
    pub fn get(&self, index: usize) -> Option<&DynamicAlarm> {
        self.active().nth(index)
    }

    /// Mark the `index`-th active alarm acknowledged. Returns false when out of range.
    pub fn acknowledge(&mut self, index: usize) -> bool {
        match self
            .slots
            .iter_mut()
            .filter(|slot| slot.active)
            .nth(index)
        {
            Some(slot) => {
                slot.acked = true;
                true
            }
            None => false,
        }
    }

    /// Deactivate every active, unacknowledged error alarm. Returns how many were cleared.
    pub fn clear_unacked_errors(&mut self) -> usize {
        let mut cleared = 0;
        for slot in self.slots.iter_mut() {
            if slot.active && !slot.acked && slot.severity == AlarmSeverity::Error {
                slot.active = false;
                cleared += 1;
            }
        }
        if cleared > 0 {
            debug!(cleared, "cleared unacknowledged error alarms");
        }
        cleared
    }

    /// Highest slot index ever populated, plus one.
    pub fn high_water_mark(&self) -> usize {
        self.high_water
    }
}

/// Alarm writer handed to models for one tick, stamping each raise with the tick time.
#[derive(Debug)]
pub struct AlarmSink<'a> {
    registry: &'a mut AlarmRegistry,
    now_ms: u64,
    raised: usize,
}

impl<'a> AlarmSink<'a> {
    pub fn new(registry: &'a mut AlarmRegistry, now_ms: u64) -> Self {
        Self {
            registry,
            now_ms,
            raised: 0,
        }
    }

    /// New alarms written through this sink so far.
    pub fn raised(&self) -> usize {
        self.raised
    }

    pub fn raise(&mut self, severity: AlarmSeverity, message: &str) -> AlarmInsert {
        let outcome = self.registry.raise(severity, message, self.now_ms);
        match &outcome {
            AlarmInsert::Duplicate => {}
            AlarmInsert::Inserted { slot } => {
                self.raised += 1;
                debug!(slot, severity = %severity, message, "alarm raised");
            }
            AlarmInsert::Evicted { slot, evicted } => {
                self.raised += 1;
                debug!(
                    slot,
                    severity = %severity,
                    message,
                    evicted = evicted.message(),
                    "alarm raised, oldest entry evicted"
                );
            }
        }
        outcome
    }

    pub fn error(&mut self, message: &str) -> AlarmInsert {
        self.raise(AlarmSeverity::Error, message)
    }

    pub fn warning(&mut self, message: &str) -> AlarmInsert {
        self.raise(AlarmSeverity::Warning, message)
    }

    pub fn info(&mut self, message: &str) -> AlarmInsert {
        self.raise(AlarmSeverity::Info, message)
    }
}

fn bounded_message(message: &str) -> &str {
    if message.len() <= MAX_ALARM_MESSAGE_LEN {
        return message;
    }
    let mut end = MAX_ALARM_MESSAGE_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}
