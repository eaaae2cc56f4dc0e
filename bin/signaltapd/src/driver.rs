//! ---
//! sigtap_section: "12-daemon"
//! sigtap_subsection: "binary"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Fixed-period tick loop driving the shared simulation engine."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use signaltap_common::time::jitter_us;
use signaltap_common::{LoopTimingReporter, SimulationConfig};
use signaltap_rt::RateLimiter;
use signaltap_sim::{SimulationEngine, TickReport};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Engine handle shared between the tick loop and anything observing it.
pub type SharedEngine = Arc<Mutex<SimulationEngine>>;

#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub tick_interval: Duration,
    pub rotate_after_cycles: Option<u32>,
    pub exit_after_ticks: Option<u64>,
    /// Where the jitter histogram is written once the loop stops.
    pub jitter_report: Option<PathBuf>,
}

impl From<&SimulationConfig> for DriverSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            tick_interval: config.tick_interval,
            rotate_after_cycles: config.rotate_after_cycles,
            exit_after_ticks: config.exit_after_ticks,
            jitter_report: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverSummary {
    pub ticks: u64,
    pub rotations: u32,
}

/// Tracks completed cycles on the active profile and decides when to move on.
#[derive(Debug, Clone, Copy)]
struct Rotation {
    after_cycles: Option<u32>,
    completed: u32,
}

impl Rotation {
    fn new(after_cycles: Option<u32>) -> Self {
        Self {
            after_cycles,
            completed: 0,
        }
    }

    fn observe(&mut self, report: &TickReport) -> bool {
        let Some(limit) = self.after_cycles else {
            return false;
        };
        if !report
            .transition
            .is_some_and(|transition| transition.completes_cycle())
        {
            return false;
        }
        self.completed += 1;
        if self.completed >= limit {
            self.completed = 0;
            true
        } else {
            false
        }
    }
}

/// Run one engine tick and apply rotation. Returns `None` when the engine is empty.
fn drive_tick(engine: &SharedEngine, rotation: &mut Rotation) -> Option<(TickReport, bool)> {
    let mut engine = engine.lock();
    let report = engine.tick()?;
    log_new_alarms(&engine, &report);
    let rotated = rotation.observe(&report);
    if rotated {
        let index = engine.next_profile();
        info!(
            profile_index = index,
            profile = engine.active_profile().map(|p| p.id()).unwrap_or("-"),
            "rotating to next profile"
        );
    }
    Some((report, rotated))
}

fn log_new_alarms(engine: &SimulationEngine, report: &TickReport) {
    if report.new_alarms == 0 {
        return;
    }
    for alarm in engine
        .alarms()
        .filter(|alarm| alarm.trigger_time_ms() == report.uptime_ms)
    {
        info!(
            severity = %alarm.severity(),
            time = alarm.time(),
            message = alarm.message(),
            "alarm raised"
        );
    }
}

/// Drive `engine` at `settings.tick_interval` until shutdown or the tick budget is spent.
pub async fn run_tick_loop(
    engine: SharedEngine,
    settings: DriverSettings,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<DriverSummary> {
    let mut limiter = RateLimiter::new(settings.tick_interval);
    let reporter = LoopTimingReporter::new(settings.tick_interval);
    let mut rotation = Rotation::new(settings.rotate_after_cycles);
    let mut summary = DriverSummary::default();
    let mut last_tick: Option<tokio::time::Instant> = None;

    info!(
        interval_ms = settings.tick_interval.as_millis() as u64,
        rotate_after_cycles = ?settings.rotate_after_cycles,
        exit_after_ticks = ?settings.exit_after_ticks,
        "tick loop started"
    );

    'tick_loop: loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("shutdown signal received; stopping tick loop");
                break 'tick_loop;
            }
            now = limiter.tick() => {
                reporter.record_tick_at(now.into_std());
                let jitter = last_tick
                    .map(|previous| jitter_us(now.duration_since(previous), settings.tick_interval))
                    .unwrap_or(0);
                last_tick = Some(now);

                let Some((report, rotated)) = drive_tick(&engine, &mut rotation) else {
                    warn!("simulation engine has no profiles; stopping tick loop");
                    break 'tick_loop;
                };
                summary.ticks = report.tick;
                if rotated {
                    summary.rotations += 1;
                }
                {
                    let engine = engine.lock();
                    debug!(
                        tick = report.tick,
                        uptime = %engine.uptime().hms(),
                        scenario = engine.scenario_name(),
                        alarms = engine.alarm_count(),
                        jitter_us = jitter,
                        "tick complete"
                    );
                }

                if let Some(limit) = settings.exit_after_ticks {
                    if report.tick >= limit {
                        warn!(ticks = report.tick, "exit_after_ticks reached; stopping tick loop");
                        break 'tick_loop;
                    }
                }
            }
        }
    }

    if let Some(path) = &settings.jitter_report {
        if let Some(parent) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(error = %err, "failed to create jitter report directory");
            }
        }
        if let Err(err) = reporter.histogram().write_json(path) {
            warn!(error = %err, path = %path.display(), "failed to write jitter histogram");
        }
    }
    if let Some(stats) = reporter.histogram().summary() {
        debug!(?stats, "jitter summary");
    }

    Ok(summary)
}
