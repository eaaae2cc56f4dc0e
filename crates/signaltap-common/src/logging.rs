//! ---
//! sigtap_section: "02-shared-runtime"
//! sigtap_subsection: "module"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Tracing subscriber setup for SignalTap drivers."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Filter override consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "SIGNALTAP_LOG";

const DEFAULT_DIRECTIVE: &str = "debug";

/// Writer guards must outlive the subscriber or buffered lines are lost on exit.
static GUARDS: OnceCell<[WorkerGuard; 2]> = OnceCell::new();

/// Stdout rendering for the drivers. The rolling file is always JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Build the level filter from an explicit directive, then `RUST_LOG`, then `debug`.
///
/// A malformed directive is reported on stderr and replaced by the default so a
/// typo never silences the daemon.
fn level_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("ignoring invalid {LOG_ENV} directive `{directive}`: {err}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

/// Daily log file name, e.g. `signaltapd.log` or `bench-signaltapd.log`.
fn log_file_name(service_name: &str, config: &LoggingConfig) -> String {
    match config.file_prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}-{service_name}.log"),
        _ => format!("{service_name}.log"),
    }
}

/// Install the global subscriber for `service_name`.
///
/// Stdout gets [`LoggingConfig::format`]; a daily rolling JSON file is written
/// under [`LoggingConfig::directory`]. Calling this twice keeps the first
/// subscriber.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "unable to create log directory {}",
            config.directory.display()
        )
    })?;

    let appender = rolling::daily(&config.directory, log_file_name(service_name, config));
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let stdout_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .json()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stdout_writer)
            .boxed(),
    };
    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(file_writer)
        .boxed();

    let directive = std::env::var(LOG_ENV).ok();
    let installed = tracing_subscriber::registry()
        .with(level_filter(directive.as_deref()))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_ok();
    if installed {
        let _ = GUARDS.set([file_guard, stdout_guard]);
        info!(
            service = service_name,
            log_dir = %config.directory.display(),
            format = ?config.format,
            "tracing initialised"
        );
    }
    Ok(())
}
