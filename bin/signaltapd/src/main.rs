//! ---
//! sigtap_section: "12-daemon"
//! sigtap_subsection: "binary"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Binary entrypoint for the SignalTap simulation daemon."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
mod driver;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use signaltap_common::{init_tracing, AppConfig, SimulationConfig};
use signaltap_sim::{ProfileCatalog, SimulationEngine};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::driver::{run_tick_loop, DriverSettings};

#[derive(Debug, Parser)]
#[command(author, version, about = "SignalTap simulation daemon", long_about = None)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "ID", help = "Profile id to start on, overriding initial_profile")]
    profile: Option<String>,

    #[arg(long, help = "Override the simulation random seed")]
    seed: Option<u64>,

    #[arg(long, value_name = "N", help = "Stop after N ticks")]
    ticks: Option<u64>,

    #[arg(long, help = "Start a firmware download as soon as the engine boots")]
    ota: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/signaltap.toml"));
    candidates.push(PathBuf::from("configs/signaltap.example.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    init_tracing("signaltapd", &config.logging)?;
    info!(config_path = %loaded.source.display(), "configuration loaded");

    apply_overrides(&mut config.simulation, &cli)?;
    let mut engine = SimulationEngine::from_config(&config.simulation)?;
    if config.simulation.start_ota_on_boot && !engine.start_ota() {
        warn!("firmware update requested on boot but no profile is active");
    }
    let engine = Arc::new(Mutex::new(engine));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("ctrl-c received"),
            Err(err) => warn!(error = %err, "failed to listen for ctrl-c"),
        }
        let _ = shutdown_tx.send(());
    });

    let settings = DriverSettings {
        jitter_report: Some(config.logging.directory.join("signaltapd-jitter.json")),
        ..DriverSettings::from(&config.simulation)
    };
    let summary = run_tick_loop(engine, settings, shutdown_rx).await?;
    info!(
        ticks = summary.ticks,
        rotations = summary.rotations,
        "signaltapd stopped"
    );
    Ok(())
}

fn apply_overrides(simulation: &mut SimulationConfig, cli: &Cli) -> Result<()> {
    if let Some(seed) = cli.seed {
        simulation.random_seed = seed;
    }
    if let Some(ticks) = cli.ticks {
        simulation.exit_after_ticks = Some(ticks);
    }
    if cli.ota {
        simulation.start_ota_on_boot = true;
    }
    if let Some(profile) = &cli.profile {
        let catalog = ProfileCatalog::load(simulation.profiles_path.as_deref())?;
        simulation.initial_profile = catalog
            .index_of(profile)
            .with_context(|| format!("unknown profile `{profile}`"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("signaltapd").chain(args.iter().copied()))
    }

    #[test]
    fn overrides_replace_configured_values() {
        let mut simulation = SimulationConfig::default();
        apply_overrides(
            &mut simulation,
            &cli(&["--seed", "42", "--ticks", "10", "--profile", "chiller", "--ota"]),
        )
        .expect("overrides apply");
        assert_eq!(simulation.random_seed, 42);
        assert_eq!(simulation.exit_after_ticks, Some(10));
        assert_eq!(simulation.initial_profile, 1);
        assert!(simulation.start_ota_on_boot);
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let mut simulation = SimulationConfig::default();
        let err = apply_overrides(&mut simulation, &cli(&["--profile", "boiler"])).unwrap_err();
        assert!(format!("{err:#}").contains("boiler"));
    }

    #[test]
    fn example_config_parses() {
        let config: AppConfig = include_str!("../../../configs/signaltap.example.toml")
            .parse()
            .expect("example config");
        assert!(config.simulation.exit_after_ticks.is_none());
        assert!(SimulationEngine::from_config(&config.simulation).is_ok());
    }
}
