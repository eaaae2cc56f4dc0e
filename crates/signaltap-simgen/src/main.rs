//! ---
//! sigtap_section: "11-simulation"
//! sigtap_subsection: "01-bootstrap"
//! sigtap_type: "source"
//! sigtap_scope: "code"
//! sigtap_description: "Headless trace generator exporting scenario runs as CSV or JSON."
//! sigtap_version: "v0.1.0"
//! sigtap_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use serde::ser::{SerializeSeq, Serializer};
use signaltap_common::SimulationConfig;
use signaltap_sim::{EngineOptions, ProfileCatalog, SimulationEngine, TickRecord};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Export SignalTap scenario simulation traces",
    long_about = None
)]
struct Cli {
    /// Profile id to simulate (cnc, chiller, compressor, plc for the built-in catalog)
    #[arg(long, default_value = "cnc")]
    profile: String,

    /// Alternative TOML profile catalog
    #[arg(long = "profiles", value_name = "FILE")]
    profiles_path: Option<PathBuf>,

    /// Output file path. Use '-' for stdout.
    #[arg(long, default_value = "simulation.csv")]
    output: PathBuf,

    /// Explicit output format when extension is ambiguous
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Simulated seconds to run at one tick per second (ignored when --ticks supplied)
    #[arg(long, default_value_t = 102)]
    duration_secs: u64,

    /// Uptime added per tick in milliseconds; alarm timestamps follow this spacing
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Explicit number of ticks to generate (overrides --duration-secs)
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed for the engine
    #[arg(long)]
    seed: Option<u64>,

    /// Start a firmware download before this tick (1-based)
    #[arg(long, value_name = "TICK")]
    ota_at: Option<u64>,

    /// Firmware version reported in OTA alarms
    #[arg(long)]
    firmware_version: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.interval_ms == 0 {
        return Err(anyhow!("interval-ms must be greater than zero"));
    }

    let format = determine_format(&cli.output, cli.format)?;
    let total_ticks = compute_tick_count(&cli)?;
    let mut engine = build_engine(&cli)?;

    match format {
        OutputFormat::Csv => write_csv(&cli, total_ticks, &mut engine)?,
        OutputFormat::Json => write_json(&cli, total_ticks, &mut engine)?,
    }

    if cli.output.as_os_str() != "-" {
        eprintln!(
            "generated {} ticks for profile {} -> {}",
            total_ticks,
            cli.profile,
            cli.output.display()
        );
    }

    Ok(())
}

fn compute_tick_count(cli: &Cli) -> Result<u64> {
    if let Some(ticks) = cli.ticks {
        return if ticks == 0 {
            Err(anyhow!("ticks must be greater than zero"))
        } else {
            Ok(ticks)
        };
    }
    Ok(cli.duration_secs.max(1))
}

fn determine_format(path: &Path, override_format: Option<OutputFormat>) -> Result<OutputFormat> {
    if let Some(format) = override_format {
        return Ok(format);
    }
    if path.as_os_str() == "-" {
        return Ok(OutputFormat::Json);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(OutputFormat::Json),
        Some("csv") => Ok(OutputFormat::Csv),
        _ => Ok(OutputFormat::Csv),
    }
}

fn build_engine(cli: &Cli) -> Result<SimulationEngine> {
    let catalog = ProfileCatalog::load(cli.profiles_path.as_deref())?;
    let initial_profile = catalog
        .index_of(&cli.profile)
        .with_context(|| format!("unknown profile `{}`", cli.profile))?;
    let defaults = SimulationConfig::default();
    let options = EngineOptions {
        seed: cli.seed.unwrap_or(defaults.random_seed),
        tick_period: Duration::from_millis(cli.interval_ms),
        firmware_version: cli
            .firmware_version
            .clone()
            .unwrap_or(defaults.firmware_version),
        initial_profile,
    };
    Ok(SimulationEngine::new(&catalog, options))
}

fn next_record(cli: &Cli, engine: &mut SimulationEngine, tick: u64) -> Result<TickRecord> {
    if cli.ota_at == Some(tick) {
        engine.start_ota();
    }
    let report = engine
        .tick()
        .context("simulation engine has no active profile")?;
    TickRecord::capture(engine, &report).context("simulation engine has no active profile")
}

fn write_csv(cli: &Cli, ticks: u64, engine: &mut SimulationEngine) -> Result<()> {
    let writer: Box<dyn Write> =
        if cli.output.as_os_str() == "-" {
            Box::new(io::stdout())
        } else {
            Box::new(File::create(&cli.output).with_context(|| {
                format!("failed to create output file {}", cli.output.display())
            })?)
        };
    let mut writer = csv::Writer::from_writer(writer);
    for tick in 1..=ticks {
        let record = next_record(cli, engine, tick)?;
        writer.serialize(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Stream records into a pretty JSON array; memory stays flat however many ticks run.
fn write_json(cli: &Cli, ticks: u64, engine: &mut SimulationEngine) -> Result<()> {
    let writer: Box<dyn Write> =
        if cli.output.as_os_str() == "-" {
            Box::new(io::stdout().lock())
        } else {
            Box::new(File::create(&cli.output).with_context(|| {
                format!("failed to create output file {}", cli.output.display())
            })?)
        };
    let mut writer = io::BufWriter::new(writer);
    {
        let mut serializer = serde_json::Serializer::pretty(&mut writer);
        let mut seq = (&mut serializer).serialize_seq(None)?;
        for tick in 1..=ticks {
            seq.serialize_element(&next_record(cli, engine, tick)?)?;
        }
        seq.end()?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn base_cli() -> Cli {
        Cli {
            profile: "cnc".into(),
            profiles_path: None,
            output: PathBuf::from("out.csv"),
            format: None,
            duration_secs: 102,
            interval_ms: 1000,
            ticks: None,
            seed: Some(7),
            ota_at: None,
            firmware_version: None,
        }
    }

    #[test]
    fn compute_tick_count_uses_duration() {
        let cli = base_cli();
        assert_eq!(compute_tick_count(&cli).unwrap(), 102);
    }

    #[test]
    fn compute_tick_count_prefers_explicit_ticks() {
        let mut cli = base_cli();
        cli.ticks = Some(5);
        assert_eq!(compute_tick_count(&cli).unwrap(), 5);
        cli.ticks = Some(0);
        assert!(compute_tick_count(&cli).is_err());
    }

    #[test]
    fn determine_format_defaults_csv() {
        let format = determine_format(Path::new("trace.data"), None).unwrap();
        assert!(matches!(format, OutputFormat::Csv));
    }

    #[test]
    fn determine_format_for_stdout_defaults_json() {
        let format = determine_format(Path::new("-"), None).unwrap();
        assert!(matches!(format, OutputFormat::Json));
    }

    #[test]
    fn build_engine_selects_requested_profile() {
        let mut cli = base_cli();
        cli.profile = "compressor".into();
        let engine = build_engine(&cli).expect("engine");
        assert_eq!(engine.active_index(), 2);
    }

    #[test]
    fn build_engine_rejects_unknown_profile() {
        let mut cli = base_cli();
        cli.profile = "boiler".into();
        let err = build_engine(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("boiler"));
    }

    #[test]
    fn ota_starts_at_requested_tick() {
        let mut cli = base_cli();
        cli.ota_at = Some(3);
        let mut engine = build_engine(&cli).expect("engine");
        let records: Vec<TickRecord> = (1..=4)
            .map(|tick| next_record(&cli, &mut engine, tick).expect("record"))
            .collect();
        assert!(!records[1].ota_active);
        assert!(records[2].ota_active);
        assert!(records[2].ota_progress >= 2);
    }

    #[test]
    fn csv_output_has_one_row_per_tick() {
        let mut cli = base_cli();
        let file = NamedTempFile::new().expect("temp file");
        let path = file.into_temp_path();
        cli.output = path.to_path_buf();
        cli.ticks = Some(10);
        let mut engine = build_engine(&cli).expect("engine");
        write_csv(&cli, 10, &mut engine).expect("csv written");

        let mut reader = csv::Reader::from_path(&cli.output).expect("csv readable");
        let rows: Vec<TickRecord> = reader
            .deserialize::<TickRecord>()
            .collect::<Result<_, _>>()
            .expect("rows parse");
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].tick, 1);
        assert_eq!(rows[9].state_timer, 10);
        assert!(rows.iter().all(|row| row.profile == "cnc"));
        path.close().unwrap();
    }

    #[test]
    fn json_output_is_an_array_of_records() {
        let mut cli = base_cli();
        let file = NamedTempFile::new().expect("temp file");
        let path = file.into_temp_path();
        cli.output = path.to_path_buf();
        let mut engine = build_engine(&cli).expect("engine");
        write_json(&cli, 102, &mut engine).expect("json written");

        let raw = std::fs::read_to_string(&cli.output).expect("json readable");
        let records: Vec<TickRecord> = serde_json::from_str(&raw).expect("json parses");
        assert_eq!(records.len(), 102);
        let last = records.last().expect("last record");
        assert_eq!(last.scenario, "normal");
        assert_eq!(last.cycle, 1);
        path.close().unwrap();
    }

    #[test]
    fn json_stream_preserves_tick_order() {
        let mut cli = base_cli();
        let file = NamedTempFile::new().expect("temp file");
        let path = file.into_temp_path();
        cli.output = path.to_path_buf();
        cli.ticks = Some(u64::MAX);
        assert_eq!(compute_tick_count(&cli).unwrap(), u64::MAX);
        let mut engine = build_engine(&cli).expect("engine");
        write_json(&cli, 3, &mut engine).expect("json written");

        let raw = std::fs::read_to_string(&cli.output).expect("json readable");
        assert!(raw.ends_with("]\n"));
        let records: Vec<TickRecord> = serde_json::from_str(&raw).expect("json parses");
        let ticks: Vec<u64> = records.iter().map(|record| record.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3]);
        path.close().unwrap();
    }
}
