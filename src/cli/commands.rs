//! Command handler implementations
//!
//! Each subcommand gets a handler; `run_command` dispatches. Handlers talk
//! to the library through an explicit [`Session`] rather than shared state,
//! and report failures as messages; nothing here panics the process.

use crate::cli::args::{Args, Commands, RecordSource};
use crate::cli::progress::{format_bytes, print_info, print_success, print_warning};
use crate::core::category::Category;
use crate::core::config::{self, Config};
use crate::core::error::TriageError;
use crate::core::evidence::{CollectorOutcome, EvidenceSnapshot};
use crate::core::records::{call_type_label, parse_content_rows};
use crate::core::session::Session;
use crate::core::staging::StagingArea;
use crate::device::adb::AdbClient;
use crate::device::mock::MockDevice;
use crate::device::traits::{Device, DeviceEntry};
use crate::report::{self, FailingLlmClient, HttpLlmClient, LlmClient, StaticLlmClient};
use anyhow::{bail, Context, Result};
use dialoguer::Select;
use log::info;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Dispatch the parsed command
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    match &args.command {
        Commands::Devices => cmd_devices(config),
        Commands::Extract { category, all } => {
            cmd_extract(args, config, *category, *all, shutdown_flag)
        }
        Commands::Records { source, raw } => cmd_records(args, config, *source, *raw),
        Commands::Collect => cmd_collect(args, config, shutdown_flag),
        Commands::Report { output, offline } => cmd_report(config, output.clone(), *offline),
        Commands::Scan { category } => cmd_scan(args, config, *category),
        Commands::Cleanup => cmd_cleanup(config),
        Commands::Config { reset } => cmd_config(*reset),
        Commands::ShowConfig => cmd_show_config(config),
        Commands::GenerateConfig { output } => cmd_generate_config(output.clone()),
        Commands::SimulateExtract { category } => {
            cmd_simulate_extract(config, *category, shutdown_flag)
        }
    }
}

/// Build the ADB client from config
fn adb_client(config: &Config) -> AdbClient {
    AdbClient::new(
        config.adb.binary.clone(),
        &config.adb.host,
        config.adb.port,
        Duration::from_secs(config.adb.command_timeout_secs),
    )
}

/// Pick the device to operate on.
///
/// Priority: `--serial` flag, then config, then the single attached device,
/// then an interactive prompt when several are attached.
fn resolve_device(args: &Args, config: &Config) -> Result<crate::device::adb::AdbDevice> {
    let client = adb_client(config);
    let devices: Vec<DeviceEntry> = client
        .devices()?
        .into_iter()
        .filter(|d| d.is_connectable())
        .collect();

    if devices.is_empty() {
        bail!(TriageError::NoDevicesFound);
    }

    let requested = args
        .serial
        .clone()
        .or_else(|| config.adb.serial.clone());

    let serial = match requested {
        Some(serial) => serial,
        None if devices.len() == 1 => devices[0].serial.clone(),
        None => {
            let labels: Vec<String> = devices
                .iter()
                .map(|d| match &d.model {
                    Some(model) => format!("{} ({})", d.serial, model),
                    None => d.serial.clone(),
                })
                .collect();
            let index = Select::new()
                .with_prompt("Select a device")
                .items(&labels)
                .default(0)
                .interact()
                .context("Device selection cancelled")?;
            devices[index].serial.clone()
        }
    };

    Ok(client.open(&serial)?)
}

/// Staging area from config/flags (usable without a device)
fn staging_area(config: &Config) -> StagingArea {
    StagingArea::new(config.staging.root.clone())
}

fn cmd_devices(config: &Config) -> Result<()> {
    let devices = adb_client(config).devices()?;

    if devices.is_empty() {
        print_warning("No devices found.");
        return Ok(());
    }

    println!("Attached devices:");
    for device in &devices {
        let model = device.model.as_deref().unwrap_or("-");
        let marker = if device.is_connectable() { " " } else { "!" };
        println!("  {} {}  {}  {}", marker, device.serial, device.state, model);
    }
    Ok(())
}

fn cmd_extract(
    args: &Args,
    config: &Config,
    category: Option<Category>,
    all: bool,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()> {
    let categories: Vec<Category> = if all {
        Category::ALL.to_vec()
    } else {
        match category {
            Some(c) => vec![c],
            None => bail!("Specify a category or use --all"),
        }
    };

    let device = resolve_device(args, config)?;
    info!("Connected to {}", device.serial());
    let session = Session::new(&device, config, shutdown_flag);

    for category in categories {
        let outcome = session.extract(category)?;
        let total_bytes: u64 = outcome.staged.iter().map(|f| f.size).sum();
        print_success(&format!(
            "{}: {} files staged ({}), {} failed, {} skipped",
            category,
            outcome.staged.len(),
            format_bytes(total_bytes),
            outcome.failed,
            outcome.skipped
        ));
        for staged in &outcome.staged {
            print_info(&staged.local_path.display().to_string());
        }
        if outcome.interrupted {
            print_warning("Extraction interrupted; staged files reflect the partial pass.");
            break;
        }
    }
    Ok(())
}

fn cmd_records(args: &Args, config: &Config, source: RecordSource, raw: bool) -> Result<()> {
    let device = resolve_device(args, config)?;
    let output = device.shell(&format!("content query --uri {}", source.uri()))?;

    if raw {
        println!("{}", output);
        return Ok(());
    }

    let rows = parse_content_rows(&output);
    if rows.is_empty() {
        print_warning("No rows parsed from provider output.");
        return Ok(());
    }

    for (index, row) in rows.iter().enumerate() {
        println!("--- row {} ---", index);
        for (key, value) in row {
            println!("  {} = {}", key, value);
            if source == RecordSource::Calls && key == "type" {
                println!("  type_label = {}", call_type_label(value));
            }
        }
    }
    print_success(&format!("{} rows", rows.len()));
    Ok(())
}

fn cmd_collect(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    let device = resolve_device(args, config)?;
    let session = Session::new(&device, config, shutdown_flag);

    let snapshot = session.collect_evidence()?;

    println!("Case: {}", snapshot.case_id());
    for (name, outcome) in [
        ("files", describe(&snapshot.files)),
        ("calls", describe(&snapshot.calls)),
        ("sms", describe(&snapshot.sms)),
        ("usage_stats", describe(&snapshot.usage_stats)),
    ] {
        print_info(&format!("{}: {}", name, outcome));
    }
    print_success(&format!(
        "Snapshot written to {}",
        session.staging().snapshot_path().display()
    ));
    Ok(())
}

/// One-line status of a collector outcome
fn describe<T>(outcome: &CollectorOutcome<Vec<T>>) -> String {
    match outcome {
        CollectorOutcome::Collected(records) => format!("{} records", records.len()),
        CollectorOutcome::Failed { error } => format!("failed ({})", error),
    }
}

fn cmd_report(config: &Config, output: Option<PathBuf>, offline: bool) -> Result<()> {
    let staging = staging_area(config);
    let snapshot_path = staging.snapshot_path();
    if !snapshot_path.exists() {
        bail!(
            "No snapshot at {}. Run 'droidforen collect' first.",
            snapshot_path.display()
        );
    }

    let snapshot = EvidenceSnapshot::load(&snapshot_path)?;
    let output_dir = output.unwrap_or_else(|| config.report.output_dir.clone());

    let client: Box<dyn LlmClient> = if offline {
        Box::new(StaticLlmClient::new(
            "(offline run; analysis not generated)",
        ))
    } else {
        match HttpLlmClient::from_config(&config.report) {
            Ok(client) => Box::new(client),
            Err(e) => {
                // A missing key degrades the sections, not the document.
                print_warning(&format!("{}", e));
                Box::new(FailingLlmClient)
            }
        }
    };

    let path = report::generate_report(&snapshot, client.as_ref(), &output_dir)?;
    print_success(&format!("Report written to {}", path.display()));
    Ok(())
}

fn cmd_scan(args: &Args, config: &Config, category: Option<Category>) -> Result<()> {
    let device = resolve_device(args, config)?;
    let root = &config.extraction.listing_root;
    let raw = device.shell(&format!("ls -R {}", root))?;

    let paths = crate::core::listing::parse_recursive_listing(root, &raw);
    let mut shown = 0usize;
    for path in &paths {
        if let Some(category) = category {
            if !category.matches(path) {
                continue;
            }
        }
        println!("{}", path);
        shown += 1;
    }
    print_success(&format!("{} of {} paths", shown, paths.len()));
    Ok(())
}

fn cmd_cleanup(config: &Config) -> Result<()> {
    let staging = staging_area(config);
    EvidenceSnapshot::delete(&staging.snapshot_path())?;
    staging.cleanup()?;
    print_success(&format!("Cleared staging at {}", staging.root().display()));
    Ok(())
}

fn cmd_config(reset: bool) -> Result<()> {
    if reset {
        let path = config::ensure_config_dir()?.join("config.toml");
        std::fs::write(&path, Config::generate_default_config())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        print_success(&format!("Config reset at {}", path.display()));
        return Ok(());
    }

    let path = config::init_config()?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{}", rendered);
    Ok(())
}

fn cmd_generate_config(output: Option<PathBuf>) -> Result<()> {
    let path = match output {
        Some(path) => {
            std::fs::write(&path, Config::generate_default_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
        None => config::init_config()?,
    };
    print_success(&format!("Config written to {}", path.display()));
    Ok(())
}

fn cmd_simulate_extract(
    config: &Config,
    category: Category,
    shutdown_flag: Arc<AtomicBool>,
) -> Result<()> {
    let device = simulated_device();
    let session = Session::new(&device, config, shutdown_flag);

    let outcome = session.extract(category)?;
    print_success(&format!(
        "Simulated {}: {} staged, {} failed, {} skipped",
        category,
        outcome.staged.len(),
        outcome.failed,
        outcome.skipped
    ));
    for staged in &outcome.staged {
        print_info(&format!(
            "{} <- {} ({})",
            staged.local_path.display(),
            staged.remote_path,
            format_bytes(staged.size)
        ));
    }
    Ok(())
}

/// The built-in mock device used by simulate-extract
fn simulated_device() -> MockDevice {
    let mut device = MockDevice::new("SIMULATED");
    device.add_file("/sdcard/DCIM/Camera/IMG_0001.jpg", b"\xFF\xD8\xFF\xE0 demo");
    device.add_file("/sdcard/DCIM/Camera/IMG_0002.png", b"\x89PNG demo");
    device.add_file("/sdcard/Download/invoice.pdf", b"%PDF-1.4 demo");
    device.add_file("/sdcard/Download/notes.txt", b"plain text");
    device.add_file("/sdcard/Movies/clip.mp4", b"mp4 demo");
    device.add_file("/sdcard/Music/song.mp3", b"mp3 demo");
    device.add_file("/sdcard/Download/backup.tar.gz", b"gz demo");
    let listing = device.listing_from_files();
    device.script_shell("ls -R /sdcard", &listing);
    device
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_outcomes() {
        let collected: CollectorOutcome<Vec<u32>> = CollectorOutcome::Collected(vec![1, 2, 3]);
        assert_eq!(describe(&collected), "3 records");

        let failed: CollectorOutcome<Vec<u32>> = CollectorOutcome::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(describe(&failed), "failed (boom)");
    }

    #[test]
    fn test_simulated_device_covers_every_category() {
        let device = simulated_device();
        let listing = device.shell("ls -R /sdcard").unwrap();
        let paths = crate::core::listing::parse_recursive_listing("/sdcard", &listing);
        for category in Category::ALL {
            assert!(
                paths.iter().any(|p| category.matches(p)),
                "no sample file for {}",
                category
            );
        }
    }
}
