//! Evidence aggregation
//!
//! At connection time four independent collectors run against the device:
//! call log, SMS, a bounded file summary, and the usage-stats dump. Each is
//! wrapped so its own failure becomes an explicit error record in the
//! snapshot instead of aborting the others. The composed snapshot carries
//! the device identity and a derived case identifier and is persisted as a
//! single JSON document, overwritten wholesale and deleted on cleanup.

use crate::core::category::classify;
use crate::core::config::EvidenceConfig;
use crate::core::error::{Result, TriageError};
use crate::core::listing::parse_recursive_listing;
use crate::core::records::{call_type_label, parse_content_rows, parse_usage_stats, ContentRow, UsageEvent};
use crate::core::staging::StagingArea;
use crate::device::traits::{Device, DeviceProperties};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Remote path the usage-stats dump is redirected to before pulling
const REMOTE_USAGE_DUMP: &str = "/sdcard/usage_dump.txt";

/// Result of one collector: its records, or an explicit error marker.
///
/// Serialized untagged, so a snapshot key holds either the record list or
/// `{"error": "..."}`; the key itself is always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectorOutcome<T> {
    Collected(T),
    Failed { error: String },
}

impl<T> CollectorOutcome<T> {
    /// Wrap a fallible collector call
    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(records) => CollectorOutcome::Collected(records),
            Err(e) => CollectorOutcome::Failed {
                error: e.to_string(),
            },
        }
    }

    /// Whether the collector produced records
    pub fn is_collected(&self) -> bool {
        matches!(self, CollectorOutcome::Collected(_))
    }
}

/// One entry of the bounded file summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummaryEntry {
    /// Absolute path on the device
    pub path: String,
    /// Category name, or "Other" for unclassified files
    #[serde(rename = "type")]
    pub file_type: String,
}

/// The aggregated, persisted record of device artifacts
#[derive(Debug, Serialize, Deserialize)]
pub struct EvidenceSnapshot {
    /// Device identity properties plus the derived case_id
    pub device_info: BTreeMap<String, String>,
    /// Bounded file summary across well-known directories
    pub files: CollectorOutcome<Vec<FileSummaryEntry>>,
    /// Call log rows (with derived type_label fields)
    pub calls: CollectorOutcome<Vec<ContentRow>>,
    /// SMS rows
    pub sms: CollectorOutcome<Vec<ContentRow>>,
    /// Parsed usage-stats events
    pub usage_stats: CollectorOutcome<Vec<UsageEvent>>,
}

impl EvidenceSnapshot {
    /// Run all collectors against a connected device and compose a snapshot.
    ///
    /// Collector failures degrade to error markers; only identity reading
    /// is unconditional (and itself degrades field-by-field).
    pub fn collect(
        device: &dyn Device,
        staging: &StagingArea,
        evidence_config: &EvidenceConfig,
    ) -> Self {
        let props = DeviceProperties::read_from(device);
        let case_id = derive_case_id(&props.serial);
        info!("Collecting evidence for case {}", case_id);

        let mut device_info = props.as_map();
        device_info.insert("case_id".to_string(), case_id);

        let files =
            CollectorOutcome::from_result(collect_file_summary(device, evidence_config));
        let calls = CollectorOutcome::from_result(collect_call_log(device));
        let sms = CollectorOutcome::from_result(collect_sms(device));
        let usage_stats = CollectorOutcome::from_result(collect_usage_stats(device, staging));

        for (name, ok) in [
            ("files", files.is_collected()),
            ("calls", calls.is_collected()),
            ("sms", sms.is_collected()),
            ("usage_stats", usage_stats.is_collected()),
        ] {
            if !ok {
                warn!("Collector '{}' failed; snapshot carries an error marker", name);
            }
        }

        Self {
            device_info,
            files,
            calls,
            sms,
            usage_stats,
        }
    }

    /// The case identifier derived at collection time
    pub fn case_id(&self) -> &str {
        self.device_info
            .get("case_id")
            .map(String::as_str)
            .unwrap_or("unknown-case")
    }

    /// Persist the snapshot, overwriting any prior one
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TriageError::Persistence(format!("Failed to serialize snapshot: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TriageError::Persistence(format!("Failed to create '{}': {}", parent.display(), e)))?;
        }
        fs::write(path, json)
            .map_err(|e| TriageError::Persistence(format!("Failed to write snapshot: {}", e)))
    }

    /// Load a previously persisted snapshot
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| TriageError::Persistence(format!("Failed to read snapshot: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| TriageError::Persistence(format!("Failed to parse snapshot: {}", e)))
    }

    /// Delete the persisted snapshot if present
    pub fn delete(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .map_err(|e| TriageError::Persistence(format!("Failed to delete snapshot: {}", e)))?;
        }
        Ok(())
    }
}

/// Case identifier: device serial plus collection timestamp
fn derive_case_id(serial: &str) -> String {
    let serial = if serial.is_empty() { "unknown" } else { serial };
    format!("{}_{}", serial, chrono::Local::now().format("%Y%m%d-%H%M%S"))
}

/// Call log rows, each annotated with a derived `type_label`
fn collect_call_log(device: &dyn Device) -> Result<Vec<ContentRow>> {
    let output = device.shell("content query --uri content://call_log/calls")?;
    let mut rows = parse_content_rows(&output);
    for row in &mut rows {
        if let Some(code) = row.get("type").cloned() {
            row.insert("type_label".to_string(), call_type_label(&code).to_string());
        }
    }
    Ok(rows)
}

/// SMS rows, verbatim key/value maps
fn collect_sms(device: &dyn Device) -> Result<Vec<ContentRow>> {
    let output = device.shell("content query --uri content://sms/")?;
    Ok(parse_content_rows(&output))
}

/// Bounded file summary across the configured well-known directories.
///
/// Stops as soon as the cap is reached; the cap bounds the scan, it is not
/// a sampling strategy.
fn collect_file_summary(
    device: &dyn Device,
    evidence_config: &EvidenceConfig,
) -> Result<Vec<FileSummaryEntry>> {
    let cap = evidence_config.file_summary_cap;
    let mut entries = Vec::new();

    for dir in &evidence_config.summary_dirs {
        if entries.len() >= cap {
            break;
        }
        let listing = match device.shell(&format!("ls -R {}", dir)) {
            Ok(text) => text,
            Err(e) => {
                // A missing directory is normal; record nothing for it.
                warn!("File summary skipping '{}': {}", dir, e);
                continue;
            }
        };

        for path in parse_recursive_listing(dir, &listing) {
            if entries.len() >= cap {
                break;
            }
            let file_type = classify(&path)
                .map(|c| c.display_name().to_string())
                .unwrap_or_else(|| "Other".to_string());
            entries.push(FileSummaryEntry { path, file_type });
        }
    }

    if entries.is_empty() {
        return Err(TriageError::Parse(
            "File summary found no entries in any known directory".to_string(),
        ));
    }

    Ok(entries)
}

/// Usage-stats events: dump to a file on the device, pull it into staging,
/// then parse the pulled text
fn collect_usage_stats(device: &dyn Device, staging: &StagingArea) -> Result<Vec<UsageEvent>> {
    device.shell(&format!("dumpsys usagestats > {}", REMOTE_USAGE_DUMP))?;

    let local = staging.usage_dump_path();
    if let Some(parent) = local.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| TriageError::Persistence(format!("Failed to create '{}': {}", parent.display(), e)))?;
    }
    device.pull(REMOTE_USAGE_DUMP, &local)?;

    let text = fs::read_to_string(&local)
        .map_err(|e| TriageError::Io(format!("Failed to read usage dump: {}", e)))?;
    Ok(parse_usage_stats(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    fn staging() -> (tempfile::TempDir, StagingArea) {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("stage"));
        (dir, staging)
    }

    fn fully_scripted_device() -> MockDevice {
        let mut device = MockDevice::new("CASE01");
        device.script_shell("getprop ro.product.model", "Pixel 7\n");
        device.script_shell("getprop ro.product.manufacturer", "Google\n");
        device.script_shell("getprop ro.build.version.release", "14\n");
        device.script_shell("getprop ro.product.device", "panther\n");
        device.script_shell("getprop ro.serialno", "CASE01\n");
        device.script_shell("getprop ro.product.cpu.abi", "arm64-v8a\n");
        device.script_shell(
            "content query --uri content://call_log/calls",
            "Row: 0 _id=1, number=5551234, type=2, duration=63\n",
        );
        device.script_shell(
            "content query --uri content://sms/",
            "Row: 0 _id=1, address=5559876, body=hello\n",
        );
        device.script_shell("ls -R /sdcard/DCIM", "/sdcard/DCIM:\nimg.jpg\n");
        device.script_shell(
            &format!("dumpsys usagestats > {}", REMOTE_USAGE_DUMP),
            "",
        );
        device.add_file(
            REMOTE_USAGE_DUMP,
            b"time=\"2024-01-15 10:30:00\" type=ACTIVITY_RESUMED package=com.whatsapp\n",
        );
        device
    }

    fn evidence_config_single_dir() -> EvidenceConfig {
        EvidenceConfig {
            file_summary_cap: 200,
            summary_dirs: vec!["/sdcard/DCIM".to_string()],
        }
    }

    #[test]
    fn test_snapshot_collects_all_sections() {
        let (_guard, staging) = staging();
        let device = fully_scripted_device();

        let snapshot = EvidenceSnapshot::collect(&device, &staging, &evidence_config_single_dir());

        assert!(snapshot.files.is_collected());
        assert!(snapshot.calls.is_collected());
        assert!(snapshot.sms.is_collected());
        assert!(snapshot.usage_stats.is_collected());
        assert!(snapshot.case_id().starts_with("CASE01_"));

        if let CollectorOutcome::Collected(calls) = &snapshot.calls {
            assert_eq!(calls[0].get("type_label").map(String::as_str), Some("Outgoing"));
        } else {
            panic!("calls should be collected");
        }
    }

    #[test]
    fn test_snapshot_has_all_keys_when_every_collector_fails() {
        let (_guard, staging) = staging();
        // Nothing scripted: every shell command fails.
        let device = MockDevice::new("CASE02");

        let snapshot = EvidenceSnapshot::collect(
            &device,
            &staging,
            &EvidenceConfig {
                file_summary_cap: 200,
                summary_dirs: vec!["/sdcard/DCIM".to_string()],
            },
        );

        assert!(!snapshot.files.is_collected());
        assert!(!snapshot.calls.is_collected());
        assert!(!snapshot.sms.is_collected());
        assert!(!snapshot.usage_stats.is_collected());

        // Serialized form still carries all four keys with error markers
        let json = serde_json::to_value(&snapshot).unwrap();
        for key in ["files", "calls", "sms", "usage_stats"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
            assert!(
                json[key].get("error").is_some(),
                "expected error marker under {}",
                key
            );
        }
        assert!(json["device_info"].get("case_id").is_some());
    }

    #[test]
    fn test_file_summary_respects_cap() {
        let (_guard, staging) = staging();
        let mut device = fully_scripted_device();

        let mut listing = String::from("/sdcard/DCIM:\n");
        for i in 0..50 {
            listing.push_str(&format!("img{:03}.jpg\n", i));
        }
        device.script_shell("ls -R /sdcard/DCIM", &listing);
        // A second directory that would exceed the cap
        device.script_shell("ls -R /sdcard/Download", "/sdcard/Download:\nmore.pdf\n");

        let config = EvidenceConfig {
            file_summary_cap: 10,
            summary_dirs: vec!["/sdcard/DCIM".to_string(), "/sdcard/Download".to_string()],
        };
        let snapshot = EvidenceSnapshot::collect(&device, &staging, &config);

        match &snapshot.files {
            CollectorOutcome::Collected(files) => {
                assert_eq!(files.len(), 10);
                assert_eq!(files[0].file_type, "Photos");
            }
            CollectorOutcome::Failed { error } => panic!("unexpected failure: {}", error),
        }
    }

    #[test]
    fn test_snapshot_save_load_delete() {
        let (_guard, staging) = staging();
        let device = fully_scripted_device();

        let snapshot = EvidenceSnapshot::collect(&device, &staging, &evidence_config_single_dir());
        let path = staging.snapshot_path();
        staging.ensure_root().unwrap();
        snapshot.save(&path).unwrap();
        assert!(path.exists());

        let loaded = EvidenceSnapshot::load(&path).unwrap();
        assert_eq!(loaded.case_id(), snapshot.case_id());
        assert!(loaded.calls.is_collected());

        EvidenceSnapshot::delete(&path).unwrap();
        assert!(!path.exists());
        // Deleting again is not an error
        EvidenceSnapshot::delete(&path).unwrap();
    }

    #[test]
    fn test_usage_dump_lands_in_staging_layout() {
        let (_guard, staging) = staging();
        let device = fully_scripted_device();

        let snapshot = EvidenceSnapshot::collect(&device, &staging, &evidence_config_single_dir());
        assert!(snapshot.usage_stats.is_collected());
        assert!(staging.usage_dump_path().exists());

        if let CollectorOutcome::Collected(events) = &snapshot.usage_stats {
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].package, "com.whatsapp");
        }
    }
}
