//! Triage session context
//!
//! A session ties together the one connected device, the staging layout,
//! and the shutdown flag, and is passed explicitly to operations instead of
//! living as ambient state. Exactly one session (and one operation) is
//! active at a time by construction of the CLI.

use crate::core::category::Category;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::evidence::EvidenceSnapshot;
use crate::core::puller::{pull_category, PullOutcome};
use crate::core::staging::StagingArea;
use crate::device::traits::{Device, DeviceProperties};
use log::info;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Context for one connected-device session
pub struct Session<'a> {
    device: &'a dyn Device,
    config: &'a Config,
    staging: StagingArea,
    shutdown_flag: Arc<AtomicBool>,
}

impl<'a> Session<'a> {
    /// Create a session for a connected device
    pub fn new(device: &'a dyn Device, config: &'a Config, shutdown_flag: Arc<AtomicBool>) -> Self {
        Self {
            device,
            config,
            staging: StagingArea::new(config.staging.root.clone()),
            shutdown_flag,
        }
    }

    /// The connected device
    pub fn device(&self) -> &dyn Device {
        self.device
    }

    /// The session's staging layout
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Read the device identity properties
    pub fn device_properties(&self) -> DeviceProperties {
        DeviceProperties::read_from(self.device)
    }

    /// Run one extraction pass for a category
    pub fn extract(&self, category: Category) -> Result<PullOutcome> {
        pull_category(
            self.device,
            &self.staging,
            &self.config.extraction.listing_root,
            category,
            &self.shutdown_flag,
        )
    }

    /// Collect the evidence snapshot and persist it, overwriting any prior
    /// one. Returns the snapshot for immediate display or reporting.
    pub fn collect_evidence(&self) -> Result<EvidenceSnapshot> {
        self.staging.ensure_root()?;
        let snapshot = EvidenceSnapshot::collect(self.device, &self.staging, &self.config.evidence);
        snapshot.save(&self.staging.snapshot_path())?;
        info!("Snapshot written to {}", self.staging.snapshot_path().display());
        Ok(snapshot)
    }

    /// Disconnect-time cleanup: wipe staging and the persisted snapshot
    pub fn cleanup(&self) -> Result<()> {
        EvidenceSnapshot::delete(&self.staging.snapshot_path())?;
        self.staging.cleanup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    fn test_config(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.staging.root = root.to_path_buf();
        config
    }

    #[test]
    fn test_session_extract_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("stage"));

        let mut device = MockDevice::new("S1");
        device.add_file("/sdcard/DCIM/a.jpg", b"a");
        let listing = device.listing_from_files();
        device.script_shell("ls -R /sdcard", &listing);

        let session = Session::new(&device, &config, Arc::new(AtomicBool::new(false)));
        let outcome = session.extract(Category::Photos).unwrap();
        assert_eq!(outcome.staged.len(), 1);
        assert_eq!(session.staging().staged_entries(Category::Photos).len(), 1);

        session.cleanup().unwrap();
        assert!(session.staging().staged_entries(Category::Photos).is_empty());
    }

    #[test]
    fn test_session_collect_persists_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("stage"));

        // Unscripted device: collectors degrade but the snapshot persists.
        let device = MockDevice::new("S2");
        let session = Session::new(&device, &config, Arc::new(AtomicBool::new(false)));

        let snapshot = session.collect_evidence().unwrap();
        assert!(!snapshot.calls.is_collected());
        assert!(session.staging().snapshot_path().exists());

        session.cleanup().unwrap();
        assert!(!session.staging().snapshot_path().exists());
    }
}
