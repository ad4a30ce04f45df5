//! Scripted device implementation for testing without a phone
//!
//! The mock answers shell commands from a canned script and serves pulls
//! from an in-memory file map. Failures are deterministic: specific remote
//! paths can be marked as failing, and unscripted shell commands error.
//! This is enough to exercise every pipeline stage, including the
//! skip-on-error pull semantics and collector degradation.

use crate::core::error::{Result, TriageError};
use crate::device::traits::Device;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Interior counters, behind a mutex so the `&self` trait methods can
/// record activity
#[derive(Debug, Default)]
struct MockCounters {
    shell_calls: usize,
    pull_calls: usize,
}

/// A scripted in-memory device
#[derive(Debug)]
pub struct MockDevice {
    serial: String,
    /// Canned shell responses keyed by exact command
    shell_script: HashMap<String, String>,
    /// Remote path -> file content served by pull
    files: HashMap<String, Vec<u8>>,
    /// Remote paths whose pulls fail
    failing_pulls: Vec<String>,
    counters: Mutex<MockCounters>,
}

impl MockDevice {
    /// Create an empty mock with the given serial
    pub fn new(serial: &str) -> Self {
        Self {
            serial: serial.to_string(),
            shell_script: HashMap::new(),
            files: HashMap::new(),
            failing_pulls: Vec::new(),
            counters: Mutex::new(MockCounters::default()),
        }
    }

    /// Script the response for an exact shell command
    pub fn script_shell(&mut self, command: &str, output: &str) {
        self.shell_script
            .insert(command.to_string(), output.to_string());
    }

    /// Add a pullable file
    pub fn add_file(&mut self, remote: &str, content: &[u8]) {
        self.files.insert(remote.to_string(), content.to_vec());
    }

    /// Mark a remote path as failing on pull
    pub fn fail_pull(&mut self, remote: &str) {
        self.failing_pulls.push(remote.to_string());
    }

    /// Remove a pullable file (simulates the device set shrinking)
    pub fn remove_file(&mut self, remote: &str) {
        self.files.remove(remote);
    }

    /// Number of shell commands executed so far
    pub fn shell_calls(&self) -> usize {
        self.counters.lock().map(|c| c.shell_calls).unwrap_or(0)
    }

    /// Number of pulls attempted so far
    pub fn pull_calls(&self) -> usize {
        self.counters.lock().map(|c| c.pull_calls).unwrap_or(0)
    }

    /// Build a standard `ls -R` style listing from the current file map,
    /// grouped by parent directory. Convenient for scripting the scan.
    pub fn listing_from_files(&self) -> String {
        let mut by_dir: std::collections::BTreeMap<String, Vec<String>> =
            std::collections::BTreeMap::new();
        for remote in self.files.keys() {
            if let Some(pos) = remote.rfind('/') {
                let (dir, name) = remote.split_at(pos);
                by_dir
                    .entry(dir.to_string())
                    .or_default()
                    .push(name.trim_start_matches('/').to_string());
            }
        }

        let mut out = String::new();
        for (dir, mut names) in by_dir {
            names.sort();
            out.push_str(&dir);
            out.push_str(":\n");
            out.push_str(&names.join("\n"));
            out.push_str("\n\n");
        }
        out
    }
}

impl Device for MockDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn shell(&self, command: &str) -> Result<String> {
        if let Ok(mut counters) = self.counters.lock() {
            counters.shell_calls += 1;
        }

        self.shell_script
            .get(command)
            .cloned()
            .ok_or_else(|| TriageError::Shell {
                command: command.to_string(),
                message: "unscripted command".to_string(),
            })
    }

    fn pull(&self, remote: &str, local: &Path) -> Result<u64> {
        if let Ok(mut counters) = self.counters.lock() {
            counters.pull_calls += 1;
        }

        if self.failing_pulls.iter().any(|p| p == remote) {
            return Err(TriageError::Transfer {
                filename: remote.to_string(),
                message: "simulated transfer failure".to_string(),
            });
        }

        let content = self.files.get(remote).ok_or_else(|| TriageError::Transfer {
            filename: remote.to_string(),
            message: "remote object does not exist".to_string(),
        })?;

        std::fs::write(local, content).map_err(|e| TriageError::Transfer {
            filename: remote.to_string(),
            message: e.to_string(),
        })?;

        Ok(content.len() as u64)
    }
}
