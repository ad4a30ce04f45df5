//! ADB-backed device implementation
//!
//! Drives the `adb` binary rather than speaking the server's wire protocol
//! directly. The server address defaults to the usual `127.0.0.1:5037` and
//! is forwarded with `-H`/`-P` when it differs, so a remote adb server works
//! too.
//!
//! Shell output is captured with dedicated reader threads and a polling
//! timeout; a chatty command (a full `ls -R /sdcard` easily exceeds the pipe
//! buffer) must not deadlock or hang the tool forever.

use crate::core::error::{Result, TriageError};
use crate::device::traits::{Device, DeviceEntry};
use log::{debug, warn};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Default adb server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default adb server port
pub const DEFAULT_PORT: u16 = 5037;

/// Captured output of one adb invocation
#[derive(Debug, Clone)]
struct AdbOutput {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

/// Handle to the adb binary and server address
#[derive(Debug, Clone)]
pub struct AdbClient {
    binary: PathBuf,
    host: String,
    port: u16,
    timeout: Duration,
}

impl AdbClient {
    /// Create a client for an adb server at the given address
    pub fn new(binary: PathBuf, host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            binary,
            host: host.to_string(),
            port,
            timeout,
        }
    }

    /// Base argument vector, including the server address when non-default
    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.host != DEFAULT_HOST {
            args.push("-H".to_string());
            args.push(self.host.clone());
        }
        if self.port != DEFAULT_PORT {
            args.push("-P".to_string());
            args.push(self.port.to_string());
        }
        args
    }

    /// Run adb with the given arguments, capturing output with a timeout
    fn run(&self, extra_args: &[String]) -> Result<AdbOutput> {
        let mut args = self.base_args();
        args.extend_from_slice(extra_args);
        debug!("adb {}", args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TriageError::Adb(format!("Failed to spawn adb: {}", e)))?;

        // Drain stdout/stderr on their own threads; otherwise a chatty
        // command blocks once the pipe buffer fills and we would misreport
        // it as a timeout.
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TriageError::Adb("Failed to capture adb stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TriageError::Adb("Failed to capture adb stderr".to_string()))?;

        let stdout_handle = std::thread::spawn(move || drain(stdout));
        let stderr_handle = std::thread::spawn(move || drain(stderr));

        let start = Instant::now();
        let exit_code = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status.code(),
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stdout_handle.join();
                        let _ = stderr_handle.join();
                        return Err(TriageError::Adb(format!(
                            "adb {} timed out after {:?}",
                            args.join(" "),
                            self.timeout
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Err(TriageError::Adb(format!("Failed to poll adb: {}", e)));
                }
            }
        };

        let stdout_bytes = stdout_handle.join().unwrap_or_default();
        let stderr_bytes = stderr_handle.join().unwrap_or_default();

        Ok(AdbOutput {
            stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
            stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
            exit_code,
        })
    }

    /// Enumerate attached devices via `adb devices -l`
    pub fn devices(&self) -> Result<Vec<DeviceEntry>> {
        let output = self.run(&["devices".to_string(), "-l".to_string()])?;
        if output.exit_code != Some(0) {
            return Err(TriageError::Adb(format!(
                "adb devices failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(parse_devices_output(&output.stdout))
    }

    /// Open a handle to a device by serial.
    ///
    /// Re-enumerates first so a device that vanished since the last listing
    /// is reported as such rather than failing on the first shell command.
    pub fn open(&self, serial: &str) -> Result<AdbDevice> {
        let live = self.devices()?;
        match live.iter().find(|d| d.serial == serial) {
            Some(entry) if entry.is_connectable() => Ok(AdbDevice {
                client: self.clone(),
                serial: serial.to_string(),
            }),
            Some(entry) => Err(TriageError::Adb(format!(
                "Device '{}' is in state '{}'",
                serial, entry.state
            ))),
            None => Err(TriageError::DeviceVanished(serial.to_string())),
        }
    }
}

/// A device bound to one serial, implementing the pipeline's [`Device`] trait
#[derive(Debug, Clone)]
pub struct AdbDevice {
    client: AdbClient,
    serial: String,
}

impl Device for AdbDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn shell(&self, command: &str) -> Result<String> {
        let args = vec![
            "-s".to_string(),
            self.serial.clone(),
            "shell".to_string(),
            command.to_string(),
        ];
        let output = self.client.run(&args)?;

        if is_device_gone(&output.stderr) {
            return Err(TriageError::DeviceVanished(self.serial.clone()));
        }
        if output.exit_code != Some(0) && output.stdout.is_empty() {
            return Err(TriageError::Shell {
                command: command.to_string(),
                message: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    fn pull(&self, remote: &str, local: &Path) -> Result<u64> {
        let args = vec![
            "-s".to_string(),
            self.serial.clone(),
            "pull".to_string(),
            remote.to_string(),
            local.display().to_string(),
        ];
        let output = self.client.run(&args)?;

        if is_device_gone(&output.stderr) {
            return Err(TriageError::DeviceVanished(self.serial.clone()));
        }
        if output.exit_code != Some(0) {
            return Err(TriageError::Transfer {
                filename: remote.to_string(),
                message: output.stderr.trim().to_string(),
            });
        }

        match std::fs::metadata(local) {
            Ok(meta) => Ok(meta.len()),
            Err(e) => {
                warn!("Pulled '{}' but could not stat it: {}", remote, e);
                Ok(0)
            }
        }
    }
}

/// Read a pipe to EOF
fn drain(mut reader: impl Read) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(count) => buffer.extend_from_slice(&chunk[..count]),
            Err(_) => break,
        }
    }
    buffer
}

/// Whether adb stderr indicates the bound device went away
fn is_device_gone(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("not found") || lower.contains("device offline")
}

/// Parse `adb devices -l` output into device entries
pub fn parse_devices_output(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with('*'))
        .filter(|line| !line.to_lowercase().contains("list of devices"))
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                return None;
            }
            let model = tokens
                .iter()
                .skip(2)
                .find_map(|t| t.strip_prefix("model:"))
                .map(|m| m.to_string());
            Some(DeviceEntry {
                serial: tokens[0].to_string(),
                state: tokens[1].to_string(),
                model,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices_output() {
        let output = "List of devices attached\n\
                      0123456789ABCDEF device product:panther model:Pixel_7 device:panther transport_id:1\n\
                      emulator-5554 unauthorized transport_id:2\n";
        let devices = parse_devices_output(output);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].serial, "0123456789ABCDEF");
        assert_eq!(devices[0].state, "device");
        assert_eq!(devices[0].model.as_deref(), Some("Pixel_7"));
        assert!(devices[0].is_connectable());
        assert_eq!(devices[1].state, "unauthorized");
        assert!(!devices[1].is_connectable());
    }

    #[test]
    fn test_parse_devices_output_empty() {
        assert!(parse_devices_output("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn test_parse_devices_skips_daemon_banner() {
        let output = "* daemon not running; starting now at tcp:5037\n\
                      * daemon started successfully\n\
                      ABC device\n";
        let devices = parse_devices_output(output);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].serial, "ABC");
    }

    #[test]
    fn test_is_device_gone() {
        assert!(is_device_gone("adb: device '0123' not found"));
        assert!(is_device_gone("error: device offline"));
        assert!(!is_device_gone("adb: error: remote object does not exist"));
    }

    #[test]
    fn test_base_args_default_address_is_empty() {
        let client = AdbClient::new(
            PathBuf::from("adb"),
            DEFAULT_HOST,
            DEFAULT_PORT,
            Duration::from_secs(5),
        );
        assert!(client.base_args().is_empty());
    }

    #[test]
    fn test_base_args_custom_address() {
        let client = AdbClient::new(
            PathBuf::from("adb"),
            "10.0.0.2",
            5038,
            Duration::from_secs(5),
        );
        assert_eq!(
            client.base_args(),
            vec!["-H", "10.0.0.2", "-P", "5038"]
        );
    }
}
