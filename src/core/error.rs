//! Error types for the triage tool
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Main error type for the triage tool
#[derive(Error, Debug)]
pub enum TriageError {
    /// The adb binary could not be run or returned garbage
    #[error("ADB error: {0}")]
    Adb(String),

    /// No devices were reported by the adb server
    #[error("No devices found. Make sure the device is connected and USB debugging is enabled.")]
    NoDevicesFound,

    /// The selected device disappeared between enumeration and use
    #[error("Device '{0}' is no longer connected.")]
    DeviceVanished(String),

    /// A shell command failed on the device
    #[error("Shell command '{command}' failed: {message}")]
    Shell { command: String, message: String },

    /// File transfer from the device failed
    #[error("Transfer failed for '{filename}': {message}")]
    Transfer { filename: String, message: String },

    /// General I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Device output could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Snapshot or staging persistence failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Report generation failed
    #[error("Report error: {0}")]
    Report(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TriageError>;

impl From<std::io::Error> for TriageError {
    fn from(err: std::io::Error) -> Self {
        TriageError::Io(err.to_string())
    }
}
