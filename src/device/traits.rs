//! Device abstraction for testability
//!
//! The pipeline only needs two operations from a connected device: run a
//! shell command and read back its text, and pull a remote file to a local
//! path. Both the real ADB backend and the scripted mock implement
//! [`Device`], so the parser/classifier/puller/aggregator stack is testable
//! without a phone attached.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A connected Android device
pub trait Device {
    /// The device serial this handle is bound to
    fn serial(&self) -> &str;

    /// Run a shell command on the device and return its text output
    fn shell(&self, command: &str) -> Result<String>;

    /// Pull a remote file to a local path, returning the bytes written
    fn pull(&self, remote: &str, local: &Path) -> Result<u64>;
}

/// One attached device as reported by `adb devices -l`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    /// Device serial number
    pub serial: String,
    /// Connection state (`device`, `unauthorized`, `offline`, ...)
    pub state: String,
    /// Model reported on the devices line, if any
    pub model: Option<String>,
}

impl DeviceEntry {
    /// Whether the device is in a state that allows shell/pull access
    pub fn is_connectable(&self) -> bool {
        self.state == "device"
    }
}

/// Identity properties read from `getprop` at connection time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProperties {
    pub model: String,
    pub manufacturer: String,
    pub android_version: String,
    pub device_name: String,
    pub serial: String,
    pub cpu_abi: String,
}

/// Property name/getprop key pairs collected at connection time
const IDENTITY_PROPS: &[(&str, &str)] = &[
    ("Model", "ro.product.model"),
    ("Manufacturer", "ro.product.manufacturer"),
    ("Android Version", "ro.build.version.release"),
    ("Device Name", "ro.product.device"),
    ("Serial Number", "ro.serialno"),
    ("CPU ABI", "ro.product.cpu.abi"),
];

impl DeviceProperties {
    /// Read identity properties from a connected device.
    ///
    /// A failing `getprop` leaves that field empty rather than failing the
    /// whole read; identity is display data, not a gate.
    pub fn read_from(device: &dyn Device) -> Self {
        let mut props = Self {
            serial: device.serial().to_string(),
            ..Default::default()
        };

        for (_, key) in IDENTITY_PROPS {
            let value = device
                .shell(&format!("getprop {}", key))
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            match *key {
                "ro.product.model" => props.model = value,
                "ro.product.manufacturer" => props.manufacturer = value,
                "ro.build.version.release" => props.android_version = value,
                "ro.product.device" => props.device_name = value,
                "ro.serialno" => {
                    if !value.is_empty() {
                        props.serial = value;
                    }
                }
                "ro.product.cpu.abi" => props.cpu_abi = value,
                _ => {}
            }
        }

        props
    }

    /// Display-keyed map of the identity fields, as shown to the user and
    /// embedded in the evidence snapshot
    pub fn as_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Model".to_string(), self.model.clone()),
            ("Manufacturer".to_string(), self.manufacturer.clone()),
            ("Android Version".to_string(), self.android_version.clone()),
            ("Device Name".to_string(), self.device_name.clone()),
            ("Serial Number".to_string(), self.serial.clone()),
            ("CPU ABI".to_string(), self.cpu_abi.clone()),
        ])
    }
}
