//! Device interaction layer
//!
//! # Submodules
//!
//! - `traits` - The [`Device`] abstraction and identity properties
//! - `adb` - Real backend driving the adb binary
//! - `mock` - Scripted in-memory device for tests and simulation

pub mod adb;
pub mod mock;
pub mod traits;

pub use adb::{AdbClient, AdbDevice};
pub use mock::MockDevice;
pub use traits::{Device, DeviceEntry, DeviceProperties};
