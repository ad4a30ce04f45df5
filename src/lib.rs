//! DroidForen: Android forensic triage over ADB
//!
//! Connects to an Android device through the `adb` binary, scans its shared
//! storage with a recursive listing, classifies files into fixed categories
//! by extension, pulls selected categories into a local staging mirror,
//! aggregates call log / SMS / usage-stats evidence into a persisted JSON
//! snapshot, and generates a sectioned Markdown triage report from it.
//!
//! # Architecture
//!
//! - [`core`] - Configuration, errors, the listing parser and classifier,
//!   the pull pipeline and staging layout, evidence aggregation, and the
//!   session context tying one device to one staging area
//! - [`device`] - The [`device::Device`] trait, the adb-backed
//!   implementation, and a scripted mock for tests and offline runs
//! - [`report`] - Report generation against an OpenAI-compatible
//!   completions endpoint
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example
//!
//! ```rust,no_run
//! use droidforen::core::category::Category;
//! use droidforen::core::config::Config;
//! use droidforen::core::session::Session;
//! use droidforen::device::AdbClient;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let client = AdbClient::new(
//!         config.adb.binary.clone(),
//!         &config.adb.host,
//!         config.adb.port,
//!         Duration::from_secs(config.adb.command_timeout_secs),
//!     );
//!
//!     let devices = client.devices()?;
//!     if let Some(entry) = devices.iter().find(|d| d.is_connectable()) {
//!         let device = client.open(&entry.serial)?;
//!         let shutdown_flag = Arc::new(AtomicBool::new(false));
//!         let session = Session::new(&device, &config, shutdown_flag);
//!
//!         let outcome = session.extract(Category::Photos)?;
//!         println!("staged {} files", outcome.staged.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod device;
pub mod report;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
