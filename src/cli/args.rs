//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use crate::core::category::Category;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mobile forensic triage tool for Android devices over ADB
#[derive(Parser, Debug)]
#[command(name = "droidforen")]
#[command(version)]
#[command(about = "Triage an Android device over ADB: extract files by category, collect evidence, generate a report", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Device serial to use (overrides config; prompts if several attached)
    #[arg(short, long, global = true)]
    pub serial: Option<String>,

    /// Staging directory for pulled content (overrides config)
    #[arg(long, global = true)]
    pub staging: Option<PathBuf>,

    /// Path to the adb binary (overrides config)
    #[arg(long, global = true)]
    pub adb_path: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List attached devices
    Devices,

    /// Extract device files of a category into the staging mirror
    Extract {
        /// Category to extract
        #[arg(value_enum)]
        category: Option<Category>,

        /// Extract every category in turn
        #[arg(long, conflicts_with = "category")]
        all: bool,
    },

    /// Dump structured records from a content provider
    Records {
        /// Which provider to query
        #[arg(value_enum)]
        source: RecordSource,

        /// Print raw provider output instead of parsed rows
        #[arg(long)]
        raw: bool,
    },

    /// Collect the evidence snapshot (device identity, file summary,
    /// call log, SMS, usage stats) and persist it
    Collect,

    /// Generate the triage report from the persisted snapshot
    Report {
        /// Output directory for the report (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the completion endpoint and emit section placeholders
        #[arg(long)]
        offline: bool,
    },

    /// Print the parsed recursive listing of the device root (debug aid)
    Scan {
        /// Only print paths matching a category
        #[arg(value_enum)]
        category: Option<Category>,
    },

    /// Delete all staged content and the persisted snapshot
    Cleanup,

    /// Show the configuration file path, creating a default file if missing
    Config {
        /// Reset config to defaults (overwrites the existing file)
        #[arg(long)]
        reset: bool,
    },

    /// Show the effective configuration
    ShowConfig,

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run an extraction pass against a built-in mock device
    ///
    /// Exercises the whole scan/classify/pull pipeline without a phone
    /// attached, staging into the configured staging directory.
    SimulateExtract {
        /// Category to extract from the mock device
        #[arg(value_enum, default_value = "photos")]
        category: Category,
    },
}

/// Content providers exposed by the records command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordSource {
    Calls,
    Sms,
    Contacts,
}

impl RecordSource {
    /// The content provider URI queried for this source
    pub fn uri(&self) -> &'static str {
        match self {
            RecordSource::Calls => "content://call_log/calls",
            RecordSource::Sms => "content://sms/",
            RecordSource::Contacts => "content://contacts/phones/",
        }
    }
}
