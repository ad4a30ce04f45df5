//! Configuration module for the triage tool
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\droidforen\config.toml
//! - Linux/macOS: ~/.config/droidforen/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for config directory
const APP_NAME: &str = "droidforen";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors specific to configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine configuration directory")]
    ConfigDirNotFound,

    #[error("Failed to read config file '{0}': {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file '{0}': {1}")]
    ParseError(PathBuf, String),

    #[error("Failed to write config file '{0}': {1}")]
    WriteError(PathBuf, String),
}

/// Get the standard configuration directory for the application
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    Ok(config_dir)
}

/// Initialize the configuration file if it doesn't exist.
///
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        let default_config = Config::generate_default_config();
        fs::write(&config_path, default_config)
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ADB transport settings
    pub adb: AdbConfig,

    /// Local staging settings
    pub staging: StagingConfig,

    /// Extraction settings
    pub extraction: ExtractionConfig,

    /// Evidence collection settings
    pub evidence: EvidenceConfig,

    /// Report generation settings
    pub report: ReportConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// ADB transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// Path to the adb binary
    pub binary: PathBuf,

    /// ADB server host
    pub host: String,

    /// ADB server port
    pub port: u16,

    /// Specific device serial to use (optional)
    pub serial: Option<String>,

    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("adb"),
            host: "127.0.0.1".to_string(),
            port: 5037,
            serial: None,
            command_timeout_secs: 120,
        }
    }
}

/// Local staging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Root directory for staged device content
    pub root: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./TempData"),
        }
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Device root for the recursive listing scan
    pub listing_root: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            listing_root: "/sdcard".to_string(),
        }
    }
}

/// Evidence collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Maximum number of entries recorded by the file-summary collector
    pub file_summary_cap: usize,

    /// Well-known device directories scanned by the file summary
    pub summary_dirs: Vec<String>,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            file_summary_cap: 200,
            summary_dirs: vec![
                "/sdcard/DCIM".to_string(),
                "/sdcard/Download".to_string(),
                "/sdcard/Pictures".to_string(),
                "/sdcard/Movies".to_string(),
                "/sdcard/Music".to_string(),
                "/sdcard/Documents".to_string(),
                "/sdcard/WhatsApp/Media".to_string(),
            ],
        }
    }
}

/// Report generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,

    /// Model name passed to the endpoint
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Directory reports are written into
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "DROIDFOREN_API_KEY".to_string(),
            output_dir: PathBuf::from("./reports"),
            request_timeout_secs: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Whether to also log to a file
    pub log_to_file: bool,

    /// Log file path (when log_to_file is enabled)
    pub log_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("droidforen.log"),
        }
    }
}

impl Config {
    /// Load configuration from a specific path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from the standard location, if present
    pub fn load_default() -> Result<Self, ConfigError> {
        match get_config_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a specific path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e.to_string()))?;
        }

        fs::write(path, content)
            .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e.to_string()))
    }

    /// Generate the default config file content with explanatory comments
    pub fn generate_default_config() -> String {
        let defaults = Config::default();
        let body = toml::to_string_pretty(&defaults).unwrap_or_default();
        format!(
            "# DroidForen configuration\n\
             # Values here can be overridden per-invocation with CLI flags.\n\n{}",
            body
        )
    }
}
