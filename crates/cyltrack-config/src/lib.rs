//! Shared configuration for the cyltrack CLI and TUI.
//!
//! A TOML file layered under `CYLTRACK_*` environment variables, plus the
//! helpers both binaries use to turn it into a data directory, a QR link
//! builder, and a line scanner. The CLI adds `GlobalOpts`-aware overrides
//! on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cyltrack_core::{LineScanSource, QrLink, ScanDevice};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CYLTRACK_CONFIG";

pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];
pub const COLOR_MODES: &[&str] = &["auto", "always", "never"];

/// Keys accepted by [`Config::set`].
pub const SETTABLE_KEYS: &[&str] = &[
    "storage.data_dir",
    "defaults.output",
    "defaults.color",
    "scanner.device",
    "scanner.fallback_device",
    "qr.base_url",
    "qr.size",
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: Storage,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub scanner: Scanner,

    #[serde(default)]
    pub qr: Qr,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Storage {
    /// Directory holding `cylinderTypes.json` and `cylinders.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Scanner {
    /// Dedicated reader: serial port, FIFO, or file (`-` for stdin).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Used when `device` is unset or cannot be opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_device: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Qr {
    #[serde(default = "default_qr_base")]
    pub base_url: String,

    #[serde(default = "default_qr_size")]
    pub size: u32,
}

impl Default for Qr {
    fn default() -> Self {
        Self {
            base_url: default_qr_base(),
            size: default_qr_size(),
        }
    }
}

fn default_qr_base() -> String {
    cyltrack_core::qr::DEFAULT_QR_BASE.into()
}
fn default_qr_size() -> u32 {
    cyltrack_core::qr::DEFAULT_QR_SIZE
}

impl Config {
    /// Check values that serde accepts but the binaries cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !OUTPUT_FORMATS.contains(&self.defaults.output.as_str()) {
            return Err(invalid(
                "defaults.output",
                format!(
                    "expected one of {}, got '{}'",
                    OUTPUT_FORMATS.join(", "),
                    self.defaults.output
                ),
            ));
        }
        if !COLOR_MODES.contains(&self.defaults.color.as_str()) {
            return Err(invalid(
                "defaults.color",
                format!(
                    "expected one of {}, got '{}'",
                    COLOR_MODES.join(", "),
                    self.defaults.color
                ),
            ));
        }
        self.qr_link().map(|_| ())
    }

    /// QR image link builder from the `[qr]` table.
    pub fn qr_link(&self) -> Result<QrLink, ConfigError> {
        if self.qr.size == 0 {
            return Err(invalid("qr.size", "must be greater than zero"));
        }
        QrLink::new(&self.qr.base_url, self.qr.size)
            .map_err(|e| invalid("qr.base_url", format!("{e}: {}", self.qr.base_url)))
    }

    /// Line scanner over the configured devices.
    ///
    /// `device_override` replaces `scanner.device`; `default_fallback` is
    /// used when `scanner.fallback_device` is unset.
    pub fn line_scanner(
        &self,
        device_override: Option<&str>,
        default_fallback: Option<ScanDevice>,
    ) -> LineScanSource {
        let preferred = device_override
            .or(self.scanner.device.as_deref())
            .map(ScanDevice::parse);
        let fallback = self
            .scanner
            .fallback_device
            .as_deref()
            .map(ScanDevice::parse)
            .or(default_fallback);
        LineScanSource::new(preferred, fallback)
    }

    /// Set one dotted key from a string, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        match key {
            "storage.data_dir" => next.storage.data_dir = Some(PathBuf::from(value)),
            "defaults.output" => next.defaults.output = value.into(),
            "defaults.color" => next.defaults.color = value.into(),
            "scanner.device" => next.scanner.device = Some(value.into()),
            "scanner.fallback_device" => next.scanner.fallback_device = Some(value.into()),
            "qr.base_url" => next.qr.base_url = value.into(),
            "qr.size" => {
                next.qr.size = value
                    .parse()
                    .map_err(|_| invalid("qr.size", format!("not a number: '{value}'")))?;
            }
            other => return Err(ConfigError::UnknownKey(other.into())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "cyltrack", "cyltrack")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path: `$CYLTRACK_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || home_fallback(&[".config", "cyltrack", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory for inventory files.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "cyltrack"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Data directory precedence: explicit override, then `storage.data_dir`,
/// then the platform default.
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .or_else(|| cfg.storage.data_dir.clone())
        .unwrap_or_else(default_data_dir)
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, still layering the environment on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CYLTRACK_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
