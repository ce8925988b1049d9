//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data.

use crate::discovery::{DEFAULT_CONCURRENCY, DEFAULT_INFLIGHT_LIMIT, DEFAULT_RETRIES, DEFAULT_TIMEOUT};
use crate::error::{ConfigError, ConfigResult};
use crate::types::PortList;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/meterscan)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/meterscan)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("org", "meterscan", "meterscan")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Paths rooted at an arbitrary directory.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the scan log directory.
    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }

    /// Get the path to the registry file.
    pub fn registry_file(&self) -> PathBuf {
        self.data_dir.join("registry.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Ports probed when a scan names none.
    pub default_ports: PortList,
    /// Default per-scan concurrency.
    pub default_concurrency: usize,
    /// Default connect timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default retry count.
    pub default_retries: u32,
    /// Cap on probes in flight across all scans of one engine.
    pub inflight_limit: usize,
    /// Default output format.
    pub default_output_format: String,
    /// Create loopback sample instances when the registry is empty.
    pub seed_sample_data: bool,
    /// Scan log directory override.
    pub log_dir: Option<PathBuf>,
    /// Registry file override.
    pub registry_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: PortList::default(),
            default_concurrency: DEFAULT_CONCURRENCY,
            default_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            default_retries: DEFAULT_RETRIES,
            inflight_limit: DEFAULT_INFLIGHT_LIMIT,
            default_output_format: "plain".to_string(),
            seed_sample_data: false,
            log_dir: None,
            registry_file: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is no file.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        let file = paths.settings_file();
        fs::create_dir_all(&paths.config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Scan log directory, honoring the override.
    pub fn log_dir(&self, paths: &Paths) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| paths.scans_dir())
    }

    /// Registry file, honoring the override.
    pub fn registry_file(&self, paths: &Paths) -> PathBuf {
        self.registry_file
            .clone()
            .unwrap_or_else(|| paths.registry_file())
    }
}
