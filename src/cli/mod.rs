//! CLI subcommand definitions and handlers.
//!
//! - `meterscan scan <range>` - Sweep a range for reachable meters
//! - `meterscan logs` - View scan history
//! - `meterscan registry ...` - Manage meter templates and instances

mod logs;
mod registry;
mod scan;

pub use logs::LogsCommand;
pub use registry::{RegistryAction, RegistryCommand};
pub use scan::ScanCommand;

use crate::config::{AppSettings, Paths};
use crate::error::CliResult;
use crate::registry::MeterRegistry;
use crate::storage::ScanLogBook;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// meterscan - discovery of network-reachable metering devices.
///
/// Sweeps an address range for endpoints accepting TCP connections,
/// matches them against the meter registry and keeps a log of every scan.
#[derive(Parser, Debug)]
#[command(name = "meterscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Discover metering devices on the network", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH", env = "METERSCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an address range for meters
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// View scan history
    #[command(alias = "l")]
    Logs(LogsCommand),

    /// Manage the meter registry
    #[command(alias = "r")]
    Registry(RegistryCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Settings and resolved locations shared by every subcommand.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: AppSettings,
    pub log_dir: PathBuf,
    pub registry_file: PathBuf,
}

impl AppContext {
    /// Load settings from `config` if given, else from the XDG settings file.
    pub fn load(config: Option<&Path>) -> CliResult<Self> {
        let paths = Paths::resolve().unwrap_or_else(|e| {
            warn!(error = %e, "No user directories, using ./.meterscan");
            Paths::rooted_at(".meterscan")
        });

        let settings = match config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load(&paths)?,
        };

        let log_dir = settings.log_dir(&paths);
        let registry_file = settings.registry_file(&paths);
        debug!(log_dir = %log_dir.display(), registry = %registry_file.display(), "Configuration loaded");

        Ok(Self {
            settings,
            log_dir,
            registry_file,
        })
    }

    /// Output format from the flag, else from settings.
    pub fn output_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or_else(|| {
            self.settings
                .default_output_format
                .parse()
                .unwrap_or_default()
        })
    }

    /// Load the registry file, seeding sample instances if configured.
    pub fn open_registry(&self) -> CliResult<MeterRegistry> {
        let registry = MeterRegistry::load(&self.registry_file)?;
        if self.settings.seed_sample_data {
            let seeded = registry.seed_sample_instances()?;
            if seeded > 0 {
                debug!(seeded, "Seeded sample meter instances");
            }
        }
        Ok(registry)
    }

    pub fn save_registry(&self, registry: &MeterRegistry) -> CliResult<()> {
        registry.save(&self.registry_file)?;
        Ok(())
    }

    pub fn open_logs(&self) -> ScanLogBook {
        ScanLogBook::open(&self.log_dir)
    }
}
