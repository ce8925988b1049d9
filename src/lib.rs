//! # meterscan - Metering Device Discovery
//!
//! meterscan sweeps an IP range for endpoints that accept TCP connections,
//! matches each reachable endpoint against a registry of known meters and
//! records a log entry for every scan.
//!
//! ## Features
//!
//! - **Range Expansion**: IPv4 and IPv6 CIDR ranges crossed with port lists
//! - **Bounded Concurrency**: Per-scan and engine-wide caps on probes in flight
//! - **Meter Registry**: Vendor templates and addressable meter instances
//! - **Scan Logs**: JSON persistence with an in-memory fallback
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meterscan::discovery::{DiscoveryEngine, ScanRequest};
//! use meterscan::registry::MeterRegistry;
//! use meterscan::storage::ScanLogBook;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), meterscan::error::DiscoveryError> {
//! let registry = Arc::new(MeterRegistry::with_default_templates());
//! let engine = DiscoveryEngine::new(registry, ScanLogBook::in_memory());
//!
//! let request = ScanRequest::parse("192.168.1.0/24")?.with_concurrency(100);
//! for result in engine.scan(&request).await? {
//!     println!("{} {:?}", result.target(), result.vendor);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, address ranges, probe targets and IDs
//! - [`discovery`] - Probing and the discovery engine
//! - [`registry`] - Meter templates, instances and identity lookup
//! - [`storage`] - Scan log sinks
//! - [`config`] - Settings and XDG paths
//! - [`error`] - Error types per concern
//! - [`output`] - Output formatting
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod registry;
pub mod storage;
pub mod types;

pub use discovery::{DiscoveryEngine, DiscoveryResult, ScanLog, ScanRequest};
pub use error::{CliError, DiscoveryError};
pub use registry::{IdentityResolver, MeterInstance, MeterRegistry, MeterTemplate};
pub use storage::{ScanLogBook, ScanLogSink};
pub use types::{AddressRange, Port, PortList, ProbeTarget, ScanId};
