//! Discovery module - finds reachable meters in an address range.
//!
//! Targets are expanded from a CIDR range and a port list, probed with
//! bounded concurrency over TCP, matched against the device registry and
//! summarized in a scan log.

pub mod engine;
pub mod probe;
pub mod request;
pub mod result;

pub use engine::{DiscoveryEngine, DEFAULT_INFLIGHT_LIMIT};
pub use probe::{ProbeFailure, ProbeStatus, Prober, TcpProber};
pub use request::{ScanRequest, DEFAULT_CONCURRENCY, DEFAULT_RETRIES, DEFAULT_TIMEOUT};
pub use result::{DiscoveryResult, ScanLog, ScanReport};
