//! Scan request parameters.

use crate::error::{DiscoveryError, EngineResult};
use crate::types::{AddressRange, PortList};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Default number of probes in flight per scan.
pub const DEFAULT_CONCURRENCY: usize = 200;
/// Default per-attempt connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
/// Default retry count (one attempt).
pub const DEFAULT_RETRIES: u32 = 1;

/// One discovery sweep: a range crossed with a port list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub range: AddressRange,
    pub ports: PortList,
    /// Maximum probes in flight for this scan.
    pub max_concurrency: usize,
    /// Bound on each connection attempt.
    pub timeout: Duration,
    /// Attempts per target; 0 is treated as 1.
    pub retries: u32,
}

impl ScanRequest {
    /// Create a request with default ports, concurrency, timeout and retries.
    pub fn new(range: AddressRange) -> Self {
        Self {
            range,
            ports: PortList::default(),
            max_concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Parse the address range and create a request with defaults.
    pub fn parse(range: &str) -> EngineResult<Self> {
        Ok(Self::new(AddressRange::parse(range)?))
    }

    pub fn with_ports(mut self, ports: PortList) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout from fractional seconds, rejecting negative or non-finite values.
    pub fn with_timeout_secs(self, secs: f64) -> EngineResult<Self> {
        let timeout = Duration::try_from_secs_f64(secs).map_err(|_| {
            DiscoveryError::InvalidRequest(format!("invalid timeout: {} seconds", secs))
        })?;
        Ok(self.with_timeout(timeout))
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Connection attempts made per target.
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Number of targets the scan will probe.
    pub fn target_count(&self) -> usize {
        self.range.target_count(&self.ports)
    }

    /// Upper bound on scan duration when every probe times out.
    pub fn worst_case_duration(&self) -> Duration {
        let targets = self.target_count();
        if targets == 0 || self.max_concurrency == 0 {
            return Duration::ZERO;
        }
        let waves = targets.div_ceil(self.max_concurrency) as u128;
        let nanos = self
            .timeout
            .as_nanos()
            .checked_mul(u128::from(self.attempts()))
            .and_then(|per_target| per_target.checked_mul(waves));

        match nanos.map(|n| (u64::try_from(n / NANOS_PER_SEC), n % NANOS_PER_SEC)) {
            Some((Ok(secs), sub)) => Duration::new(secs, sub as u32),
            _ => Duration::MAX,
        }
    }

    /// Reject parameters the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_concurrency == 0 {
            return Err(DiscoveryError::InvalidRequest(
                "max concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(DiscoveryError::InvalidRequest(
                "probe timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
