//! Discovery results and scan log entries.

use crate::registry::{AuthenticationMode, MeterInstance, SecuritySuite};
use crate::types::{AddressRange, MeterId, Port, PortList, ProbeTarget, ScanId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One reachable endpoint found by a scan.
///
/// The optional fields are set only when the endpoint matched a registered
/// meter; all of them unset means "reachable but unidentified".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub meter_id: MeterId,
    pub ip_address: IpAddr,
    pub port: Port,
    pub discovered_at: DateTime<Utc>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub authentication: Option<AuthenticationMode>,
    pub security_suite: Option<SecuritySuite>,
}

impl DiscoveryResult {
    /// A result for a registered meter, reusing its identifier.
    pub fn identified(instance: &MeterInstance, discovered_at: DateTime<Utc>) -> Self {
        Self {
            meter_id: instance.meter_id,
            ip_address: instance.ip_address,
            port: instance.port,
            discovered_at,
            vendor: Some(instance.vendor.clone()),
            model: Some(instance.model.clone()),
            authentication: Some(instance.authentication),
            security_suite: Some(instance.security_suite),
        }
    }

    /// A result for an endpoint no registered meter is bound to.
    pub fn unidentified(target: ProbeTarget, discovered_at: DateTime<Utc>) -> Self {
        Self {
            meter_id: MeterId::new(),
            ip_address: target.ip,
            port: target.port,
            discovered_at,
            vendor: None,
            model: None,
            authentication: None,
            security_suite: None,
        }
    }

    pub fn is_identified(&self) -> bool {
        self.vendor.is_some()
    }

    pub fn target(&self) -> ProbeTarget {
        ProbeTarget::new(self.ip_address, self.port)
    }
}

/// Summary of one completed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLog {
    pub scan_id: ScanId,
    pub ip_range: AddressRange,
    pub ports: PortList,
    pub total_targets: usize,
    pub discovered: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Set when the scan was stopped before every target was probed.
    #[serde(default)]
    pub cancelled: bool,
}

impl ScanLog {
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }

    /// One-line description for listings.
    pub fn summary(&self) -> String {
        format!(
            "{} ports {} - {}/{} reachable [{:.2}s]{}",
            self.ip_range,
            self.ports,
            self.discovered,
            self.total_targets,
            self.duration().num_milliseconds() as f64 / 1000.0,
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}

/// What a scan hands back: its log entry and the reachable endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub log: ScanLog,
    pub results: Vec<DiscoveryResult>,
}

impl ScanReport {
    /// Order results by address, then port.
    pub fn sort(&mut self) {
        self.results.sort_by_key(DiscoveryResult::target);
    }

    pub fn identified_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_identified()).count()
    }
}
