//! End-to-end discovery over real sockets and the public API.

use async_trait::async_trait;
use meterscan::discovery::{DiscoveryEngine, ProbeFailure, ProbeStatus, Prober, ScanRequest};
use meterscan::error::{StorageError, StorageResult};
use meterscan::registry::MeterRegistry;
use meterscan::storage::{ScanLogBook, ScanLogSink};
use meterscan::types::{AddressRange, Port, PortList, ProbeTarget};
use meterscan::ScanLog;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

async fn open_port() -> (TcpListener, Port) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
    (listener, port)
}

async fn closed_port() -> Port {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

fn engine(registry: MeterRegistry) -> DiscoveryEngine {
    DiscoveryEngine::new(Arc::new(registry), ScanLogBook::in_memory())
}

struct DownSink;

impl ScanLogSink for DownSink {
    fn name(&self) -> &'static str {
        "down"
    }

    fn append(&self, _: &ScanLog) -> StorageResult<()> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }

    fn list(&self) -> StorageResult<Vec<ScanLog>> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }
}

/// Reachable iff the last octet is even.
struct EvenHostProber;

#[async_trait]
impl Prober for EvenHostProber {
    async fn probe(&self, target: ProbeTarget) -> ProbeStatus {
        tokio::time::sleep(Duration::from_millis(1)).await;
        let even = match target.ip {
            IpAddr::V4(ip) => ip.octets()[3] % 2 == 0,
            IpAddr::V6(_) => false,
        };
        if even {
            ProbeStatus::Reachable { attempts: 1 }
        } else {
            ProbeStatus::Unreachable {
                attempts: 1,
                last: ProbeFailure::Refused,
            }
        }
    }
}

#[tokio::test]
async fn test_localhost_open_and_closed_ports() {
    let (_listener, open) = open_port().await;
    let closed = closed_port().await;

    let request = ScanRequest::parse("127.0.0.1/32")
        .unwrap()
        .with_ports(PortList::from(vec![open, closed]))
        .with_timeout(Duration::from_millis(500));

    let engine = engine(MeterRegistry::with_default_templates());
    let results = engine.scan(&request).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].target(), ProbeTarget::new(LOCALHOST, open));
    assert!(!results[0].is_identified());

    let logs = engine.list_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].total_targets, 2);
    assert_eq!(logs[0].discovered, 1);
}

#[tokio::test]
async fn test_registered_endpoint_is_identified() {
    let (_known, known_port) = open_port().await;
    let (_stranger, stranger_port) = open_port().await;

    let registry = MeterRegistry::with_default_templates();
    let instance = registry
        .create_instance("Acme Energy", "A1000", LOCALHOST, known_port)
        .unwrap();

    let request = ScanRequest::parse("127.0.0.1")
        .unwrap()
        .with_ports(PortList::from(vec![known_port, stranger_port]));

    let mut results = engine(registry).scan(&request).await.unwrap();
    results.sort_by_key(|r| r.target());

    let identified: Vec<_> = results.iter().filter(|r| r.is_identified()).collect();
    assert_eq!(results.len(), 2);
    assert_eq!(identified.len(), 1);
    assert_eq!(identified[0].meter_id, instance.meter_id);
    assert_eq!(identified[0].vendor.as_deref(), Some("Acme Energy"));
    assert_eq!(identified[0].port, known_port);

    let unidentified = results.iter().find(|r| !r.is_identified()).unwrap();
    assert_eq!(unidentified.port, stranger_port);
    assert_eq!(unidentified.vendor, None);
}

#[tokio::test]
async fn test_unreachable_range_logs_empty_scan() {
    let request = ScanRequest::parse("192.0.2.0/30")
        .unwrap()
        .with_ports(PortList::from_u16s(&[9999]).unwrap())
        .with_timeout_secs(0.1)
        .unwrap();

    let engine = engine(MeterRegistry::with_default_templates());
    let results = engine.scan(&request).await.unwrap();
    assert!(results.is_empty());

    let logs = engine.list_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].total_targets, 2);
    assert_eq!(logs[0].discovered, 0);
    assert_eq!(logs[0].ip_range.to_string(), "192.0.2.0/30");
}

#[tokio::test]
async fn test_failing_log_sink_does_not_fail_scan() {
    let (_listener, open) = open_port().await;
    let engine = DiscoveryEngine::new(
        Arc::new(MeterRegistry::with_default_templates()),
        ScanLogBook::new(DownSink),
    );

    let request = ScanRequest::parse("127.0.0.1/32")
        .unwrap()
        .with_ports(PortList::from(vec![open]));
    let report = engine
        .run(&request, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(engine.list_logs(), vec![report.log]);
}

#[tokio::test]
async fn test_concurrency_does_not_change_results() {
    let ports = PortList::from_u16s(&[4059]).unwrap();
    let serial = ScanRequest::parse("10.1.0.0/26")
        .unwrap()
        .with_ports(ports.clone())
        .with_concurrency(1);
    let parallel = serial.clone().with_concurrency(50);

    let engine = engine(MeterRegistry::new());
    let cancel = CancellationToken::new();

    let collect = |report: meterscan::discovery::ScanReport| -> HashSet<ProbeTarget> {
        report.results.iter().map(|r| r.target()).collect()
    };

    let one = engine
        .run_with_prober(&serial, &EvenHostProber, cancel.clone())
        .await
        .unwrap();
    let fifty = engine
        .run_with_prober(&parallel, &EvenHostProber, cancel)
        .await
        .unwrap();

    assert_eq!(one.log.total_targets, 62);
    assert_eq!(one.results.len(), 31);
    assert_eq!(collect(one), collect(fifty));
}

#[test]
fn test_expansion_is_repeatable() {
    let range = AddressRange::parse("10.0.0.0/29").unwrap();
    let ports: PortList = "4059,4060".parse().unwrap();

    let first = range.expand(&ports);
    let second = range.expand(&ports);

    assert_eq!(first, second);
    assert_eq!(first.len(), 12);
    assert_eq!(first[0], ProbeTarget::new("10.0.0.1".parse().unwrap(), Port::DLMS));
}
