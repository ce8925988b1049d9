//! Scan coordinator.
//!
//! Drives target expansion, bounded concurrent probing, identity
//! resolution and scan logging for one request at a time (or several in
//! parallel; the engine is shareable).

use crate::discovery::probe::{Prober, TcpProber};
use crate::discovery::request::ScanRequest;
use crate::discovery::result::{DiscoveryResult, ScanLog, ScanReport};
use crate::error::EngineResult;
use crate::registry::IdentityResolver;
use crate::storage::ScanLogBook;
use crate::types::{ProbeTarget, ScanId};
use chrono::Utc;
use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Default cap on probes in flight across every scan run by one engine.
pub const DEFAULT_INFLIGHT_LIMIT: usize = 1024;

/// The discovery engine.
///
/// Each scan is bounded by its request's `max_concurrency`; all scans on
/// the same engine additionally share one in-flight cap, so repeated calls
/// never open more sockets than that cap.
pub struct DiscoveryEngine {
    resolver: Arc<dyn IdentityResolver>,
    logs: ScanLogBook,
    inflight: Arc<Semaphore>,
}

impl DiscoveryEngine {
    /// Create an engine over an injected resolver and log book.
    pub fn new(resolver: Arc<dyn IdentityResolver>, logs: ScanLogBook) -> Self {
        Self {
            resolver,
            logs,
            inflight: Arc::new(Semaphore::new(DEFAULT_INFLIGHT_LIMIT)),
        }
    }

    /// Replace the engine-wide in-flight cap.
    pub fn with_inflight_limit(mut self, limit: usize) -> Self {
        self.inflight = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Scan over TCP and return the reachable endpoints.
    pub async fn scan(&self, request: &ScanRequest) -> EngineResult<Vec<DiscoveryResult>> {
        let report = self.run(request, CancellationToken::new()).await?;
        Ok(report.results)
    }

    /// Scan over TCP, stopping early if `cancel` fires.
    pub async fn run(
        &self,
        request: &ScanRequest,
        cancel: CancellationToken,
    ) -> EngineResult<ScanReport> {
        request.validate()?;
        let prober = TcpProber::for_request(request)?;
        self.run_with_prober(request, &prober, cancel).await
    }

    /// Scan using a caller-supplied prober.
    ///
    /// Cancelling drops in-flight probes and skips pending targets; results
    /// collected before that are returned and the log entry is still written.
    pub async fn run_with_prober<P>(
        &self,
        request: &ScanRequest,
        prober: &P,
        cancel: CancellationToken,
    ) -> EngineResult<ScanReport>
    where
        P: Prober + ?Sized,
    {
        request.validate()?;

        let started_at = Utc::now();
        let clock = Instant::now();
        let total_targets = request.target_count();

        info!(
            range = %request.range,
            ports = %request.ports,
            targets = total_targets,
            concurrency = request.max_concurrency,
            attempts = request.attempts(),
            "Scan started"
        );

        let results = if total_targets == 0 {
            Vec::new()
        } else {
            self.probe_all(request, prober, &cancel).await
        };

        let cancelled = cancel.is_cancelled();
        if cancelled {
            warn!(range = %request.range, collected = results.len(), "Scan cancelled");
        }

        let log = ScanLog {
            scan_id: ScanId::new(),
            ip_range: request.range,
            ports: request.ports.clone(),
            total_targets,
            discovered: results.len(),
            started_at,
            completed_at: Utc::now(),
            cancelled,
        };
        self.logs.record(&log);

        info!(
            scan_id = %log.scan_id,
            targets = total_targets,
            discovered = log.discovered,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Scan complete"
        );

        Ok(ScanReport { log, results })
    }

    /// Scan logs, newest first. Falls back to in-process entries when the store fails.
    pub fn list_logs(&self) -> Vec<ScanLog> {
        self.logs.list()
    }

    pub fn log_book(&self) -> &ScanLogBook {
        &self.logs
    }

    async fn probe_all<P>(
        &self,
        request: &ScanRequest,
        prober: &P,
        cancel: &CancellationToken,
    ) -> Vec<DiscoveryResult>
    where
        P: Prober + ?Sized,
    {
        stream::iter(request.range.targets(&request.ports))
            .map(|target| self.probe_target(target, prober))
            .buffer_unordered(request.max_concurrency)
            .filter_map(future::ready)
            .take_until(cancel.cancelled())
            .collect()
            .await
    }

    async fn probe_target<P>(&self, target: ProbeTarget, prober: &P) -> Option<DiscoveryResult>
    where
        P: Prober + ?Sized,
    {
        let status = {
            // The semaphore is never closed.
            let _permit = self.inflight.acquire().await.ok()?;
            prober.probe(target).await
        };

        if !status.is_reachable() {
            trace!(%target, ?status, "Target unreachable");
            return None;
        }

        Some(self.resolve(target).await)
    }

    async fn resolve(&self, target: ProbeTarget) -> DiscoveryResult {
        let now = Utc::now();
        match self.resolver.find_instance(target.ip, target.port).await {
            Ok(Some(instance)) => {
                debug!(%target, meter_id = %instance.meter_id, vendor = %instance.vendor, "Identified meter");
                DiscoveryResult::identified(&instance, now)
            }
            Ok(None) => {
                debug!(%target, "Reachable endpoint not in registry");
                DiscoveryResult::unidentified(target, now)
            }
            Err(e) => {
                warn!(%target, error = %e, "Identity lookup failed, reporting endpoint as unidentified");
                DiscoveryResult::unidentified(target, now)
            }
        }
    }
}
