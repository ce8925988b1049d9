//! TCP reachability prober.
//!
//! A probe is a plain TCP connect: the connection is dropped as soon as it
//! is established and no payload is exchanged. Failing to connect is the
//! common case and is reported as a status, never as an error.

use crate::discovery::request::ScanRequest;
use crate::error::{DiscoveryError, EngineResult};
use crate::types::ProbeTarget;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Why a connection attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("connection refused")]
    Refused,
    #[error("connection timed out")]
    Timeout,
    #[error("unreachable: {0}")]
    Unreachable(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for ProbeFailure {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                Self::Unreachable(e.to_string())
            }
            _ => Self::Io(e.to_string()),
        }
    }
}

/// Outcome of probing one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// A connection was established on attempt number `attempts`.
    Reachable { attempts: u32 },
    /// Every attempt failed; `last` is the final failure.
    Unreachable { attempts: u32, last: ProbeFailure },
}

impl ProbeStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

/// Reachability check for a single target.
///
/// Implementations must bound their own running time; the coordinator
/// relies on every probe finishing.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: ProbeTarget) -> ProbeStatus;
}

/// TCP connect prober with a per-attempt timeout and sequential retries.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
    attempts: u32,
}

impl TcpProber {
    /// Create a prober making `max(retries, 1)` attempts of at most `timeout` each.
    pub fn new(timeout: Duration, retries: u32) -> EngineResult<Self> {
        if timeout.is_zero() {
            return Err(DiscoveryError::InvalidRequest(
                "probe timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            timeout,
            attempts: retries.max(1),
        })
    }

    /// Create a prober using the request's timeout and retry count.
    pub fn for_request(request: &ScanRequest) -> EngineResult<Self> {
        Self::new(request.timeout, request.retries)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    async fn attempt_connect(&self, addr: SocketAddr) -> Result<(), ProbeFailure> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(ProbeFailure::from(e)),
            Err(_) => Err(ProbeFailure::Timeout),
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: ProbeTarget) -> ProbeStatus {
        let addr = target.socket_addr();
        let mut last = ProbeFailure::Timeout;

        for attempt in 1..=self.attempts {
            match self.attempt_connect(addr).await {
                Ok(()) => return ProbeStatus::Reachable { attempts: attempt },
                Err(failure) => {
                    trace!(%target, attempt, error = %failure, "Connect attempt failed");
                    last = failure;
                }
            }
        }

        ProbeStatus::Unreachable {
            attempts: self.attempts,
            last,
        }
    }
}
