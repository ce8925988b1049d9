//! Best-effort scan log recording with an in-process fallback.

use super::{JsonLogStore, MemoryLogStore, ScanLogSink};
use crate::discovery::ScanLog;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Number of entries retained in-process; the oldest are dropped first.
pub const RETAINED_LOGS: usize = 1024;

/// Records scan logs to a sink without ever failing the caller.
///
/// Every entry is also retained in-process. Listing reads the sink and
/// falls back to the retained entries if the sink cannot be read.
pub struct ScanLogBook {
    sink: Box<dyn ScanLogSink>,
    retained: Mutex<VecDeque<ScanLog>>,
}

impl ScanLogBook {
    pub fn new(sink: impl ScanLogSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            retained: Mutex::new(VecDeque::new()),
        }
    }

    /// A book with no durable storage.
    pub fn in_memory() -> Self {
        Self::new(MemoryLogStore::new())
    }

    /// A book backed by a JSON store in `dir`, or in-memory if the
    /// directory cannot be used.
    pub fn open(dir: &Path) -> Self {
        match JsonLogStore::open(dir) {
            Ok(store) => Self::new(store),
            Err(e) => {
                warn!(
                    dir = %dir.display(),
                    error = %e,
                    "Scan log store unavailable, keeping logs in memory"
                );
                Self::in_memory()
            }
        }
    }

    /// Name of the sink selected at construction.
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Retain `log` and write it to the sink. Returns whether the sink write succeeded.
    pub fn record(&self, log: &ScanLog) -> bool {
        {
            let mut retained = self.retained.lock().unwrap_or_else(PoisonError::into_inner);
            if retained.len() == RETAINED_LOGS {
                retained.pop_front();
            }
            retained.push_back(log.clone());
        }

        match self.sink.append(log) {
            Ok(()) => {
                debug!(scan_id = %log.scan_id, sink = self.sink.name(), "Scan log stored");
                true
            }
            Err(e) => {
                warn!(
                    scan_id = %log.scan_id,
                    sink = self.sink.name(),
                    error = %e,
                    "Failed to store scan log, retained in memory"
                );
                false
            }
        }
    }

    /// Scan logs, newest first.
    pub fn list(&self) -> Vec<ScanLog> {
        match self.sink.list() {
            Ok(logs) => logs,
            Err(e) => {
                warn!(
                    sink = self.sink.name(),
                    error = %e,
                    "Failed to read scan logs, using in-memory copy"
                );
                self.retained()
            }
        }
    }

    /// Entries retained in-process, newest first.
    pub fn retained(&self) -> Vec<ScanLog> {
        let retained = self.retained.lock().unwrap_or_else(PoisonError::into_inner);
        retained.iter().rev().cloned().collect()
    }
}
