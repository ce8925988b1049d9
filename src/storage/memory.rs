//! In-memory scan log sink.

use super::book::RETAINED_LOGS;
use super::ScanLogSink;
use crate::discovery::ScanLog;
use crate::error::StorageResult;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Keeps the newest scan logs for the lifetime of the process only.
#[derive(Debug)]
pub struct MemoryLogStore {
    logs: Mutex<VecDeque<ScanLog>>,
    capacity: usize,
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::with_capacity(RETAINED_LOGS)
    }
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store keeping at most `capacity` entries; the oldest are dropped first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            logs: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }
}

impl ScanLogSink for MemoryLogStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn append(&self, log: &ScanLog) -> StorageResult<()> {
        let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        if logs.len() == self.capacity {
            logs.pop_front();
        }
        logs.push_back(log.clone());
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<ScanLog>> {
        let logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(logs.iter().rev().cloned().collect())
    }
}
