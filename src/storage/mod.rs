//! Scan log persistence.
//!
//! A [`ScanLogSink`] stores scan summaries. [`JsonLogStore`] is the durable
//! implementation and [`MemoryLogStore`] the in-process one; the engine
//! writes through a [`ScanLogBook`], which keeps its own copy of every entry
//! so a failing sink never loses the log or fails a scan.

mod book;
mod json_store;
mod memory;

pub use book::ScanLogBook;
pub use json_store::JsonLogStore;
pub use memory::MemoryLogStore;

use crate::discovery::ScanLog;
use crate::error::StorageResult;

/// Destination for completed scan logs.
pub trait ScanLogSink: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Store one log entry.
    fn append(&self, log: &ScanLog) -> StorageResult<()>;

    /// All stored entries, newest first.
    fn list(&self) -> StorageResult<Vec<ScanLog>>;
}
