//! Configuration management for meterscan.
//!
//! Provides XDG-compliant settings storage and path resolution.

mod settings;

pub use settings::{AppSettings, Paths};
