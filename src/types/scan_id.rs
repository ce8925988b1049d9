//! Unique identifiers for scans and meters.
//!
//! `ScanId` names one scan log entry; `MeterId` names a known meter
//! instance or a freshly discovered, unidentified endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a completed scan.
///
/// Uses UUID v4 internally for globally unique identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(Uuid);

impl ScanId {
    /// Generate a new random scan ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get a short representation (first 8 characters).
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScanId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 8 {
            return Err(IdError::ShortFormNotSupported);
        }

        let uuid = Uuid::parse_str(s).map_err(|_| IdError::InvalidFormat(s.to_string()))?;
        Ok(Self(uuid))
    }
}

/// Identifier of a meter, either a registered instance or a discovered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeterId(Uuid);

impl MeterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MeterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MeterId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdError::InvalidFormat(s.to_string()))
    }
}

/// Error type for identifier parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdError {
    #[error("invalid identifier format: {0}")]
    InvalidFormat(String),
    #[error("short form IDs require a store lookup")]
    ShortFormNotSupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_id_generation() {
        let id1 = ScanId::new();
        let id2 = ScanId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_scan_id_short() {
        let id = ScanId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }

    #[test]
    fn test_scan_id_parse() {
        let id = ScanId::new();
        let parsed: ScanId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!(matches!(
            id.short().parse::<ScanId>(),
            Err(IdError::ShortFormNotSupported)
        ));
    }

    #[test]
    fn test_meter_id_parse() {
        let id = MeterId::new();
        assert_eq!(id.to_string().parse::<MeterId>().unwrap(), id);
        assert!("not-a-uuid".parse::<MeterId>().is_err());
    }
}
