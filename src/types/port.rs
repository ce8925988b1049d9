//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortList` is the ordered port list carried by a scan request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Default port for DLMS/COSEM over TCP.
    pub const DLMS: Port = Port(4059);

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let raw: u16 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        Self::try_from(raw)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// A range of ports (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// The ports to probe on every host of a scan.
///
/// Order is kept as given and duplicates are not collapsed: each entry
/// produces its own probe target per host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortList(Vec<Port>);

impl PortList {
    /// Create an empty port list.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a single port.
    pub fn push(&mut self, port: Port) {
        self.0.push(port);
    }

    /// Append every port of a range.
    pub fn extend_range(&mut self, range: PortRange) {
        self.0.extend(range.iter());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Port] {
        &self.0
    }

    /// Build a list from raw port numbers, rejecting 0.
    pub fn from_u16s(ports: &[u16]) -> Result<Self, PortError> {
        ports
            .iter()
            .map(|&p| Port::try_from(p))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl Default for PortList {
    /// A single DLMS port.
    fn default() -> Self {
        Self(vec![Port::DLMS])
    }
}

impl From<Vec<Port>> for PortList {
    fn from(ports: Vec<Port>) -> Self {
        Self(ports)
    }
}

impl FromIterator<Port> for PortList {
    fn from_iter<I: IntoIterator<Item = Port>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses "4059", "4059,4060" and "4059-4063" forms, mixed freely.
impl FromStr for PortList {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut list = Self::new();

        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = start.parse::<Port>()?;
                let end = end.parse::<Port>()?;
                list.extend_range(PortRange::new(start, end)?);
            } else {
                list.push(part.parse()?);
            }
        }

        Ok(list)
    }
}

impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(4059).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_port_range() {
        let start = Port::new(4059).unwrap();
        let end = Port::new(4068).unwrap();
        let range = PortRange::new(start, end).unwrap();
        assert_eq!(range.len(), 10);
        assert!(PortRange::new(end, start).is_err());
    }

    #[test]
    fn test_port_list_parsing() {
        let list: PortList = "4059".parse().unwrap();
        assert_eq!(list.len(), 1);

        let list: PortList = "4059,4060".parse().unwrap();
        assert_eq!(list.len(), 2);

        let list: PortList = "4059, 4061-4063".parse().unwrap();
        assert_eq!(list.to_string(), "4059,4061,4062,4063");
    }

    #[test]
    fn test_port_list_keeps_duplicates() {
        let list: PortList = "4059,4059,80".parse().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.as_slice()[2].as_u16(), 80);
    }

    #[test]
    fn test_port_list_rejects_bad_input() {
        assert!(matches!("".parse::<PortList>(), Err(PortError::Empty)));
        assert!(matches!("0".parse::<PortList>(), Err(PortError::OutOfRange(0))));
        assert!(matches!("abc".parse::<PortList>(), Err(PortError::InvalidFormat(_))));
        assert!(matches!("70000".parse::<PortList>(), Err(PortError::InvalidFormat(_))));
        assert!("10-5".parse::<PortList>().is_err());
    }

    #[test]
    fn test_default_port_list() {
        assert_eq!(PortList::default().as_slice(), &[Port::DLMS]);
    }

    #[test]
    fn test_port_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Port>("0").is_err());
        let port: Port = serde_json::from_str("4059").unwrap();
        assert_eq!(port, Port::DLMS);
    }
}
