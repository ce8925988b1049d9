//! Address ranges and probe targets.
//!
//! An `AddressRange` is a CIDR block (IPv4 or IPv6). Crossing its usable
//! hosts with a `PortList` yields the `ProbeTarget`s of a scan.

use super::port::{Port, PortList};
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

/// A single (address, port) pair to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProbeTarget {
    pub ip: IpAddr,
    pub port: Port,
}

impl ProbeTarget {
    pub fn new(ip: IpAddr, port: Port) -> Self {
        Self { ip, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port.as_u16())
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// Error type for address range parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
}

/// A CIDR address range to sweep.
///
/// Host bits below the prefix are ignored, so "10.0.0.5/24" and
/// "10.0.0.0/24" describe the same range. A bare address is a
/// single-host range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressRange {
    network: IpNetwork,
}

impl AddressRange {
    /// Parse a range from CIDR notation or a bare address.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        let invalid = || TargetError::InvalidCidr(s.to_string());

        let parsed = match s.parse::<IpAddr>() {
            Ok(ip) => {
                let prefix = if ip.is_ipv4() { 32 } else { 128 };
                IpNetwork::new(ip, prefix).map_err(|_| invalid())?
            }
            Err(_) if s.contains('/') => s.parse::<IpNetwork>().map_err(|_| invalid())?,
            Err(_) => return Err(invalid()),
        };

        let network = IpNetwork::new(parsed.network(), parsed.prefix()).map_err(|_| invalid())?;
        Ok(Self { network })
    }

    /// The underlying network.
    pub fn network(&self) -> IpNetwork {
        self.network
    }

    fn address_bits(&self) -> u32 {
        match self.network {
            IpNetwork::V4(_) => 32,
            IpNetwork::V6(_) => 128,
        }
    }

    /// Total number of addresses in the block.
    pub fn address_count(&self) -> u128 {
        let host_bits = self.address_bits() - u32::from(self.network.prefix());
        if host_bits >= 128 {
            u128::MAX
        } else {
            1u128 << host_bits
        }
    }

    /// First usable host offset and usable host count.
    fn host_span(&self) -> (u128, u128) {
        let size = self.address_count();
        let host_bits = self.address_bits() - u32::from(self.network.prefix());
        match (self.network, host_bits) {
            (_, 0) => (0, 1),
            (_, 1) => (0, 2),
            // Network and broadcast addresses are not hosts.
            (IpNetwork::V4(_), _) => (1, size - 2),
            // Subnet-router anycast address is not a host.
            (IpNetwork::V6(_), _) => (1, size - 1),
        }
    }

    /// Number of usable hosts in the range.
    pub fn host_count(&self) -> u128 {
        self.host_span().1
    }

    /// Iterate the usable hosts in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = IpAddr> {
        let (first, count) = self.host_span();
        let base = match self.network.network() {
            IpAddr::V4(ip) => u128::from(u32::from(ip)),
            IpAddr::V6(ip) => u128::from(ip),
        };
        let is_v4 = matches!(self.network, IpNetwork::V4(_));

        (0..count).map(move |i| {
            let raw = base + first + i;
            if is_v4 {
                IpAddr::V4(Ipv4Addr::from(raw as u32))
            } else {
                IpAddr::V6(Ipv6Addr::from(raw))
            }
        })
    }

    /// Lazily cross every usable host with every port, host-major.
    pub fn targets<'a>(&self, ports: &'a PortList) -> impl Iterator<Item = ProbeTarget> + 'a {
        self.hosts()
            .flat_map(move |ip| ports.iter().map(move |port| ProbeTarget::new(ip, port)))
    }

    /// Number of targets `targets` will yield, saturating at `usize::MAX`.
    pub fn target_count(&self, ports: &PortList) -> usize {
        if ports.is_empty() {
            return 0;
        }
        usize::try_from(self.host_count())
            .unwrap_or(usize::MAX)
            .saturating_mul(ports.len())
    }

    /// Materialize the full target list. Only sensible for small ranges;
    /// scans iterate `targets` instead.
    pub fn expand(&self, ports: &PortList) -> Vec<ProbeTarget> {
        let mut targets = Vec::with_capacity(self.target_count(ports));
        targets.extend(self.targets(ports));
        targets
    }
}

impl FromStr for AddressRange {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AddressRange {
    type Error = TargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AddressRange> for String {
    fn from(range: AddressRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &str) -> PortList {
        list.parse().unwrap()
    }

    #[test]
    fn test_parse_cidr_v4() {
        let range = AddressRange::parse("192.168.1.0/24").unwrap();
        assert_eq!(range.network().prefix(), 24);
        assert_eq!(range.host_count(), 254);
    }

    #[test]
    fn test_parse_normalizes_host_bits() {
        let range = AddressRange::parse("10.0.0.77/24").unwrap();
        assert_eq!(range.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_parse_bare_address() {
        let range = AddressRange::parse("127.0.0.1").unwrap();
        let hosts: Vec<IpAddr> = range.hosts().collect();
        assert_eq!(hosts, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "not-a-range", "10.0.0.0/33", "300.1.1.1/24", "10.0.0.0/"] {
            assert!(
                matches!(AddressRange::parse(input), Err(TargetError::InvalidCidr(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_wide_ranges_accepted() {
        let slash15 = AddressRange::parse("10.0.0.0/15").unwrap();
        assert_eq!(slash15.host_count(), 131_070);
        assert_eq!(slash15.target_count(&ports("4059,4060")), 262_140);

        let slash8 = AddressRange::parse("10.0.0.0/8").unwrap();
        assert_eq!(slash8.targets(&ports("4059")).next().unwrap().to_string(), "10.0.0.1:4059");
    }

    #[test]
    fn test_ipv6_target_count_saturates() {
        let range = AddressRange::parse("2001:db8::/32").unwrap();
        assert_eq!(range.host_count(), (1u128 << 96) - 1);
        assert_eq!(range.target_count(&ports("4059,4060")), usize::MAX);
        assert_eq!(range.target_count(&PortList::new()), 0);
        assert_eq!(
            range.hosts().next().unwrap(),
            "2001:db8::1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_small_prefixes() {
        let hosts: Vec<_> = AddressRange::parse("10.0.0.0/30").unwrap().hosts().collect();
        assert_eq!(
            hosts,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "10.0.0.2".parse::<IpAddr>().unwrap()
            ]
        );

        assert_eq!(AddressRange::parse("10.0.0.0/31").unwrap().host_count(), 2);
        assert_eq!(AddressRange::parse("10.0.0.9/32").unwrap().host_count(), 1);
    }

    #[test]
    fn test_ipv6_hosts() {
        let range = AddressRange::parse("2001:db8::/126").unwrap();
        let hosts: Vec<_> = range.hosts().map(|ip| ip.to_string()).collect();
        assert_eq!(hosts, vec!["2001:db8::1", "2001:db8::2", "2001:db8::3"]);
        assert_eq!(AddressRange::parse("::1").unwrap().host_count(), 1);
    }

    #[test]
    fn test_target_counts() {
        let slash24 = AddressRange::parse("192.168.1.0/24").unwrap();
        assert_eq!(slash24.expand(&ports("4059,4060")).len(), 508);

        let slash30 = AddressRange::parse("10.0.0.0/30").unwrap();
        assert_eq!(slash30.target_count(&ports("4059,4060")), 4);
        assert_eq!(slash30.expand(&ports("4059,4060")).len(), 4);

        let single = AddressRange::parse("10.0.0.1/32").unwrap();
        assert_eq!(single.expand(&ports("4059")).len(), 1);

        assert!(slash24.expand(&PortList::new()).is_empty());
    }

    #[test]
    fn test_duplicate_ports_expand_separately() {
        let range = AddressRange::parse("10.0.0.0/30").unwrap();
        assert_eq!(range.expand(&ports("4059,4059")).len(), 4);
    }

    #[test]
    fn test_expand_is_idempotent() {
        let range = AddressRange::parse("172.16.5.0/28").unwrap();
        let list = ports("4059,4061");
        assert_eq!(range.expand(&list), range.expand(&list));
    }

    #[test]
    fn test_expand_is_host_major() {
        let range = AddressRange::parse("10.0.0.0/30").unwrap();
        let rendered: Vec<String> = range
            .expand(&ports("1,2"))
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(
            rendered,
            vec!["10.0.0.1:1", "10.0.0.1:2", "10.0.0.2:1", "10.0.0.2:2"]
        );
    }

    #[test]
    fn test_range_serde_as_string() {
        let range = AddressRange::parse("10.0.0.0/24").unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "\"10.0.0.0/24\"");
        assert!(serde_json::from_str::<AddressRange>("\"garbage\"").is_err());
    }
}
