//! Device registry: meter templates, meter instances and identity lookup.
//!
//! The discovery engine only sees the [`IdentityResolver`] trait. The
//! in-process [`MeterRegistry`] is one implementation of it.

mod memory;

pub use memory::MeterRegistry;

use crate::error::RegistryResult;
use crate::types::{MeterId, Port};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Association authentication mechanism a meter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthenticationMode {
    /// Lowest level security, no authentication.
    #[serde(rename = "None")]
    None,
    /// Low level security (password).
    #[serde(rename = "LLS")]
    Lls,
    /// High level security (challenge/response).
    #[serde(rename = "HLS")]
    Hls,
}

impl fmt::Display for AuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Lls => write!(f, "LLS"),
            Self::Hls => write!(f, "HLS"),
        }
    }
}

impl std::str::FromStr for AuthenticationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "lls" => Ok(Self::Lls),
            "hls" => Ok(Self::Hls),
            _ => Err(format!("unknown authentication mode: {}", s)),
        }
    }
}

/// Security suite number (0, 1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SecuritySuite(u8);

impl SecuritySuite {
    pub const MAX: u8 = 2;

    pub const fn new(suite: u8) -> Option<Self> {
        if suite <= Self::MAX {
            Some(Self(suite))
        } else {
            None
        }
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SecuritySuite {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("security suite {} out of range (0-2)", value))
    }
}

impl From<SecuritySuite> for u8 {
    fn from(suite: SecuritySuite) -> Self {
        suite.0
    }
}

impl fmt::Display for SecuritySuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object referencing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Referencing {
    /// Logical name referencing.
    #[serde(rename = "LN")]
    Ln,
    /// Short name referencing.
    #[serde(rename = "SN")]
    Sn,
}

/// A COSEM object exposed by a meter model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObisObject {
    /// OBIS code, e.g. "1-0:1.8.0".
    pub code: String,
    pub description: String,
    pub data_type: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl ObisObject {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        data_type: impl Into<String>,
        unit: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            data_type: data_type.into(),
            unit: unit.map(str::to_string),
        }
    }
}

/// A vendor/model description instances are created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterTemplate {
    pub vendor: String,
    pub model: String,
    pub referencing: Referencing,
    /// Supported modes; the first one is used for new instances.
    pub authentication_modes: Vec<AuthenticationMode>,
    /// Supported suites; the first one is used for new instances.
    pub security_suites: Vec<SecuritySuite>,
    pub obis_objects: Vec<ObisObject>,
}

impl MeterTemplate {
    /// Registry key, "vendor:model".
    pub fn key(&self) -> String {
        template_key(&self.vendor, &self.model)
    }
}

pub(crate) fn template_key(vendor: &str, model: &str) -> String {
    format!("{}:{}", vendor, model)
}

/// A known meter bound to one (address, port) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterInstance {
    pub meter_id: MeterId,
    pub vendor: String,
    pub model: String,
    pub ip_address: IpAddr,
    pub port: Port,
    pub authentication: AuthenticationMode,
    pub security_suite: SecuritySuite,
    pub obis_objects: Vec<ObisObject>,
}

impl MeterInstance {
    pub fn matches(&self, ip: IpAddr, port: Port) -> bool {
        self.ip_address == ip && self.port == port
    }
}

/// Resolves a reachable endpoint to a known meter.
///
/// Lookup is exact on (address, port). `Ok(None)` is the normal answer for
/// an endpoint nobody registered.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn find_instance(&self, ip: IpAddr, port: Port) -> RegistryResult<Option<MeterInstance>>;
}

/// Templates a fresh registry starts with.
pub fn default_templates() -> Vec<MeterTemplate> {
    vec![
        MeterTemplate {
            vendor: "Acme Energy".to_string(),
            model: "A1000".to_string(),
            referencing: Referencing::Ln,
            authentication_modes: vec![AuthenticationMode::Lls, AuthenticationMode::Hls],
            security_suites: vec![SecuritySuite(1), SecuritySuite(2)],
            obis_objects: vec![
                ObisObject::new("1-0:1.8.0", "Active energy import", "double", Some("kWh")),
                ObisObject::new("1-0:2.8.0", "Active energy export", "double", Some("kWh")),
            ],
        },
        MeterTemplate {
            vendor: "Zenith Power".to_string(),
            model: "Z900".to_string(),
            referencing: Referencing::Sn,
            authentication_modes: vec![AuthenticationMode::None, AuthenticationMode::Lls],
            security_suites: vec![SecuritySuite(0), SecuritySuite(1)],
            obis_objects: vec![
                ObisObject::new("1-0:32.7.0", "Voltage L1", "double", Some("V")),
                ObisObject::new("1-0:52.7.0", "Voltage L2", "double", Some("V")),
            ],
        },
    ]
}
