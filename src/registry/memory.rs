//! In-process meter registry with optional JSON persistence.

use super::{
    default_templates, template_key, IdentityResolver, MeterInstance, MeterTemplate,
};
use crate::error::{RegistryError, RegistryResult};
use crate::types::{MeterId, Port};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Upper bound on instances created by one bulk request.
pub const MAX_BULK_INSTANCES: usize = 10_000;

/// First port used when seeding sample instances.
const SAMPLE_BASE_PORT: u16 = 4059;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct RegistryState {
    #[serde(default)]
    templates: Vec<MeterTemplate>,
    #[serde(default)]
    instances: Vec<MeterInstance>,
}

/// Registry of meter templates and the instances created from them.
///
/// Owned by whoever builds the engine and shared through an `Arc`;
/// readers and writers are serialized by an internal lock.
#[derive(Debug, Default)]
pub struct MeterRegistry {
    state: RwLock<RegistryState>,
}

impl MeterRegistry {
    /// Create an empty registry with no templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in templates.
    pub fn with_default_templates() -> Self {
        let registry = Self::new();
        for template in default_templates() {
            registry.register_template(template);
        }
        registry
    }

    /// Load a registry from a JSON file. A missing file gives the built-in templates.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Registry file not found, using defaults");
            return Ok(Self::with_default_templates());
        }

        let content = fs::read_to_string(path).map_err(|e| RegistryError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut state: RegistryState = serde_json::from_str(&content)?;
        if state.templates.is_empty() {
            state.templates = default_templates();
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Persist templates and instances as pretty JSON.
    pub fn save(&self, path: &Path) -> RegistryResult<()> {
        let write_err = |e: std::io::Error| RegistryError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(&*self.read())?;
        fs::write(path, content).map_err(write_err)
    }

    /// Add a template, replacing any existing one with the same vendor and model.
    pub fn register_template(&self, template: MeterTemplate) {
        let mut state = self.write();
        let key = template.key();
        match state.templates.iter_mut().find(|t| t.key() == key) {
            Some(existing) => *existing = template,
            None => state.templates.push(template),
        }
    }

    pub fn list_templates(&self) -> Vec<MeterTemplate> {
        self.read().templates.clone()
    }

    /// Create an instance of a registered template bound to `ip:port`.
    pub fn create_instance(
        &self,
        vendor: &str,
        model: &str,
        ip: IpAddr,
        port: Port,
    ) -> RegistryResult<MeterInstance> {
        let mut state = self.write();
        let instance = instantiate(&state.templates, vendor, model, ip, port)?;
        state.instances.push(instance.clone());
        info!(meter_id = %instance.meter_id, %ip, %port, vendor, model, "Meter instance created");
        Ok(instance)
    }

    /// Create `count` instances on consecutive ports starting at `start_port`.
    pub fn create_bulk(
        &self,
        vendor: &str,
        model: &str,
        base_ip: IpAddr,
        start_port: Port,
        count: usize,
    ) -> RegistryResult<Vec<MeterInstance>> {
        if count == 0 || count > MAX_BULK_INSTANCES {
            return Err(RegistryError::InvalidBulk(format!(
                "count must be between 1 and {}, got {}",
                MAX_BULK_INSTANCES, count
            )));
        }
        let last = usize::from(start_port.as_u16()) + count - 1;
        if last > usize::from(Port::MAX) {
            return Err(RegistryError::InvalidBulk(format!(
                "{} instances from port {} would exceed port {}",
                count,
                start_port,
                Port::MAX
            )));
        }

        let mut state = self.write();
        let mut created = Vec::with_capacity(count);
        for offset in 0..count {
            let raw = start_port.as_u16() + offset as u16;
            let port = Port::try_from(raw).map_err(|e| RegistryError::InvalidBulk(e.to_string()))?;
            created.push(instantiate(&state.templates, vendor, model, base_ip, port)?);
        }
        state.instances.extend(created.iter().cloned());
        info!(count, %base_ip, %start_port, vendor, model, "Meter instances created");
        Ok(created)
    }

    pub fn list_instances(&self) -> Vec<MeterInstance> {
        self.read().instances.clone()
    }

    /// Exact (address, port) lookup.
    pub fn lookup(&self, ip: IpAddr, port: Port) -> Option<MeterInstance> {
        self.read()
            .instances
            .iter()
            .find(|instance| instance.matches(ip, port))
            .cloned()
    }

    /// Create one loopback instance per template when the registry has none.
    ///
    /// Returns the number of instances created.
    pub fn seed_sample_instances(&self) -> RegistryResult<usize> {
        if !self.read().instances.is_empty() {
            return Ok(0);
        }

        let templates = self.list_templates();
        for (index, template) in templates.iter().enumerate() {
            let port = u16::try_from(index)
                .ok()
                .and_then(|offset| SAMPLE_BASE_PORT.checked_add(offset))
                .and_then(Port::new)
                .ok_or_else(|| {
                    RegistryError::InvalidBulk(format!(
                        "{} templates do not fit on ports from {}",
                        templates.len(),
                        SAMPLE_BASE_PORT
                    ))
                })?;
            self.create_instance(
                &template.vendor,
                &template.model,
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                port,
            )?;
        }
        Ok(templates.len())
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn instantiate(
    templates: &[MeterTemplate],
    vendor: &str,
    model: &str,
    ip: IpAddr,
    port: Port,
) -> RegistryResult<MeterInstance> {
    let key = template_key(vendor, model);
    let unknown = || RegistryError::UnknownTemplate {
        vendor: vendor.to_string(),
        model: model.to_string(),
    };

    let template = templates.iter().find(|t| t.key() == key).ok_or_else(unknown)?;
    let authentication = *template.authentication_modes.first().ok_or_else(unknown)?;
    let security_suite = *template.security_suites.first().ok_or_else(unknown)?;

    Ok(MeterInstance {
        meter_id: MeterId::new(),
        vendor: template.vendor.clone(),
        model: template.model.clone(),
        ip_address: ip,
        port,
        authentication,
        security_suite,
        obis_objects: template.obis_objects.clone(),
    })
}

#[async_trait]
impl IdentityResolver for MeterRegistry {
    async fn find_instance(&self, ip: IpAddr, port: Port) -> RegistryResult<Option<MeterInstance>> {
        Ok(self.lookup(ip, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AuthenticationMode;

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_create_instance_uses_template_defaults() {
        let registry = MeterRegistry::with_default_templates();
        let instance = registry
            .create_instance("Acme Energy", "A1000", localhost(), Port::DLMS)
            .unwrap();

        assert_eq!(instance.authentication, AuthenticationMode::Lls);
        assert_eq!(instance.security_suite.as_u8(), 1);
        assert_eq!(instance.obis_objects.len(), 2);
        assert_eq!(registry.list_instances().len(), 1);
    }

    #[test]
    fn test_create_instance_unknown_template() {
        let registry = MeterRegistry::with_default_templates();
        let result = registry.create_instance("Nobody", "X1", localhost(), Port::DLMS);
        assert!(matches!(result, Err(RegistryError::UnknownTemplate { .. })));
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = MeterRegistry::with_default_templates();
        let instance = registry
            .create_instance("Zenith Power", "Z900", localhost(), Port::DLMS)
            .unwrap();

        let found = registry.lookup(localhost(), Port::DLMS).unwrap();
        assert_eq!(found.meter_id, instance.meter_id);

        assert!(registry.lookup(localhost(), Port::new(4060).unwrap()).is_none());
        assert!(registry
            .lookup("127.0.0.2".parse().unwrap(), Port::DLMS)
            .is_none());
    }

    #[test]
    fn test_register_template_replaces_same_key() {
        let registry = MeterRegistry::with_default_templates();
        let mut template = registry.list_templates()[0].clone();
        template.authentication_modes = vec![AuthenticationMode::Hls];
        registry.register_template(template);

        let templates = registry.list_templates();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].authentication_modes, vec![AuthenticationMode::Hls]);
    }

    #[test]
    fn test_create_bulk() {
        let registry = MeterRegistry::with_default_templates();
        let created = registry
            .create_bulk("Acme Energy", "A1000", localhost(), Port::DLMS, 5)
            .unwrap();

        assert_eq!(created.len(), 5);
        assert_eq!(created[4].port.as_u16(), 4063);
        assert!(registry.lookup(localhost(), Port::new(4062).unwrap()).is_some());
    }

    #[test]
    fn test_create_bulk_limits() {
        let registry = MeterRegistry::with_default_templates();
        assert!(registry
            .create_bulk("Acme Energy", "A1000", localhost(), Port::DLMS, 0)
            .is_err());
        assert!(registry
            .create_bulk("Acme Energy", "A1000", localhost(), Port::new(65535).unwrap(), 2)
            .is_err());
        assert!(registry.list_instances().is_empty());
    }

    #[test]
    fn test_seed_sample_instances_once() {
        let registry = MeterRegistry::with_default_templates();
        assert_eq!(registry.seed_sample_instances().unwrap(), 2);
        assert_eq!(registry.seed_sample_instances().unwrap(), 0);
        assert!(registry.lookup(localhost(), Port::new(4060).unwrap()).is_some());
    }

    #[test]
    fn test_seed_sample_instances_port_overflow() {
        let template = default_templates().remove(0);
        let registry = MeterRegistry {
            state: RwLock::new(RegistryState {
                templates: vec![template; 61_500],
                instances: Vec::new(),
            }),
        };

        let result = registry.seed_sample_instances();
        assert!(matches!(result, Err(RegistryError::InvalidBulk(_))));
        assert!(registry.lookup(localhost(), Port::new(65535).unwrap()).is_some());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.json");

        let registry = MeterRegistry::with_default_templates();
        let instance = registry
            .create_instance("Acme Energy", "A1000", localhost(), Port::DLMS)
            .unwrap();
        registry.save(&path).unwrap();

        let loaded = MeterRegistry::load(&path).unwrap();
        assert_eq!(loaded.list_templates().len(), 2);
        assert_eq!(loaded.lookup(localhost(), Port::DLMS), Some(instance));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let registry = MeterRegistry::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(registry.list_templates().len(), 2);
        assert!(registry.list_instances().is_empty());
    }

    #[test]
    fn test_find_instance_through_resolver() {
        let registry = MeterRegistry::with_default_templates();
        registry
            .create_instance("Acme Energy", "A1000", localhost(), Port::DLMS)
            .unwrap();

        let found = tokio_test::block_on(registry.find_instance(localhost(), Port::DLMS)).unwrap();
        assert!(found.is_some());
    }
}
