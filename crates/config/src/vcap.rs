use crate::ConfigError;
use serde::Deserialize;
use std::{collections::HashMap, env};

/// A single service binding as it appears in `VCAP_SERVICES`
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceBinding {
    pub name: String,
    #[serde(default)]
    pub credentials: HashMap<String, serde_json::Value>,
}

/// Services bound to the application, grouped by service label
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct VcapServices(HashMap<String, Vec<ServiceBinding>>);

impl VcapServices {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load from the `VCAP_SERVICES` environment variable.
    /// An unset variable yields an empty set of bindings.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var("VCAP_SERVICES") {
            Ok(raw) if !raw.trim().is_empty() => Self::parse(&raw),
            _ => Ok(Self::default()),
        }
    }

    /// Find a bound service by instance name
    pub fn service(&self, name: &str) -> Option<&ServiceBinding> {
        self.0
            .values()
            .flat_map(|bindings| bindings.iter())
            .find(|binding| binding.name == name)
    }

    /// Look up a string credential on a bound service
    pub fn service_property(&self, service: &str, property: &str) -> Result<String, ConfigError> {
        let binding = self
            .service(service)
            .ok_or_else(|| ConfigError::ServiceNotFound(service.to_string()))?;

        match binding.credentials.get(property) {
            Some(serde_json::Value::String(value)) if !value.is_empty() => Ok(value.clone()),
            _ => Err(ConfigError::PropertyNotFound {
                service: service.to_string(),
                property: property.to_string(),
            }),
        }
    }
}
