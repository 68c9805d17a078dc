//! The [`ServiceGraph`] aggregate and lookups over it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{EncodeError, LookupError};
use crate::service::Service;

/// Settings that apply to the whole graph rather than to a single service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalDefaults {
    /// Address of the ingress gateway that load is sent through.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ingress_gateway_endpoint: String,

    /// Cluster that runs the load generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_generator_cluster: Option<String>,

    /// Clusters that run a mesh control plane.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_plane_clusters: Vec<String>,
}

/// A set of mock services that together imitate a service-oriented architecture.
///
/// Graphs are produced in one go by [`generate`](crate::generate::generate) or
/// [`decode`](crate::decode) and are not mutated afterwards. The `defaults` block of a decoded
/// document is consumed during decoding and not retained here.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ServiceGraph {
    /// Graph-wide settings.
    pub global: GlobalDefaults,
    /// All services, in generation or declaration order.
    pub services: Vec<Service>,
}

impl ServiceGraph {
    /// Returns a copy of the service named `service_name`.
    ///
    /// This is a linear scan over all services.
    pub fn find_service_by_name(&self, service_name: &str) -> Result<Service, LookupError> {
        self.services
            .iter()
            .find(|service| service.name == service_name)
            .cloned()
            .ok_or_else(|| LookupError::ServiceNotFound(service_name.to_owned()))
    }

    /// Returns the distinct names of all services that `service_name` calls, sorted by name.
    pub fn dependencies(&self, service_name: &str) -> Result<BTreeSet<String>, LookupError> {
        let service = self.find_service_by_name(service_name)?;
        Ok(service
            .script
            .requests()
            .into_iter()
            .map(|request| request.service_name.clone())
            .collect())
    }

    /// Returns all services that load is injected into.
    pub fn entrypoints(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(|service| service.is_entrypoint)
    }

    /// Encodes the graph as a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Encodes the graph as a YAML document.
    pub fn to_yaml(&self) -> Result<String, EncodeError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
