//! Services: the nodes of a service graph.

use isotope_types::{ByteSize, Percentage, ServiceType};
use serde::Serialize;

use crate::script::Script;

/// Replica count of a service when neither the service nor the document defaults specify one.
pub const DEFAULT_NUM_REPLICAS: u32 = 1;

/// A single mock service in a [`ServiceGraph`](crate::ServiceGraph).
///
/// Services are identified by their [`name`](Self::name), which must be unique within a graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Unique name, used by [`RequestCommand`](crate::RequestCommand)s to address this service.
    pub name: String,

    /// The protocol the service speaks.
    #[serde(rename = "type")]
    pub service_type: ServiceType,

    /// Number of replicas to deploy.
    pub num_replicas: u32,

    /// Share of incoming requests that fail with an error.
    pub error_rate: Percentage,

    /// Size of the response payload.
    pub response_size: ByteSize,

    /// Default payload size of the requests in this service's script.
    pub request_size: ByteSize,

    /// Outbound calls made for every incoming request.
    pub script: Script,

    /// The cluster this service is deployed to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_context: String,

    /// Whether load is injected directly into this service.
    pub is_entrypoint: bool,

    /// Number of RBAC policies to attach to this service.
    pub num_rbac_policies: u32,
}

impl Service {
    /// Creates a service with the given name and fallback values for everything else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: String::new(),
            service_type: ServiceType::Http,
            num_replicas: DEFAULT_NUM_REPLICAS,
            error_rate: Percentage::ZERO,
            response_size: ByteSize::ZERO,
            request_size: ByteSize::ZERO,
            script: Script::default(),
            cluster_context: String::new(),
            is_entrypoint: false,
            num_rbac_policies: 0,
        }
    }
}
