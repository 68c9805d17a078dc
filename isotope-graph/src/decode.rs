//! Decoding of service graph documents.
//!
//! A document may leave out any field of a service or request command. Missing values are taken
//! from the document's own `defaults` block, and if that block omits them as well, from fixed
//! fallbacks (`HTTP`, one replica, `0%` errors, zero-byte payloads, an empty script and no RBAC
//! policies).
//!
//! A request command without a `size` is sent with `defaults.requestSize`. The `requestSize` of
//! the service the command belongs to does not apply to its script.
//!
//! ```yaml
//! defaults:
//!   requestSize: 1KB
//!   numReplicas: 2
//! services:
//!   - name: frontend
//!     isEntrypoint: true
//!     script:
//!       - service: backend        # sent with 1KB
//!   - name: backend
//!     errorRate: 0.1%
//! ```
//!
//! Decoding is a pure function of its input. The resolved defaults are passed down explicitly to
//! every service and command, so any number of documents can be decoded in parallel.
//!
//! JSON documents may nest concurrent commands arbitrarily deep. YAML documents are limited by the
//! parser to 128 levels of nesting in total.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use isotope_types::{ByteSize, Percentage, ServiceType};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::error::{DecodeError, LiteralError, ValidationError};
use crate::graph::{GlobalDefaults, ServiceGraph};
use crate::script::{Command, ConcurrentCommand, RequestCommand, Script};
use crate::service::{DEFAULT_NUM_REPLICAS, Service};

/// Decodes and validates a JSON service graph document.
pub fn from_json(document: &str) -> Result<ServiceGraph, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_str(document);
    deserializer.disable_recursion_limit();

    let raw = RawServiceGraph::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    raw.into_graph()
}

/// Decodes and validates a YAML service graph document.
pub fn from_yaml(document: &str) -> Result<ServiceGraph, DecodeError> {
    let raw: RawServiceGraph = serde_yaml::from_str(document)?;
    raw.into_graph()
}

/// Checks the invariants of a fully constructed graph.
///
/// Service names must be non-empty and unique, and every [`RequestCommand`] must target a service
/// of the same graph.
pub fn validate(graph: &ServiceGraph) -> Result<(), ValidationError> {
    let mut names = HashSet::with_capacity(graph.services.len());
    for service in &graph.services {
        if service.name.is_empty() {
            return Err(ValidationError::EmptyServiceName);
        }
        if !names.insert(service.name.as_str()) {
            return Err(ValidationError::DuplicateService(service.name.clone()));
        }
    }

    for service in &graph.services {
        for request in service.script.requests() {
            if !names.contains(request.service_name.as_str()) {
                return Err(ValidationError::UnknownServiceReference {
                    service: service.name.clone(),
                    target: request.service_name.clone(),
                });
            }
        }
    }

    Ok(())
}

impl<'de> Deserialize<'de> for ServiceGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawServiceGraph::deserialize(deserializer)?
            .into_graph()
            .map_err(de::Error::custom)
    }
}

/// The document as written, before defaults are applied.
#[derive(Debug, Deserialize)]
struct RawServiceGraph {
    #[serde(default)]
    global: GlobalDefaults,
    #[serde(default)]
    defaults: RawDefaults,
    #[serde(default)]
    services: Vec<RawService>,
}

impl RawServiceGraph {
    fn into_graph(self) -> Result<ServiceGraph, DecodeError> {
        let defaults = Defaults::resolve(self.defaults)?;
        let services = self
            .services
            .into_iter()
            .map(|service| service.resolve(&defaults))
            .collect::<Result<Vec<_>, _>>()?;

        let graph = ServiceGraph {
            global: self.global,
            services,
        };
        validate(&graph)?;

        tracing::debug!(services = graph.services.len(), "decoded service graph");
        Ok(graph)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDefaults {
    #[serde(rename = "type")]
    service_type: Option<ServiceType>,
    error_rate: Option<RawLiteral>,
    response_size: Option<RawLiteral>,
    script: Option<Vec<RawCommand>>,
    request_size: Option<RawLiteral>,
    num_replicas: Option<u32>,
    num_rbac_policies: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawService {
    name: String,
    #[serde(rename = "type")]
    service_type: Option<ServiceType>,
    num_replicas: Option<u32>,
    error_rate: Option<RawLiteral>,
    response_size: Option<RawLiteral>,
    request_size: Option<RawLiteral>,
    script: Option<Vec<RawCommand>>,
    cluster_context: Option<String>,
    is_entrypoint: Option<bool>,
    num_rbac_policies: Option<u32>,
}

/// Document-scoped fallbacks for every service and command.
///
/// The script is kept in its raw form, so that malformed literals in it are reported for the
/// service inheriting it.
#[derive(Debug)]
struct Defaults {
    service_type: ServiceType,
    error_rate: Percentage,
    response_size: ByteSize,
    script: Vec<RawCommand>,
    request_size: ByteSize,
    num_replicas: u32,
    num_rbac_policies: u32,
}

impl Defaults {
    fn resolve(raw: RawDefaults) -> Result<Self, DecodeError> {
        let context = || "defaults".to_owned();

        Ok(Self {
            service_type: raw.service_type.unwrap_or_default(),
            error_rate: parse_or(raw.error_rate, "errorRate", context, Percentage::ZERO)?,
            response_size: parse_or(raw.response_size, "responseSize", context, ByteSize::ZERO)?,
            script: raw.script.unwrap_or_default(),
            request_size: parse_or(raw.request_size, "requestSize", context, ByteSize::ZERO)?,
            num_replicas: raw.num_replicas.unwrap_or(DEFAULT_NUM_REPLICAS),
            num_rbac_policies: raw.num_rbac_policies.unwrap_or(0),
        })
    }
}

impl RawService {
    fn resolve(self, defaults: &Defaults) -> Result<Service, DecodeError> {
        let name = self.name;
        let context = || format!("service {name:?}");

        let error_rate = parse_or(self.error_rate, "errorRate", context, defaults.error_rate)?;
        let response_size = parse_or(
            self.response_size,
            "responseSize",
            context,
            defaults.response_size,
        )?;
        let request_size = parse_or(
            self.request_size,
            "requestSize",
            context,
            defaults.request_size,
        )?;

        let raw_script = self.script.as_deref().unwrap_or(&defaults.script);
        let script = raw_script
            .iter()
            .map(|command| command.resolve(defaults.request_size, &name))
            .collect::<Result<Script, _>>()?;

        Ok(Service {
            service_type: self.service_type.unwrap_or(defaults.service_type),
            num_replicas: self.num_replicas.unwrap_or(defaults.num_replicas),
            error_rate,
            response_size,
            request_size,
            script,
            cluster_context: self.cluster_context.unwrap_or_default(),
            is_entrypoint: self.is_entrypoint.unwrap_or(false),
            num_rbac_policies: self.num_rbac_policies.unwrap_or(defaults.num_rbac_policies),
            name,
        })
    }
}

/// A command as written: either a request object or a nested list of commands.
#[derive(Debug)]
enum RawCommand {
    Request(RawRequest),
    Concurrent(Vec<RawCommand>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequest {
    service: String,
    #[serde(default)]
    size: Option<RawLiteral>,
}

impl RawCommand {
    fn resolve(&self, request_size: ByteSize, service_name: &str) -> Result<Command, DecodeError> {
        match self {
            RawCommand::Request(request) => {
                let context = || format!("script of service {service_name:?}");
                let size = parse_or(request.size.clone(), "size", context, request_size)?;
                Ok(RequestCommand::new(request.service.clone(), size).into())
            }
            RawCommand::Concurrent(commands) => {
                let commands = commands
                    .iter()
                    .map(|command| command.resolve(request_size, service_name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ConcurrentCommand(commands).into())
            }
        }
    }
}

struct RawCommandVisitor;

impl<'de> Visitor<'de> for RawCommandVisitor {
    type Value = RawCommand;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a request `{service, size}` or a list of concurrent commands")
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        RawRequest::deserialize(de::value::MapAccessDeserializer::new(map)).map(RawCommand::Request)
    }

    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        Vec::deserialize(de::value::SeqAccessDeserializer::new(seq)).map(RawCommand::Concurrent)
    }
}

impl<'de> Deserialize<'de> for RawCommand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawCommandVisitor)
    }
}

/// The unparsed text of a size or percentage.
///
/// Literals are parsed after structural decoding so that grammar errors can be reported with the
/// field and service they belong to. Bare numbers are accepted and parsed from their decimal form.
#[derive(Clone, Debug)]
struct RawLiteral(String);

struct RawLiteralVisitor;

impl Visitor<'_> for RawLiteralVisitor {
    type Value = RawLiteral;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a literal such as `10KB` or `1%`")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawLiteral(v.to_owned()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawLiteral(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawLiteral(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RawLiteral(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for RawLiteral {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RawLiteralVisitor)
    }
}

fn parse_or<T, C>(
    literal: Option<RawLiteral>,
    field: &'static str,
    context: C,
    fallback: T,
) -> Result<T, DecodeError>
where
    T: FromStr,
    T::Err: Into<LiteralError>,
    C: FnOnce() -> String,
{
    match literal {
        None => Ok(fallback),
        Some(RawLiteral(text)) => text
            .parse()
            .map_err(|err: T::Err| DecodeError::MalformedLiteral {
                field,
                context: context(),
                source: err.into(),
            }),
    }
}
