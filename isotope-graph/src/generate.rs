//! Generation of random service graph topologies.
//!
//! The services are split into consecutive subtrees, each a complete binary tree of a configured
//! height. Nodes are numbered in heap order, so node `i` has children `2i + 1` and `2i + 2`:
//!
//! ```text
//!             s0                 level 0
//!         /        \
//!       s1          s2           level 1
//!      /  \        /  \
//!    s3 .. s6    s3 .. s6        level 2 (leaves)
//! ```
//!
//! Nodes above the second-to-last level call their two children. Nodes on the second-to-last
//! level call *every* leaf of their subtree. Leaves make no calls. The last subtree is cut short
//! when the remaining number of services does not fill it.
//!
//! All randomness comes from an injected sampler `FnMut(Range<usize>) -> usize`, so tests can
//! pin every decision. [`seeded_sampler`] provides the production implementation.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use isotope_types::{ByteSize, Percentage, ServiceType};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::GenerateError;
use crate::graph::{GlobalDefaults, ServiceGraph};
use crate::script::{ConcurrentCommand, RequestCommand, Script};
use crate::service::Service;

/// Replica count assigned to every generated service unless configured otherwise.
pub const DEFAULT_GENERATED_REPLICAS: u32 = 6;

/// How the protocol of generated services is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceTypeSelection {
    /// Every service speaks the same protocol.
    Fixed(ServiceType),
    /// Each service draws its protocol uniformly from [`ServiceType::ALL`].
    Random,
}

impl Default for ServiceTypeSelection {
    fn default() -> Self {
        ServiceTypeSelection::Fixed(ServiceType::Http)
    }
}

impl fmt::Display for ServiceTypeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceTypeSelection::Fixed(service_type) => fmt::Display::fmt(service_type, f),
            ServiceTypeSelection::Random => f.write_str("random"),
        }
    }
}

impl FromStr for ServiceTypeSelection {
    type Err = isotope_types::svctype::ParseServiceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("random") {
            return Ok(ServiceTypeSelection::Random);
        }
        s.parse().map(ServiceTypeSelection::Fixed)
    }
}

impl Serialize for ServiceTypeSelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceTypeSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Parameters of a generated topology.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Total number of services in the graph.
    pub number_of_services: usize,

    /// Height of each binary subtree. A height of `0` yields disconnected single services.
    pub subtree_height: u32,

    /// Payload size of every generated request.
    pub request_size: ByteSize,

    /// Payload size of every service's response.
    pub response_size: ByteSize,

    /// Clusters to place services on. Must not be empty.
    pub clusters: Vec<String>,

    /// Address of the ingress gateway, recorded in the graph's globals.
    pub ingress_gateway_endpoint: String,

    /// Protocol selection for generated services.
    pub service_type: ServiceTypeSelection,

    /// Number of replicas of every generated service.
    pub num_replicas: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            number_of_services: 0,
            subtree_height: 5,
            request_size: ByteSize::from_bytes(10_000),
            response_size: ByteSize::from_bytes(100_000),
            clusters: Vec::new(),
            ingress_gateway_endpoint: String::new(),
            service_type: ServiceTypeSelection::default(),
            num_replicas: DEFAULT_GENERATED_REPLICAS,
        }
    }
}

/// Returns a uniform sampler over half-open ranges, seeded for reproducible output.
pub fn seeded_sampler(seed: u64) -> impl FnMut(Range<usize>) -> usize {
    let mut rng = SmallRng::seed_from_u64(seed);
    move |range| rng.random_range(range)
}

/// Generates a service graph with exactly `config.number_of_services` services.
///
/// Services are named `s0`, `s1`, ... in generation order. The first service of every subtree is
/// an entrypoint. Clusters are drawn independently for every service and once more for the load
/// generator, using `random`.
pub fn generate<R>(config: &GeneratorConfig, mut random: R) -> Result<ServiceGraph, GenerateError>
where
    R: FnMut(Range<usize>) -> usize,
{
    if config.clusters.is_empty() {
        return Err(GenerateError::EmptyClusterList);
    }
    if let Some(position) = config.clusters.iter().position(|c| c.is_empty()) {
        return Err(GenerateError::EmptyClusterLabel(position));
    }

    let global = GlobalDefaults {
        ingress_gateway_endpoint: config.ingress_gateway_endpoint.clone(),
        load_generator_cluster: Some(sample(&config.clusters, &mut random)?.clone()),
        control_plane_clusters: Vec::new(),
    };

    let total = config.number_of_services;
    let capacity = subtree_capacity(config.subtree_height);
    let mut services = Vec::with_capacity(total);

    let mut offset = 0;
    while offset < total {
        let len = capacity.min(total - offset);
        tracing::trace!(offset, len, "generating subtree");

        for node in 0..len {
            let service_type = match config.service_type {
                ServiceTypeSelection::Fixed(service_type) => service_type,
                ServiceTypeSelection::Random => *sample(&ServiceType::ALL, &mut random)?,
            };

            services.push(Service {
                name: service_name(offset + node),
                service_type,
                num_replicas: config.num_replicas,
                error_rate: Percentage::ZERO,
                response_size: config.response_size,
                request_size: config.request_size,
                script: subtree_script(node, len, offset, config.request_size),
                cluster_context: sample(&config.clusters, &mut random)?.clone(),
                is_entrypoint: node == 0,
                num_rbac_policies: 0,
            });
        }

        offset += len;
    }

    tracing::debug!(
        services = services.len(),
        subtree_height = config.subtree_height,
        "generated service graph"
    );

    Ok(ServiceGraph { global, services })
}

fn service_name(index: usize) -> String {
    format!("s{index}")
}

fn sample<'a, T, R>(items: &'a [T], random: &mut R) -> Result<&'a T, GenerateError>
where
    R: FnMut(Range<usize>) -> usize,
{
    let index = random(0..items.len());
    items.get(index).ok_or(GenerateError::SampleOutOfRange {
        index,
        len: items.len(),
    })
}

/// Number of nodes in a complete binary tree of the given height, saturating at `usize::MAX`.
fn subtree_capacity(height: u32) -> usize {
    1usize
        .checked_shl(height.saturating_add(1))
        .map_or(usize::MAX, |nodes| nodes - 1)
}

/// Level of a heap-ordered node, with the root at level `0`.
fn level(node: usize) -> u32 {
    // `node + 1` cannot overflow, since node indices are below the subtree length.
    (node + 1).ilog2()
}

/// Node indices on `level` that exist in a subtree of `len` nodes.
fn level_nodes(level: u32, len: usize) -> Range<usize> {
    let first = (1usize << level) - 1;
    let end = 1usize
        .checked_shl(level + 1)
        .map_or(usize::MAX, |nodes| nodes - 1);
    first..end.min(len)
}

/// In-subtree indices of the nodes that `node` calls.
fn fan_out(node: usize, len: usize) -> Vec<usize> {
    let height = level(len - 1);
    let node_level = level(node);

    if node_level + 1 == height {
        level_nodes(height, len).collect()
    } else if node_level + 1 < height {
        [2 * node + 1, 2 * node + 2]
            .into_iter()
            .filter(|&child| child < len)
            .collect()
    } else {
        Vec::new()
    }
}

fn subtree_script(node: usize, len: usize, offset: usize, size: ByteSize) -> Script {
    let targets = fan_out(node, len);
    if targets.is_empty() {
        return Script::default();
    }

    let calls = targets
        .into_iter()
        .map(|target| RequestCommand::new(service_name(offset + target), size).into())
        .collect();

    Script(vec![ConcurrentCommand(calls).into()])
}
