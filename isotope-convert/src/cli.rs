use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use isotope_graph::{ServiceTypeSelection, generate, seeded_sampler};
use isotope_types::ByteSize;

use crate::config::Config;
use crate::{observability, output};

/// Service graph generator for service mesh load tests.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    GenerateGraph(GenerateGraphCommand),
    Validate(ValidateCommand),
    Version(VersionCommand),
}

/// generate a random service graph document
///
/// The document is written as JSON if the output path ends in `.json`, and as YAML otherwise.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "generate-graph")]
struct GenerateGraphCommand {
    /// path of the document to write
    #[argh(positional)]
    output: PathBuf,

    /// number of services which will be created
    #[argh(option)]
    number_of_services: Option<usize>,

    /// height of each binary subtree
    #[argh(option)]
    subtree_height: Option<u32>,

    /// request size, in bytes or as a literal like `10KB`
    #[argh(option)]
    request_size: Option<ByteSize>,

    /// response size, in bytes or as a literal like `100KB`
    #[argh(option)]
    response_size: Option<ByteSize>,

    /// comma separated list of cluster contexts
    #[argh(option)]
    cluster_list: Option<String>,

    /// address of the ingress gateway
    #[argh(option)]
    ingress_gateway_endpoint: Option<String>,

    /// protocol of generated services: `HTTP`, `gRPC` or `random`
    #[argh(option)]
    service_type: Option<ServiceTypeSelection>,

    /// seed for reproducible graphs
    #[argh(option)]
    seed: Option<u64>,
}

impl GenerateGraphCommand {
    /// Overrides configured values with the flags given on the command line.
    fn apply(&self, config: &mut Config) {
        let generator = &mut config.generator;

        if let Some(number_of_services) = self.number_of_services {
            generator.number_of_services = number_of_services;
        }
        if let Some(subtree_height) = self.subtree_height {
            generator.subtree_height = subtree_height;
        }
        if let Some(request_size) = self.request_size {
            generator.request_size = request_size;
        }
        if let Some(response_size) = self.response_size {
            generator.response_size = response_size;
        }
        if let Some(ref cluster_list) = self.cluster_list {
            generator.clusters = cluster_list.split(',').map(|c| c.trim().to_owned()).collect();
        }
        if let Some(ref endpoint) = self.ingress_gateway_endpoint {
            generator.ingress_gateway_endpoint = endpoint.clone();
        }
        if let Some(service_type) = self.service_type {
            generator.service_type = service_type;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// decode and validate a service graph document
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "validate")]
struct ValidateCommand {
    /// path of the JSON or YAML document to check
    #[argh(positional)]
    input: PathBuf,
}

/// print the isotope version
#[derive(Default, Debug, FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCommand {}

/// Parses the command line and executes the chosen command.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    // Special switch to just print the version and exit.
    if let Command::Version(_) = args.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())?;

    observability::init_tracing(&config);
    tracing::debug!(?config);

    match args.command {
        Command::GenerateGraph(command) => {
            command.apply(&mut config);
            generate_graph(&config, &command.output)
        }
        Command::Validate(ValidateCommand { input }) => validate(&input),
        Command::Version(VersionCommand {}) => unreachable!(),
    }
}

fn generate_graph(config: &Config, output: &std::path::Path) -> Result<()> {
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "generating service graph");

    let graph = generate(&config.generator, seeded_sampler(seed))
        .context("invalid generator configuration")?;
    output::write_graph(output, &graph)?;

    tracing::info!(
        services = graph.services.len(),
        path = %output.display(),
        "wrote service graph"
    );
    Ok(())
}

fn validate(input: &std::path::Path) -> Result<()> {
    let graph = output::read_graph(input)?;

    let entrypoints = graph.entrypoints().count();
    let requests: usize = graph
        .services
        .iter()
        .map(|service| service.script.requests().len())
        .sum();

    println!(
        "{}: {} services, {} entrypoints, {} requests",
        input.display(),
        graph.services.len(),
        entrypoints,
        requests
    );
    Ok(())
}
