//! Configuration for the `isotope` binary.
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to
//! lowest):
//!
//! 1. Command line flags of the invoked subcommand
//! 2. Environment variables (prefixed with `ISOTOPE__`)
//! 3. YAML configuration file (specified via `-c` or `--config` flag)
//! 4. Defaults
//!
//! # Environment Variables
//!
//! Environment variables use `ISOTOPE__` as a prefix and double underscores (`__`) to denote
//! nested configuration structures. For example:
//!
//! - `ISOTOPE__LOGGING__LEVEL=debug` sets the log level
//! - `ISOTOPE__GENERATOR__NUMBER_OF_SERVICES=100` sets the size of generated graphs
//! - `ISOTOPE__GENERATOR__CLUSTERS=[east, west]` sets the clusters to place services on
//!
//! # YAML Configuration File
//!
//! The above configuration in YAML format would look like this:
//!
//! ```yaml
//! logging:
//!   level: debug
//!
//! generator:
//!   number_of_services: 100
//!   clusters: [east, west]
//! ```

use std::fmt;
use std::path::Path;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Yaml};
use isotope_graph::GeneratorConfig;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "ISOTOPE__";

/// Log output format.
///
/// Controls how log messages are formatted. The format can be explicitly specified or
/// auto-detected based on whether output is to a TTY.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    Pretty,

    /// Simplified plain text output.
    ///
    /// ```text
    /// 2020-12-04T12:10:32Z INFO isotope_convert::cli: wrote service graph
    /// ```
    Simplified,

    /// Dump out JSON lines.
    Json,
}

/// The logging format parse error.
#[derive(Clone, Debug)]
pub struct FormatParseError(String);

impl fmt::Display for FormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"error parsing "{}" as format: expected one of "auto", "pretty", "simplified", "json""#,
            self.0
        )
    }
}

impl std::str::FromStr for LogFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let result = match s {
            "" => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("auto") => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            s if s.eq_ignore_ascii_case("simplified") => LogFormat::Simplified,
            s if s.eq_ignore_ascii_case("json") => LogFormat::Json,
            s => return Err(FormatParseError(s.into())),
        };

        Ok(result)
    }
}

impl std::error::Error for FormatParseError {}

mod display_fromstr {
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: std::fmt::Display,
    {
        serializer.collect_str(&value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        use serde::Deserialize;
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logging configuration.
///
/// Logs are always written to stderr, so that documents printed to stdout stay clean.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Logging {
    /// Minimum log level to output.
    ///
    /// The `RUST_LOG` environment variable takes precedence and provides more granular control
    /// per module if needed.
    ///
    /// # Default
    ///
    /// `INFO`
    ///
    /// # Environment Variable
    ///
    /// `ISOTOPE__LOGGING__LEVEL`
    #[serde(with = "display_fromstr")]
    pub level: LevelFilter,

    /// Log output format.
    ///
    /// # Default
    ///
    /// `Auto` (pretty for TTY, simplified otherwise)
    ///
    /// # Environment Variable
    ///
    /// `ISOTOPE__LOGGING__FORMAT`
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Main configuration struct for the `isotope` binary.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub logging: Logging,

    /// Defaults for the `generate-graph` command.
    ///
    /// Every field can be overridden by the corresponding command line flag. Sizes accept plain
    /// byte counts or literals such as `10KB`.
    ///
    /// # Environment Variables
    ///
    /// - `ISOTOPE__GENERATOR__NUMBER_OF_SERVICES`
    /// - `ISOTOPE__GENERATOR__SUBTREE_HEIGHT`
    /// - `ISOTOPE__GENERATOR__REQUEST_SIZE`
    /// - `ISOTOPE__GENERATOR__RESPONSE_SIZE`
    /// - `ISOTOPE__GENERATOR__CLUSTERS`
    /// - `ISOTOPE__GENERATOR__INGRESS_GATEWAY_ENDPOINT`
    /// - `ISOTOPE__GENERATOR__SERVICE_TYPE`
    /// - `ISOTOPE__GENERATOR__NUM_REPLICAS`
    pub generator: GeneratorConfig,

    /// Seed for the random number generator used by `generate-graph`.
    ///
    /// # Default
    ///
    /// `None` (a random seed is chosen and logged)
    ///
    /// # Environment Variable
    ///
    /// `ISOTOPE__SEED`
    pub seed: Option<u64>,
}

impl Config {
    /// Loads configuration from the provided arguments.
    ///
    /// Configuration is merged in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. YAML configuration file (if provided in `path`)
    /// 3. Environment variables (prefixed with `ISOTOPE__`)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The YAML configuration file cannot be read or parsed
    /// - Environment variables contain invalid values
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use isotope_graph::{ServiceType, ServiceTypeSelection};
    use isotope_types::ByteSize;

    use super::*;

    #[test]
    fn uses_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load(None).unwrap();

            assert_eq!(config.logging.level, LevelFilter::INFO);
            assert_eq!(config.logging.format, LogFormat::Auto);
            assert_eq!(config.generator, GeneratorConfig::default());
            assert_eq!(config.generator.subtree_height, 5);
            assert_eq!(config.seed, None);

            Ok(())
        });
    }

    #[test]
    fn configurable_via_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ISOTOPE__LOGGING__LEVEL", "debug");
            jail.set_env("ISOTOPE__LOGGING__FORMAT", "json");
            jail.set_env("ISOTOPE__GENERATOR__NUMBER_OF_SERVICES", "100");
            jail.set_env("ISOTOPE__GENERATOR__REQUEST_SIZE", "2KB");
            jail.set_env("ISOTOPE__GENERATOR__RESPONSE_SIZE", "4096");
            jail.set_env("ISOTOPE__GENERATOR__CLUSTERS", "[east, west]");
            jail.set_env("ISOTOPE__GENERATOR__SERVICE_TYPE", "random");
            jail.set_env("ISOTOPE__SEED", "42");

            let config = Config::load(None).unwrap();

            assert_eq!(config.logging.level, LevelFilter::DEBUG);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(config.generator.number_of_services, 100);
            assert_eq!(config.generator.request_size, ByteSize::from_bytes(2000));
            assert_eq!(config.generator.response_size, ByteSize::from_bytes(4096));
            assert_eq!(config.generator.clusters, ["east", "west"]);
            assert_eq!(config.generator.service_type, ServiceTypeSelection::Random);
            assert_eq!(config.seed, Some(42));

            Ok(())
        });
    }

    #[test]
    fn configurable_via_yaml() {
        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(
                br#"
            logging:
                level: warn
            generator:
                number_of_services: 20
                subtree_height: 2
                clusters: [a, b, c]
                ingress_gateway_endpoint: 10.0.0.1
                service_type: gRPC
                num_replicas: 3
            "#,
            )
            .unwrap();

        figment::Jail::expect_with(|_jail| {
            let config = Config::load(Some(tempfile.path())).unwrap();

            assert_eq!(config.logging.level, LevelFilter::WARN);
            assert_eq!(config.generator.number_of_services, 20);
            assert_eq!(config.generator.subtree_height, 2);
            assert_eq!(config.generator.clusters, ["a", "b", "c"]);
            assert_eq!(config.generator.ingress_gateway_endpoint, "10.0.0.1");
            assert_eq!(
                config.generator.service_type,
                ServiceTypeSelection::Fixed(ServiceType::Grpc)
            );
            assert_eq!(config.generator.num_replicas, 3);
            assert_eq!(config.generator.request_size, ByteSize::from_bytes(10_000));

            Ok(())
        });
    }

    #[test]
    fn configured_with_env_and_yaml() {
        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(
                br#"
            generator:
                number_of_services: 20
                clusters: [a]
            "#,
            )
            .unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("ISOTOPE__GENERATOR__NUMBER_OF_SERVICES", "30");

            let config = Config::load(Some(tempfile.path())).unwrap();

            assert_eq!(config.generator.number_of_services, 30);
            assert_eq!(config.generator.clusters, ["a"]);

            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_sizes() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ISOTOPE__GENERATOR__REQUEST_SIZE", "lots");
            assert!(Config::load(None).is_err());
            Ok(())
        });
    }
}
