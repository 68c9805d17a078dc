//! The service graph model: synthetic services and the scripts of calls they make.
//!
//! A [`ServiceGraph`] is built in one of two ways:
//!
//!  - [`generate`](generate::generate) builds a randomized topology out of binary subtrees.
//!  - [`decode`] reads a JSON or YAML document, filling in every field the document leaves out
//!    from its `defaults` block, and validates that all calls target known services.
//!
//! Once built, a graph is plain value data. Consumers look services up by name and walk their
//! [`Script`]s to find outbound calls.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod decode;
pub mod error;
pub mod generate;
pub mod graph;
pub mod script;
pub mod service;

pub use isotope_types::{ByteSize, Percentage, ServiceType};

pub use crate::error::{DecodeError, EncodeError, GenerateError, LookupError, ValidationError};
pub use crate::generate::{GeneratorConfig, ServiceTypeSelection, generate, seeded_sampler};
pub use crate::graph::{GlobalDefaults, ServiceGraph};
pub use crate::script::{Command, ConcurrentCommand, RequestCommand, Script};
pub use crate::service::Service;
