//! Command line front end for generating and validating service graph documents.
//!
//! The `isotope` binary wraps [`isotope_graph`] with configuration loading, logging and file
//! output. See [`config`] for the available settings.
#![warn(missing_debug_implementations)]

pub mod cli;
pub mod config;
pub mod observability;
pub mod output;
