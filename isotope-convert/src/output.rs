//! Reading and writing service graph documents on disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use isotope_graph::{ServiceGraph, decode};

/// Encoding of a service graph document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML, used for every file that does not end in `.json`.
    Yaml,
    /// JSON.
    Json,
}

impl DocumentFormat {
    /// Picks the format from the file extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Encodes `graph` and writes it to `path`, replacing any existing file.
pub fn write_graph(path: &Path, graph: &ServiceGraph) -> Result<()> {
    let document = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => graph.to_yaml()?,
        DocumentFormat::Json => graph.to_json()?,
    };

    fs::write(path, document)
        .with_context(|| format!("failed to write service graph to {}", path.display()))?;

    tracing::debug!(path = %path.display(), "wrote service graph");
    Ok(())
}

/// Reads and decodes the service graph document at `path`.
pub fn read_graph(path: &Path) -> Result<ServiceGraph> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read service graph from {}", path.display()))?;

    let graph = match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => decode::from_yaml(&document),
        DocumentFormat::Json => decode::from_json(&document),
    }
    .with_context(|| format!("failed to decode {}", path.display()))?;

    Ok(graph)
}
