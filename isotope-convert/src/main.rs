//! The `isotope` binary.
//!
//! Generates random service graph topologies for mesh load tests, and validates hand-written
//! service graph documents.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use anyhow::Result;

fn main() -> Result<()> {
    isotope_convert::cli::execute()
}
