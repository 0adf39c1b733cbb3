//! Report ingestion and timeline reconstruction.
//!
//! Discovers and loads comparison reports, parses each into a
//! [`ParsedReport`](trend_core::models::ParsedReport), and stitches the
//! batch into a single ordered [`Timeline`](timeline::Timeline).

pub mod analysis;
pub mod parser;
pub mod reader;
pub mod slim;
pub mod timeline;

pub use trend_core as core;

#[cfg(test)]
mod test_support;
