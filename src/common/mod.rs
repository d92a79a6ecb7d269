//! Common types and utilities shared across the package readers and the
//! catalog pipeline.

// Submodule declarations
pub mod config;
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use config::IngestConfig;
pub use error::{Error, Result};
