//! Unified error types for catalog ingestion.
//!
//! This module provides a single error type for the whole crate; the package
//! layer keeps its own [`crate::ooxml::opc::error::OpcError`] and converts into it.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
