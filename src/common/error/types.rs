//! Unified error type for catalog ingestion.
//!
//! Only [`Error::PackageCorrupt`] (and the ambient I/O, configuration and sink
//! failures) abort a run. The sheet- and image-level variants are recovered by
//! the pipeline: they are logged, counted in the run report and never returned
//! from [`crate::ingest`].
use thiserror::Error;

/// Main error type for catalog ingestion.
#[derive(Error, Debug)]
pub enum Error {
    /// The workbook container cannot be opened as an archive
    #[error("Corrupted package: {0}")]
    PackageCorrupt(String),

    /// A sheet's image-resolution chain is malformed
    #[error("Image resolution failed for sheet {sheet}: {reason}")]
    SheetResolutionFailed { sheet: String, reason: String },

    /// A single image could not be written to the destination store
    #[error("Failed to persist image '{key}': {reason}")]
    ImagePersistFailed { key: String, reason: String },

    /// A sheet has no column that canonicalizes to the SKU key
    #[error("Sheet '{sheet}' has no SKU column")]
    MissingSkuColumn { sheet: String },

    /// A sheet's cell data could not be read
    #[error("Failed to read sheet '{sheet}': {reason}")]
    SheetReadFailed { sheet: String, reason: String },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence sink rejected a record
    #[error("Sink error: {0}")]
    Sink(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for catalog ingestion.
pub type Result<T> = std::result::Result<T, Error>;
