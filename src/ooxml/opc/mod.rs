/// Open Packaging Conventions (OPC) support.
///
/// This module provides the parts of the OPC specification needed to walk a
/// SpreadsheetML package on disk:
///
/// - Unpacking the ZIP container into a scratch tree (`phys_pkg`)
/// - Part names and relative reference resolution (`packuri`)
/// - Relationship parts (`rel`)
///
/// # Performance Features
///
/// - Uses `quick-xml` for efficient XML parsing of relationship parts
/// - Uses `atoi_simd` for fast integer parsing of part indexes
/// - Uses hash maps for O(1) relationship lookups

pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use packuri::PackURI;
pub use phys_pkg::PackageTree;
pub use rel::{Relationship, Relationships};
