//! Office Open XML (OOXML) support for spreadsheet packages.
//!
//! # Architecture
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): unpacking, part names and relationships
//! 2. **SpreadsheetML** (`xlsx`): workbook structure, sheets, strings, styles
//! 3. **DrawingML** (`drawings`): picture anchors inside drawing parts
pub mod drawings;
pub mod opc;
pub mod xlsx;

// Re-export commonly used types from OPC layer
pub use opc::{PackURI, PackageTree};
