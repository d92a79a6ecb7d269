//! SpreadsheetML (.xlsx) parts needed to read product sheets.
//!
//! This module reads the workbook structure and the cell contents of each
//! worksheet from an unpacked package:
//!
//! - `workbook`: sheet order, names, part locations and the date system
//! - `worksheet`: rows and cells of a sheet part, plus its drawing reference
//! - `shared_strings`: the shared strings table
//! - `styles`: which cell styles display numbers as dates
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_ingest::ooxml::opc::PackageTree;
//! use catalog_ingest::ooxml::xlsx::Workbook;
//!
//! let tree = PackageTree::unpack("products.xlsx")?;
//! let workbook = Workbook::read(&tree)?;
//!
//! for sheet in workbook.sheets() {
//!     println!("{}: {}", sheet.index, sheet.name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod shared_strings;
pub mod styles;
pub mod workbook;
pub mod worksheet;

pub use shared_strings::SharedStrings;
pub use styles::Styles;
pub use workbook::{DateSystem, Workbook, WorksheetInfo};
pub use worksheet::{RawCell, SheetRow, find_drawing_rel_id, read_sheet_rows, reference_to_coords};
