//! catalog-ingest - consolidates spreadsheet product rows and their embedded
//! images into per-SKU catalog records.
//!
//! A workbook (.xlsx) is unpacked into a scratch tree, every sheet's rows are
//! normalized, the pictures anchored on each row are recovered from the
//! package's drawing parts, and rows sharing a SKU are folded into a single
//! record across all sheets.
//!
//! # Features
//!
//! - **Direct package reading**: sheets, shared strings, styles, drawings and
//!   relationships are parsed straight from the package parts
//! - **Row-accurate images**: multiple pictures on one row keep their order
//! - **Exact numbers**: fractional cells become base-10 decimals, never floats
//! - **Deduplicated media**: identical image bytes are persisted once per run
//!
//! # Example
//!
//! ```no_run
//! use catalog_ingest::{FsImageStore, IngestConfig, JsonCatalogWriter, ingest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngestConfig::default();
//! let store = FsImageStore::from_config(&config);
//!
//! let catalog = ingest("products.xlsx", &config, &store)?;
//! for record in catalog.records() {
//!     println!("{}: {} image(s)", record.sku(), record.images().len());
//! }
//!
//! let mut sink = JsonCatalogWriter::create("output/products.json")?;
//! catalog.write_to(&mut sink)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod common;
pub mod ooxml;

pub use catalog::{
    Catalog, CatalogSink, CellValue, FsImageStore, ImageStore, IngestReport, JsonCatalogWriter,
    ProductRecord, ingest,
};
pub use common::{Error, IngestConfig, Result};
