//! Product catalog ingestion.
//!
//! Turns the unpacked workbook into one [`ProductRecord`] per SKU:
//!
//! - `resolver`: which embedded images sit on which row
//! - `normalize`: sheet rows to keyed rows of storage-safe values
//! - `materialize`: naming, deduplicating and persisting images
//! - `consolidate`: the per-SKU fold
//! - `pipeline`: the run tying them together
//! - `sink`: handing records to persistence

pub mod consolidate;
pub mod materialize;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod sink;
pub mod value;

pub use consolidate::{ProductRecord, SkuIndex};
pub use materialize::{FsImageStore, ImageStore, Materializer, slugify};
pub use normalize::{RawRow, normalize_sheet};
pub use pipeline::{Catalog, ingest, ingest_tree};
pub use report::IngestReport;
pub use resolver::{RowImages, resolve};
pub use sink::{CatalogSink, JsonCatalogWriter};
pub use value::{CellValue, normalize_cell};
