//! End-to-end ingestion run.
//!
//! The package is unpacked once; its tree is read-only from then on. Each
//! sheet is read, normalized and resolved independently (on the rayon pool
//! when configured), and the per-sheet results are then folded into the SKU
//! index by a single owner in workbook order.

use std::path::Path;

use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::catalog::consolidate::{ProductRecord, SkuIndex};
use crate::catalog::materialize::{ImageStore, Materializer};
use crate::catalog::normalize::{RawRow, normalize_sheet};
use crate::catalog::report::IngestReport;
use crate::catalog::resolver::{self, RowImages};
use crate::catalog::sink::CatalogSink;
use crate::common::{Error, IngestConfig, Result};
use crate::ooxml::opc::constants::part_name;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::{PackURI, PackageTree};
use crate::ooxml::xlsx::{SharedStrings, SheetRow, Styles, Workbook, WorksheetInfo, read_sheet_rows};

/// Result of one ingestion run.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<ProductRecord>,
    report: IngestReport,
}

impl Catalog {
    /// Records in first-sighting order.
    #[inline]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn get(&self, sku: &str) -> Option<&ProductRecord> {
        self.records.iter().find(|record| record.sku() == sku)
    }

    #[inline]
    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(sku, fields)` pairs with null fields stripped.
    pub fn records_for_sink(&self) -> impl Iterator<Item = (&str, Map<String, Value>)> {
        self.records
            .iter()
            .map(|record| (record.sku(), record.to_sink_fields()))
    }

    /// Hand every record to a sink and finish it.
    pub fn write_to(&self, sink: &mut dyn CatalogSink) -> Result<()> {
        for (sku, fields) in self.records_for_sink() {
            sink.put(sku, fields)?;
        }
        sink.finish()
    }
}

/// Workbook-wide parts every sheet reader needs.
struct WorkbookParts {
    workbook: Workbook,
    shared_strings: SharedStrings,
    styles: Styles,
}

impl WorkbookParts {
    fn read(tree: &PackageTree) -> Result<Self> {
        let workbook = Workbook::read(tree).map_err(|e| match e {
            OpcError::PartNotFound(part) => Error::PackageCorrupt(format!("missing workbook part {}", part)),
            other => Error::PackageCorrupt(other.to_string()),
        })?;

        let shared_strings = match read_optional(tree, part_name::SHARED_STRINGS)? {
            Some(xml) => SharedStrings::parse(&xml),
            None => Ok(SharedStrings::new()),
        }
        .map_err(|e| Error::PackageCorrupt(format!("shared strings: {}", e)))?;

        let styles = match read_optional(tree, part_name::STYLES)? {
            Some(xml) => Styles::parse(&xml),
            None => Ok(Styles::new()),
        }
        .map_err(|e| Error::PackageCorrupt(format!("styles: {}", e)))?;

        Ok(Self {
            workbook,
            shared_strings,
            styles,
        })
    }
}

fn read_optional(tree: &PackageTree, part: &str) -> Result<Option<Vec<u8>>> {
    let uri = PackURI::new(part).map_err(Error::PackageCorrupt)?;
    Ok(tree.read_part(&uri)?)
}

/// Independent output of one sheet, ready to be folded.
struct SheetOutput {
    name: String,
    rows: Result<Vec<RawRow>>,
    images: Result<RowImages>,
}

fn read_rows(tree: &PackageTree, parts: &WorkbookParts, sheet: &WorksheetInfo) -> Result<Vec<SheetRow>> {
    let read_failed = |reason: String| Error::SheetReadFailed {
        sheet: sheet.name.clone(),
        reason,
    };

    let part = parts
        .workbook
        .sheet_part(tree, sheet.index)
        .map_err(|e| read_failed(e.to_string()))?
        .ok_or_else(|| read_failed("not a worksheet".to_string()))?;
    let xml = tree
        .read_part(&part)
        .map_err(|e| read_failed(e.to_string()))?
        .ok_or_else(|| read_failed(format!("part {} not found", part)))?;

    read_sheet_rows(&xml, &parts.shared_strings, &parts.styles).map_err(|e| read_failed(e.to_string()))
}

fn produce_sheet(tree: &PackageTree, parts: &WorkbookParts, sheet: &WorksheetInfo, config: &IngestConfig) -> SheetOutput {
    let rows = read_rows(tree, parts, sheet).and_then(|rows| {
        normalize_sheet(&sheet.name, &rows, parts.workbook.date_system(), config)
    });

    // Images of a skipped sheet would have no rows to attach to
    let images = match &rows {
        Ok(_) => resolver::resolve(tree, &parts.workbook, sheet.index),
        Err(_) => Ok(RowImages::new()),
    };

    SheetOutput {
        name: sheet.name.clone(),
        rows,
        images,
    }
}

/// Ingest a workbook file.
///
/// The workbook is unpacked into `config.scratch_dir` (or a temporary
/// directory), which is removed again before returning, on success or error.
///
/// # Errors
/// Only fatal conditions are returned: [`Error::PackageCorrupt`], an invalid
/// configuration, or an unusable scratch directory. Sheet- and image-level
/// failures are logged and counted in the [`IngestReport`].
pub fn ingest<P: AsRef<Path>>(workbook_path: P, config: &IngestConfig, store: &dyn ImageStore) -> Result<Catalog> {
    config.validate()?;
    let workbook_path = workbook_path.as_ref();
    info!(workbook = %workbook_path.display(), "ingesting workbook");

    let tree = match &config.scratch_dir {
        Some(dir) => PackageTree::unpack_into(workbook_path, dir)?,
        None => PackageTree::unpack(workbook_path)?,
    };
    ingest_tree(&tree, config, store)
}

/// Ingest an already unpacked package.
pub fn ingest_tree(tree: &PackageTree, config: &IngestConfig, store: &dyn ImageStore) -> Result<Catalog> {
    let parts = WorkbookParts::read(tree)?;
    let sheets = parts.workbook.sheets();

    let produce = |sheet: &WorksheetInfo| produce_sheet(tree, &parts, sheet, config);
    let outputs: Vec<SheetOutput> = if config.parallel {
        sheets.par_iter().map(produce).collect()
    } else {
        sheets.iter().map(produce).collect()
    };

    let mut report = IngestReport {
        sheets_total: sheets.len(),
        ..IngestReport::default()
    };
    let mut index = SkuIndex::new();
    let mut materializer = Materializer::new(store, config);

    for output in outputs {
        let rows = match output.rows {
            Ok(rows) => rows,
            Err(e) => {
                warn!(sheet = %output.name, error = %e, "skipping sheet");
                report.sheets_skipped += 1;
                continue;
            },
        };
        let images = output.images.unwrap_or_else(|e| {
            warn!(sheet = %output.name, error = %e, "treating sheet as having no images");
            RowImages::new()
        });

        debug!(sheet = %output.name, rows = rows.len(), image_rows = images.len(), "folding sheet");
        for row in rows {
            let media = images.get(&row.row_number).map_or(&[][..], Vec::as_slice);
            index.fold_with_media(row, media, &mut materializer);
            report.rows_folded += 1;
        }
        report.sheets_processed += 1;
    }

    let stats = materializer.stats();
    report.unique_skus = index.len();
    report.images_persisted = stats.persisted;
    report.images_deduplicated = stats.deduplicated;
    report.images_skipped = stats.skipped;
    report.log();

    Ok(Catalog {
        records: index.into_records(),
        report,
    })
}
