//! Row normalization: from sheet rows to keyed, storage-safe product rows.
//!
//! Column names are canonicalized (trimmed, lower-cased, spaces to `_`, `#`
//! to `number`) and every SKU alias is folded into the configured SKU key.
//! Each produced [`RawRow`] carries its visible row number, so it joins
//! directly against the resolver's row→image map.

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::value::{CellValue, normalize_cell};
use crate::common::{Error, IngestConfig, Result};
use crate::ooxml::xlsx::{DateSystem, SheetRow};

/// One data row of a sheet, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub sheet_name: String,
    /// Visible (1-based) row number; the first data row below a header in
    /// row 1 is row 2
    pub row_number: u32,
    /// Trimmed, non-empty record key
    pub sku: String,
    /// Canonical column name → value, in column order
    pub fields: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn field(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Canonicalize a header text. Blank headers yield an empty string.
pub fn canonicalize_column(name: &str, config: &IngestConfig) -> String {
    let canonical = name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('#', "number");

    if config.is_sku_alias(&canonical) {
        config.sku_column.clone()
    } else {
        canonical
    }
}

/// Canonical column names of one sheet, by 1-based column.
#[derive(Debug, Clone, Default)]
pub struct SheetColumns {
    names: Vec<(u32, String)>,
    sku_column: Option<u32>,
}

impl SheetColumns {
    /// Build the column map from the header row.
    ///
    /// Blank header cells are named `unnamed_<n>` (0-based column position);
    /// repeated names get a `_<k>` suffix. The first column named after the
    /// SKU key is the SKU column.
    pub fn from_header(header: Option<&SheetRow>, config: &IngestConfig) -> Self {
        let mut columns = Self::default();
        let Some(header) = header else {
            return columns;
        };

        let last = header.cells.iter().map(|(col, _)| *col).max().unwrap_or(0);
        let mut seen = HashSet::new();

        for col in 1..=last {
            let text = header
                .cell(col)
                .map(|cell| normalize_cell(cell, DateSystem::default()).to_string())
                .unwrap_or_default();

            let mut name = canonicalize_column(&text, config);
            if name.is_empty() {
                name = unnamed(col);
            }

            if seen.contains(&name) {
                let mut k = 1;
                while seen.contains(&format!("{}_{}", name, k)) {
                    k += 1;
                }
                name = format!("{}_{}", name, k);
            } else if name == config.sku_column {
                columns.sku_column = Some(col);
            }

            seen.insert(name.clone());
            columns.names.push((col, name));
        }

        columns
    }

    /// Canonical name of a 1-based column.
    pub fn name(&self, col: u32) -> Option<&str> {
        self.names
            .iter()
            .find(|(c, _)| *c == col)
            .map(|(_, name)| name.as_str())
    }

    #[inline]
    pub fn sku_column(&self) -> Option<u32> {
        self.sku_column
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn unnamed(col: u32) -> String {
    format!("unnamed_{}", col.saturating_sub(1))
}

/// Normalize the rows of one sheet.
///
/// Rows above and at the header are not data. Fully blank rows and rows
/// whose SKU is blank are dropped.
///
/// # Errors
/// Returns [`Error::MissingSkuColumn`] when no header column maps to the
/// SKU key.
pub fn normalize_sheet(
    sheet_name: &str,
    rows: &[SheetRow],
    date_system: DateSystem,
    config: &IngestConfig,
) -> Result<Vec<RawRow>> {
    let header = rows.iter().find(|row| row.row == config.header_row);
    let columns = SheetColumns::from_header(header, config);
    let Some(sku_column) = columns.sku_column() else {
        return Err(Error::MissingSkuColumn {
            sheet: sheet_name.to_string(),
        });
    };

    let mut normalized = Vec::new();

    for row in rows.iter().filter(|row| row.row > config.header_row) {
        let mut fields: Vec<(String, CellValue)> = columns
            .names
            .iter()
            .map(|(col, name)| {
                let value = row
                    .cell(*col)
                    .map_or(CellValue::Null, |cell| normalize_cell(cell, date_system));
                (name.clone(), value)
            })
            .collect();

        // Cells to the right of the header
        for (col, cell) in &row.cells {
            if columns.name(*col).is_none() {
                fields.push((unnamed(*col), normalize_cell(cell, date_system)));
            }
        }

        if fields.iter().all(|(_, value)| value.is_null()) {
            continue;
        }

        let sku = fields
            .iter()
            .find(|(name, _)| name == &config.sku_column)
            .and_then(|(_, value)| value.as_key());
        let Some(sku) = sku else {
            debug!(sheet = sheet_name, row = row.row, column = sku_column, "skipping row without SKU");
            continue;
        };

        fields.retain(|(name, _)| !config.is_ignored_column(name));

        normalized.push(RawRow {
            sheet_name: sheet_name.to_string(),
            row_number: row.row,
            sku,
            fields,
        });
    }

    Ok(normalized)
}
