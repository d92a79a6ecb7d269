//! SKU consolidation: folds normalized rows from every sheet into one record
//! per SKU.
//!
//! The index is an arena of records plus a SKU → slot map, owned by a single
//! folder. Conflict policy:
//!
//! - fields: the first row seen for a SKU wins; later rows never overwrite
//! - `sheet_names`: union in first-seen order
//! - `images`: appended in fold order

use std::collections::HashMap;
use std::path::PathBuf;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::catalog::materialize::{Materializer, slugify};
use crate::catalog::normalize::RawRow;
use crate::catalog::value::CellValue;

/// Record keys that are not copied from sheet columns.
pub const RESERVED_FIELDS: [&str; 2] = ["sheet_names", "images"];

/// One consolidated product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    sku: String,
    fields: Vec<(String, CellValue)>,
    sheet_names: Vec<String>,
    images: Vec<String>,
}

impl ProductRecord {
    fn first_sighting(row: RawRow) -> Self {
        let fields = row
            .fields
            .into_iter()
            .filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
            .collect();

        Self {
            sku: row.sku,
            fields,
            sheet_names: vec![row.sheet_name],
            images: Vec::new(),
        }
    }

    /// Record key (trimmed, non-empty).
    #[inline]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Column fields in column order, nulls included.
    #[inline]
    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[inline]
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    #[inline]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// The record as a flat JSON object without null fields.
    pub fn to_sink_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.fields {
            if value.is_null() {
                continue;
            }
            if let Ok(json) = serde_json::to_value(value) {
                map.insert(name.clone(), json);
            }
        }
        map.insert("sheet_names".to_string(), self.sheet_names.clone().into());
        map.insert("images".to_string(), self.images.clone().into());
        map
    }
}

impl Serialize for ProductRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("sheet_names", &self.sheet_names)?;
        map.serialize_entry("images", &self.images)?;
        map.end()
    }
}

/// Arena of product records keyed by SKU, in first-sighting order.
#[derive(Debug, Default)]
pub struct SkuIndex {
    records: Vec<ProductRecord>,
    slots: HashMap<String, usize>,
}

impl SkuIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row and its already persisted image references.
    pub fn fold(&mut self, row: RawRow, images: Vec<String>) {
        let record = match self.slots.get(&row.sku) {
            Some(&slot) => {
                let record = &mut self.records[slot];
                if !record.sheet_names.contains(&row.sheet_name) {
                    record.sheet_names.push(row.sheet_name);
                }
                record
            },
            None => {
                let slot = self.records.len();
                self.slots.insert(row.sku.clone(), slot);
                self.records.push(ProductRecord::first_sighting(row));
                &mut self.records[slot]
            },
        };
        record.images.extend(images);
    }

    /// Fold one row, materializing the media files resolved for it.
    ///
    /// Image names continue from the number of images the record already
    /// holds.
    pub fn fold_with_media(&mut self, row: RawRow, media: &[PathBuf], materializer: &mut Materializer<'_>) {
        let images = if media.is_empty() {
            Vec::new()
        } else {
            let attached = self.get(&row.sku).map_or(0, |record| record.images.len());
            materializer.materialize(&slugify(&row.sku), attached, media)
        };
        self.fold(row, images);
    }

    pub fn get(&self, sku: &str) -> Option<&ProductRecord> {
        self.slots.get(sku).map(|&slot| &self.records[slot])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}
