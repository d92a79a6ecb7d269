//! Workbook-level package structure: which sheets exist, in which order, and
//! which part holds each of them.
//!
//! Sheet order and names come from `xl/workbook.xml`; the part behind each
//! sheet's `r:id` comes from the workbook's relationship part. Sheet indexes
//! are 1-based and follow workbook order.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::attr_local;
use crate::ooxml::opc::constants::{part_name, relationship_type};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::{PackURI, PackageTree};

// Performance: Pre-allocate typical capacity for worksheets
const INITIAL_SHEETS_CAPACITY: usize = 16;

/// Information about a worksheet declared by the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    /// 1-based position in workbook order
    pub index: usize,
    /// Sheet name as shown on its tab
    pub name: String,
    /// Relationship ID of the sheet part (r:id)
    pub relationship_id: Option<String>,
    /// Sheet ID (sheetId)
    pub sheet_id: Option<u32>,
}

/// Serial-number epoch used by the workbook's date cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    /// Day 1 is 1900-01-01 (with the historical 1900 leap-year bug)
    #[default]
    V1900,
    /// Day 0 is 1904-01-01
    V1904,
}

/// Parsed workbook structure.
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<WorksheetInfo>,
    date_system: DateSystem,
    part: Option<PackURI>,
}

impl Workbook {
    /// Read the workbook part of an unpacked package.
    ///
    /// # Errors
    /// Returns [`OpcError::PartNotFound`] when the package has no workbook
    /// part, and an XML error when it is malformed.
    pub fn read(tree: &PackageTree) -> Result<Self> {
        let part = PackURI::new(part_name::WORKBOOK).map_err(OpcError::InvalidPackUri)?;
        let content = tree.blob_for(&part)?;
        let mut workbook = parse_workbook_xml(&content)?;
        workbook.part = Some(part);
        Ok(workbook)
    }

    /// Declared sheets in workbook order.
    #[inline]
    pub fn sheets(&self) -> &[WorksheetInfo] {
        &self.sheets
    }

    #[inline]
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Locate the part of the sheet at a 1-based workbook index.
    ///
    /// Follows the workbook relationship of the sheet's `r:id`; when that
    /// relationship is missing, falls back to the conventional
    /// `/xl/worksheets/sheet<index>.xml`. Returns `None` for sheets that are
    /// not worksheets (chart sheets, dialog sheets). The returned part may
    /// still be absent from the tree.
    pub fn sheet_part(&self, tree: &PackageTree, index: usize) -> Result<Option<PackURI>> {
        let r_id = self
            .sheets
            .get(index.wrapping_sub(1))
            .and_then(|s| s.relationship_id.as_deref());

        if let Some(workbook_part) = &self.part
            && let Some(r_id) = r_id
            && let Some(rels) = tree.relationships_for(workbook_part)?
            && let Some(rel) = rels.get(r_id)
        {
            if rel.reltype() != relationship_type::WORKSHEET {
                return Ok(None);
            }
            if let Ok(target) = rel.target_partname() {
                return Ok(Some(target));
            }
        }

        Self::conventional_sheet_part(index).map(Some)
    }

    /// `/xl/worksheets/sheet<index>.xml`
    pub fn conventional_sheet_part(index: usize) -> Result<PackURI> {
        PackURI::new(format!("{}/sheet{}.xml", part_name::WORKSHEETS_DIR, index))
            .map_err(OpcError::InvalidPackUri)
    }
}

/// Parse workbook.xml content to extract sheet information and the date system.
pub fn parse_workbook_xml(content: &[u8]) -> Result<Workbook> {
    let mut sheets = Vec::with_capacity(INITIAL_SHEETS_CAPACITY);
    let mut date_system = DateSystem::V1900;

    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    let flag = attr_local(e, b"date1904").map_err(OpcError::XmlError)?;
                    if matches!(flag.as_deref(), Some("1") | Some("true")) {
                        date_system = DateSystem::V1904;
                    }
                },
                b"sheet" => {
                    if let Some(name) = attr_local(e, b"name").map_err(OpcError::XmlError)? {
                        let relationship_id = attr_local(e, b"id").map_err(OpcError::XmlError)?;
                        let sheet_id = attr_local(e, b"sheetId")
                            .map_err(OpcError::XmlError)?
                            .and_then(|v| atoi_simd::parse::<u32, false, false>(v.as_bytes()).ok());

                        sheets.push(WorksheetInfo {
                            index: sheets.len() + 1,
                            name,
                            relationship_id,
                            sheet_id,
                        });
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Workbook parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(Workbook {
        sheets,
        date_system,
        part: None,
    })
}
