//! Reader for worksheet parts (sheet1.xml, sheet2.xml, etc.).
//!
//! Cells are read straight from the part's `<sheetData>` into [`RawCell`]
//! values that keep the stored representation: numbers stay in their textual
//! form so that later stages can build exact decimals from them, and the
//! number-format style is resolved only to the extent of "is this a date".
//!
//! The reader also exposes the sheet's `<drawing r:id>` reference, the first
//! hop from a sheet to its embedded pictures.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::xml::{TextBuffer, attr_local};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::ooxml::xlsx::styles::Styles;

/// Content of a cell as stored in the sheet part, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// No value
    Empty,
    /// Text from the shared strings table, an inline string or a formula result
    Text(String),
    /// Numeric value in its stored textual form
    Number {
        text: String,
        /// Whether the cell's number format displays it as a date/time
        date_style: bool,
    },
    /// Boolean value
    Bool(bool),
    /// ISO 8601 date/time stored as such (`t="d"`)
    IsoDate(String),
    /// Error value such as `#N/A`
    Error(String),
}

/// One `<row>` of a sheet with its non-empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// Visible (1-based) row number
    pub row: u32,
    /// (1-based column, cell) pairs in document order
    pub cells: Vec<(u32, RawCell)>,
}

impl SheetRow {
    /// Cell at a 1-based column, if present.
    pub fn cell(&self, column: u32) -> Option<&RawCell> {
        self.cells
            .iter()
            .find(|(col, _)| *col == column)
            .map(|(_, cell)| cell)
    }
}

/// Cell being assembled between `<c>` and `</c>`.
#[derive(Debug)]
struct PendingCell {
    column: u32,
    kind: Option<String>,
    style: usize,
    value: TextBuffer,
    inline: TextBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    InlineText,
}

/// Read every row of a worksheet part.
///
/// Rows and cells without an `r` attribute continue from the previous one.
/// Cells that hold no value are omitted.
pub fn read_sheet_rows(
    content: &[u8],
    shared_strings: &SharedStrings,
    styles: &Styles,
) -> Result<Vec<SheetRow>> {
    let mut rows = Vec::new();

    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();

    let mut current: Option<SheetRow> = None;
    let mut pending: Option<PendingCell> = None;
    let mut capture = Capture::None;
    let mut phonetic_depth = 0usize;
    let mut last_row = 0u32;
    let mut last_col = 0u32;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    let row = row_number(e, last_row)?;
                    current = Some(SheetRow {
                        row,
                        cells: Vec::new(),
                    });
                    last_row = row;
                    last_col = 0;
                },
                b"c" => {
                    pending = Some(start_cell(e, last_col)?);
                },
                b"v" if pending.is_some() => capture = Capture::Value,
                b"rPh" => phonetic_depth += 1,
                b"t" if pending.is_some() && phonetic_depth == 0 => capture = Capture::InlineText,
                _ => {},
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"row" => last_row = row_number(e, last_row)?,
                b"c" => last_col = start_cell(e, last_col)?.column,
                _ => {},
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    if let Some(row) = current.take()
                        && !row.cells.is_empty()
                    {
                        rows.push(row);
                    }
                },
                b"c" => {
                    if let Some(cell) = pending.take() {
                        last_col = cell.column;
                        let column = cell.column;
                        let value = finish_cell(cell, shared_strings, styles);
                        if value != RawCell::Empty
                            && let Some(row) = current.as_mut()
                        {
                            row.cells.push((column, value));
                        }
                    }
                },
                b"v" | b"t" => capture = Capture::None,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"sheetData" => break,
                _ => {},
            },
            Ok(Event::Text(ref e)) => {
                if let Some(target) = capture_target(&mut pending, capture) {
                    target.push_text(e).map_err(OpcError::XmlError)?;
                }
            },
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(target) = capture_target(&mut pending, capture) {
                    target.push_ref(e).map_err(OpcError::XmlError)?;
                }
            },
            Ok(Event::CData(ref e)) => {
                if let Some(target) = capture_target(&mut pending, capture) {
                    target.push_cdata(e).map_err(OpcError::XmlError)?;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Worksheet parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(rows)
}

/// Find the relationship ID of the sheet's drawing part (`<drawing r:id>`).
///
/// Returns `None` when the sheet has no drawing. Legacy VML drawings
/// (`<legacyDrawing>`, used for comments) are not picture drawings.
pub fn find_drawing_rel_id(content: &[u8]) -> Result<Option<String>> {
    // Performance: most sheets have no drawing at all; skip the XML pass
    if memchr::memmem::find(content, b"drawing").is_none() {
        return Ok(None);
    }

    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"drawing" =>
            {
                return attr_local(e, b"id").map_err(OpcError::XmlError);
            },
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(OpcError::XmlError(format!("Worksheet parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }
}

/// Last column of a worksheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// Convert an Excel reference (e.g., "B12") to (column, row), both 1-based.
///
/// Columns past `XFD` are rejected.
pub fn reference_to_coords(reference: &str) -> Option<(u32, u32)> {
    let bytes = reference.as_bytes();
    let col_str_end = bytes.iter().position(|b| b.is_ascii_digit())?;
    if col_str_end == 0 {
        return None;
    }

    // Convert column letters to number (A=1, B=2, ..., Z=26, AA=27, etc.)
    let mut col_num = 0u32;
    for &byte in &bytes[..col_str_end] {
        if !byte.is_ascii_alphabetic() {
            return None;
        }
        col_num = col_num
            .checked_mul(26)?
            .checked_add((byte.to_ascii_uppercase() - b'A' + 1) as u32)?;
        if col_num > MAX_COLUMN {
            return None;
        }
    }

    let row_num = atoi_simd::parse::<u32, false, false>(&bytes[col_str_end..]).ok()?;
    Some((col_num, row_num))
}

fn row_number(e: &BytesStart<'_>, last_row: u32) -> Result<u32> {
    let declared = attr_local(e, b"r")
        .map_err(OpcError::XmlError)?
        .and_then(|r| atoi_simd::parse::<u32, false, false>(r.as_bytes()).ok());
    Ok(declared.unwrap_or(last_row + 1))
}

fn start_cell(e: &BytesStart<'_>, last_col: u32) -> Result<PendingCell> {
    let mut column = None;
    let mut kind = None;
    let mut style = 0usize;

    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"r" => {
                column = reference_to_coords(&attr.unescape_value()?).map(|(col, _)| col);
            },
            b"t" => kind = Some(attr.unescape_value()?.into_owned()),
            b"s" => style = atoi_simd::parse::<usize, false, false>(&attr.value).unwrap_or(0),
            _ => {},
        }
    }

    Ok(PendingCell {
        column: column.unwrap_or(last_col + 1),
        kind,
        style,
        value: TextBuffer::new(),
        inline: TextBuffer::new(),
    })
}

fn capture_target(pending: &mut Option<PendingCell>, capture: Capture) -> Option<&mut TextBuffer> {
    let cell = pending.as_mut()?;
    match capture {
        Capture::Value => Some(&mut cell.value),
        Capture::InlineText => Some(&mut cell.inline),
        Capture::None => None,
    }
}

fn finish_cell(mut cell: PendingCell, shared_strings: &SharedStrings, styles: &Styles) -> RawCell {
    let value = cell.value.take();

    match cell.kind.as_deref() {
        Some("s") => atoi_simd::parse::<usize, false, false>(value.trim().as_bytes())
            .ok()
            .and_then(|idx| shared_strings.get(idx))
            .map_or(RawCell::Empty, |s| RawCell::Text(s.to_string())),
        Some("inlineStr") => RawCell::Text(cell.inline.take()),
        Some("str") => RawCell::Text(value),
        Some("b") => match value.trim() {
            "1" | "true" | "TRUE" => RawCell::Bool(true),
            "0" | "false" | "FALSE" => RawCell::Bool(false),
            _ => RawCell::Error(value),
        },
        Some("e") => RawCell::Error(value),
        Some("d") if !value.trim().is_empty() => RawCell::IsoDate(value.trim().to_string()),
        _ if !cell.inline.is_empty() => RawCell::Text(cell.inline.take()),
        _ if value.trim().is_empty() => RawCell::Empty,
        _ => RawCell::Number {
            text: value.trim().to_string(),
            date_style: styles.is_date_style(cell.style),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
           xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <dimension ref="A1:E4"/>
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="inlineStr"><is><t>Added</t></is></c></row>
    <row r="2"><c r="A2"><v>100</v></c><c r="B2" t="str"><f>UPPER("x")</f><v>X</v></c><c r="C2" s="1"><v>45292.5</v></c><c r="D2" t="b"><v>1</v></c></row>
    <row r="3" spans="1:4"><c r="A3" s="2"/><c r="B3"><v></v></c></row>
    <row r="5"><c r="A5"><v>12.5</v></c><c><v>1.5E-3</v></c><c r="E5" t="e"><v>#N/A</v></c></row>
  </sheetData>
  <drawing r:id="rId3"/>
  <legacyDrawing r:id="rId9"/>
</worksheet>"#;

    fn fixtures() -> (SharedStrings, Styles) {
        let sst = SharedStrings::parse(
            b"<sst><si><t>SKU #</t></si><si><t>Name</t></si></sst>",
        )
        .unwrap();
        let styles = Styles {
            cell_xf_formats: vec![0, 14, 0],
            ..Styles::default()
        };
        (sst, styles)
    }

    #[test]
    fn test_read_sheet_rows() {
        let (sst, styles) = fixtures();
        let rows = read_sheet_rows(SHEET.as_bytes(), &sst, &styles).unwrap();

        // Row 3 holds no values and is dropped
        let numbers: Vec<u32> = rows.iter().map(|r| r.row).collect();
        assert_eq!(numbers, [1, 2, 5]);

        assert_eq!(rows[0].cell(1), Some(&RawCell::Text("SKU #".to_string())));
        assert_eq!(rows[0].cell(3), Some(&RawCell::Text("Added".to_string())));

        assert_eq!(
            rows[1].cell(1),
            Some(&RawCell::Number {
                text: "100".to_string(),
                date_style: false
            })
        );
        assert_eq!(rows[1].cell(2), Some(&RawCell::Text("X".to_string())));
        assert_eq!(
            rows[1].cell(3),
            Some(&RawCell::Number {
                text: "45292.5".to_string(),
                date_style: true
            })
        );
        assert_eq!(rows[1].cell(4), Some(&RawCell::Bool(true)));

        // Cell without a reference continues from the previous column
        assert_eq!(
            rows[2].cell(2),
            Some(&RawCell::Number {
                text: "1.5E-3".to_string(),
                date_style: false
            })
        );
        assert_eq!(rows[2].cell(5), Some(&RawCell::Error("#N/A".to_string())));
    }

    #[test]
    fn test_out_of_range_reference_falls_back_to_position() {
        let (sst, styles) = fixtures();
        let sheet = br#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="FXSHRXW1" t="s"><v>1</v></c></row></sheetData></worksheet>"#;
        let rows = read_sheet_rows(sheet, &sst, &styles).unwrap();

        let columns: Vec<u32> = rows[0].cells.iter().map(|(col, _)| *col).collect();
        assert_eq!(columns, [1, 2]);
    }

    #[test]
    fn test_find_drawing_rel_id() {
        assert_eq!(
            find_drawing_rel_id(SHEET.as_bytes()).unwrap().as_deref(),
            Some("rId3")
        );

        let no_drawing = r#"<worksheet><sheetData/><legacyDrawing r:id="rId1"/></worksheet>"#;
        assert_eq!(find_drawing_rel_id(no_drawing.as_bytes()).unwrap(), None);

        let plain = r#"<worksheet><sheetData/></worksheet>"#;
        assert_eq!(find_drawing_rel_id(plain.as_bytes()).unwrap(), None);

        let broken = r#"<worksheet><drawings></worksheet>"#;
        assert!(find_drawing_rel_id(broken.as_bytes()).is_err());
    }

    #[test]
    fn test_reference_to_coords() {
        assert_eq!(reference_to_coords("A1"), Some((1, 1)));
        assert_eq!(reference_to_coords("Z10"), Some((26, 10)));
        assert_eq!(reference_to_coords("AA3"), Some((27, 3)));
        assert_eq!(reference_to_coords("12"), None);
        assert_eq!(reference_to_coords("A"), None);
        assert_eq!(reference_to_coords("XFD7"), Some((MAX_COLUMN, 7)));
        assert_eq!(reference_to_coords("XFE7"), None);
        assert_eq!(reference_to_coords("FXSHRXW1"), None);
    }
}
