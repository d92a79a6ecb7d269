//! Parser for the parts of xl/styles.xml that affect value typing.
//!
//! Only number formats (`numFmts`) and the cell format records (`cellXfs`)
//! are read; fonts, fills and borders have no bearing on cell values.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{NumberFormat, Styles};
use crate::common::xml::attr_local;
use crate::ooxml::opc::error::{OpcError, Result};

/// Parse styles.xml content.
pub fn parse_styles_xml(content: &[u8]) -> Result<Styles> {
    let mut number_formats: HashMap<u32, NumberFormat> = HashMap::new();
    let mut cell_xf_formats = Vec::new();

    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = true;
            },
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = attr_local(e, b"numFmtId").map_err(OpcError::XmlError)?;
                    let code = attr_local(e, b"formatCode").map_err(OpcError::XmlError)?;
                    if let (Some(id), Some(code)) = (id.and_then(|v| v.parse::<u32>().ok()), code) {
                        number_formats.insert(id, NumberFormat::new(id, code));
                    }
                },
                b"xf" if in_cell_xfs => {
                    let id = attr_local(e, b"numFmtId")
                        .map_err(OpcError::XmlError)?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0);
                    cell_xf_formats.push(id);
                },
                _ => {},
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Styles parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(Styles {
        number_formats,
        cell_xf_formats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/>
    <numFmt numFmtId="165" formatCode="0.000"/>
  </numFmts>
  <cellStyleXfs count="1"><xf numFmtId="14"/></cellStyleXfs>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="14" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="164" fontId="0" applyNumberFormat="1"><alignment wrapText="1"/></xf>
    <xf numFmtId="165"/>
    <xf numFmtId="46"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_parse_styles_xml() {
        let styles = parse_styles_xml(STYLES.as_bytes()).unwrap();
        assert_eq!(styles.cell_xf_formats, vec![0, 14, 164, 165, 46]);
        assert_eq!(styles.number_formats.len(), 2);

        assert!(!styles.is_date_style(0));
        assert!(styles.is_date_style(1));
        assert!(styles.is_date_style(2));
        assert!(!styles.is_date_style(3));
        assert!(!styles.is_date_style(4));
        assert!(!styles.is_date_style(99));
    }
}
