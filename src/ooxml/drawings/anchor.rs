//! Picture anchors of a spreadsheet drawing part.
//!
//! ```xml
//! <xdr:wsDr>
//!   <xdr:twoCellAnchor editAs="oneCell">
//!     <xdr:from><xdr:col>2</xdr:col><xdr:colOff>0</xdr:colOff>
//!               <xdr:row>1</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
//!     <xdr:to>..</xdr:to>
//!     <xdr:pic>
//!       <xdr:blipFill><a:blip r:embed="rId1"/></xdr:blipFill>
//!     </xdr:pic>
//!   </xdr:twoCellAnchor>
//! </xdr:wsDr>
//! ```
//!
//! Only the anchor's `from` row matters: a picture belongs to the row its
//! top-left corner sits in. Absolute anchors have no cell and are ignored.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::common::xml::TextBuffer;
use crate::ooxml::drawings::blip::read_blip_embed_attr;
use crate::ooxml::opc::error::{OpcError, Result};

/// A picture pinned to a sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAnchor {
    /// Visible (1-based) row number of the anchor's top-left cell
    pub row_number: u32,
    /// Relationship ID (in the drawing part) of the embedded image
    pub relationship_id: String,
    /// Position among the drawing's picture anchors
    pub document_order: usize,
}

#[derive(Debug, Default)]
struct AnchorState {
    row: Option<u32>,
    embed: Option<String>,
}

impl AnchorState {
    fn record_blip(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if self.embed.is_none() {
            self.embed = read_blip_embed_attr(e)?;
        }
        Ok(())
    }
}

fn is_cell_anchor(local_name: &[u8]) -> bool {
    matches!(local_name, b"twoCellAnchor" | b"oneCellAnchor")
}

/// Parse the picture anchors of a drawing part in document order.
///
/// An anchor contributes at most one picture (its first embedded blip).
/// Anchors without a row or without an embedded picture (shapes, charts,
/// linked pictures) are skipped. Content of `mc:Fallback` branches repeats the
/// preferred `mc:Choice` and is not read.
pub fn parse_anchors(content: &[u8]) -> Result<Vec<ImageAnchor>> {
    let mut anchors = Vec::new();

    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut anchor: Option<AnchorState> = None;
    let mut in_from = false;
    let mut in_row = false;
    let mut row_text = TextBuffer::new();
    let mut fallback_depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf);

        if fallback_depth > 0 {
            match event {
                Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"Fallback" => {
                    fallback_depth += 1;
                },
                Ok(Event::End(ref e)) if e.local_name().as_ref() == b"Fallback" => {
                    fallback_depth -= 1;
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::XmlError(format!("Drawing parse error: {}", e))),
                _ => {},
            }
            buf.clear();
            continue;
        }

        match event {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"Fallback" => fallback_depth = 1,
                name if is_cell_anchor(name) => {
                    anchor = Some(AnchorState::default());
                },
                b"from" if anchor.is_some() => in_from = true,
                b"row" if in_from => {
                    in_row = true;
                    row_text.clear();
                },
                b"blip" => {
                    if let Some(state) = anchor.as_mut() {
                        state.record_blip(e)?;
                    }
                },
                _ => {},
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"blip" => {
                if let Some(state) = anchor.as_mut() {
                    state.record_blip(e)?;
                }
            },
            Ok(Event::Text(ref e)) if in_row => {
                row_text.push_text(e).map_err(OpcError::XmlError)?;
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"row" if in_row => {
                    in_row = false;
                    let row = atoi_simd::parse::<u32, false, false>(row_text.as_str().trim().as_bytes()).ok();
                    if let Some(state) = anchor.as_mut() {
                        // Drawing rows are 0-based
                        state.row = row.and_then(|r| r.checked_add(1));
                    }
                },
                b"from" => in_from = false,
                name if is_cell_anchor(name) => {
                    match anchor.take() {
                        Some(AnchorState {
                            row: Some(row_number),
                            embed: Some(relationship_id),
                        }) => anchors.push(ImageAnchor {
                            row_number,
                            relationship_id,
                            document_order: anchors.len(),
                        }),
                        Some(state) => {
                            debug!(row = ?state.row, embed = ?state.embed, "skipping anchor without picture or row");
                        },
                        None => {},
                    }
                    in_from = false;
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::XmlError(format!("Drawing parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(anchors)
}
