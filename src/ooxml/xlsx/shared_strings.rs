//! Shared strings table for Excel files.
//!
//! Excel stores most string cell values once in xl/sharedStrings.xml and
//! refers to them by index. Each `<si>` item is either a plain `<t>` or a
//! sequence of rich-text runs (`<r><t>..</t></r>`) whose texts are joined.
//! Phonetic hints (`<rPh>`) are not part of the visible value and are skipped.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::TextBuffer;
use crate::ooxml::opc::error::{OpcError, Result};

// Performance: Pre-allocate typical capacities to reduce reallocations
const INITIAL_STRINGS_CAPACITY: usize = 1024;

/// Shared strings table.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse shared strings from xl/sharedStrings.xml content.
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut strings = Vec::with_capacity(INITIAL_STRINGS_CAPACITY);

        let mut reader = Reader::from_reader(content);
        let mut buf = Vec::new();

        let mut item = TextBuffer::new();
        let mut in_item = false;
        let mut in_text = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_item = true;
                        item.clear();
                    },
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_item && phonetic_depth == 0 => in_text = true,
                    _ => {},
                },
                Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                },
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_item = false;
                        strings.push(item.take());
                    },
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {},
                },
                Ok(Event::Text(ref e)) if in_text => item.push_text(e).map_err(OpcError::XmlError)?,
                Ok(Event::CData(ref e)) if in_text => {
                    item.push_cdata(e).map_err(OpcError::XmlError)?
                },
                Ok(Event::GeneralRef(ref e)) if in_text => {
                    item.push_ref(e).map_err(OpcError::XmlError)?
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Shared strings parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(SharedStrings { strings })
    }

    /// Get a string by its index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the number of strings in the table.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
