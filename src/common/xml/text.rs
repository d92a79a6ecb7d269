use super::unescape_xml;
use quick_xml::events::{BytesCData, BytesRef, BytesStart, BytesText};

/// Accumulates the character content of an element.
///
/// Character content arrives split across text, entity reference and CDATA
/// events; the buffer stitches them back into one string.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw text event.
    pub fn push_text(&mut self, e: &BytesText<'_>) -> Result<(), String> {
        let raw = std::str::from_utf8(e).map_err(|e| e.to_string())?;
        self.text.push_str(&unescape_xml(raw));
        Ok(())
    }

    /// Append a CDATA section verbatim.
    pub fn push_cdata(&mut self, e: &BytesCData<'_>) -> Result<(), String> {
        let raw = std::str::from_utf8(e).map_err(|e| e.to_string())?;
        self.text.push_str(raw);
        Ok(())
    }

    /// Append a character or predefined entity reference.
    ///
    /// Unknown entities are kept as written.
    pub fn push_ref(&mut self, e: &BytesRef<'_>) -> Result<(), String> {
        if let Some(ch) = e.resolve_char_ref().map_err(|e| e.to_string())? {
            self.text.push(ch);
            return Ok(());
        }

        let name = e.decode().map_err(|e| e.to_string())?;
        match quick_xml::escape::resolve_xml_entity(&name) {
            Some(resolved) => self.text.push_str(resolved),
            None => {
                self.text.push('&');
                self.text.push_str(&name);
                self.text.push(';');
            },
        }
        Ok(())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take the accumulated text, leaving the buffer empty.
    #[inline]
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Value of the first attribute with the given local name, ignoring any
/// namespace prefix (`r:id`, `r:embed`, ...).
pub fn attr_local(e: &BytesStart<'_>, local_name: &[u8]) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.local_name().as_ref() == local_name {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
