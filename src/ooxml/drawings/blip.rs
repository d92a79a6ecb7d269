use crate::ooxml::opc::error::{OpcError, Result};
use quick_xml::events::BytesStart;

/// Read the relationship ID of a `<a:blip r:embed="..">` element.
///
/// Linked pictures (`r:link`) carry no embedded media and yield `None`.
pub fn read_blip_embed_attr(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() != b"embed" {
            continue;
        }

        let rid = attr.unescape_value().map_err(|e| OpcError::XmlError(e.to_string()))?;
        let rid = rid.trim();
        if rid.is_empty() {
            return Ok(None);
        }
        return Ok(Some(rid.to_string()));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn first_element(xml: &str) -> BytesStart<'static> {
        let mut reader = Reader::from_str(xml);
        match reader.read_event().unwrap() {
            Event::Empty(e) | Event::Start(e) => e.into_owned(),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_read_blip_embed_attr() {
        let blip = first_element(r#"<a:blip xmlns:r="urn:r" r:embed="rId2" cstate="print"/>"#);
        assert_eq!(read_blip_embed_attr(&blip).unwrap().as_deref(), Some("rId2"));

        let linked = first_element(r#"<a:blip xmlns:r="urn:r" r:link="rId4"/>"#);
        assert_eq!(read_blip_embed_attr(&linked).unwrap(), None);

        let blank = first_element(r#"<a:blip r:embed=""/>"#);
        assert_eq!(read_blip_embed_attr(&blank).unwrap(), None);
    }
}
