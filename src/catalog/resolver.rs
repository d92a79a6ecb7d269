//! Maps the pictures embedded in a sheet to the rows they are anchored on.
//!
//! The package gives no direct row → image table. It has to be recovered by
//! following four hops:
//!
//! 1. workbook → sheet part
//! 2. sheet part → `<drawing r:id>` → drawing part (via the sheet's `.rels`)
//! 3. drawing part → picture anchors (`from/row` and `a:blip/@r:embed`)
//! 4. drawing `.rels` → media file
//!
//! Every hop may be absent. An absent part or relationship ends the walk with
//! "no images" rather than an error; only a malformed XML part fails the sheet.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::common::{Error, Result};
use crate::ooxml::drawings::parse_anchors;
use crate::ooxml::opc::error::Result as OpcResult;
use crate::ooxml::opc::{PackURI, PackageTree};
use crate::ooxml::xlsx::{Workbook, find_drawing_rel_id};

/// Visible row number → media files anchored on that row, in document order.
pub type RowImages = BTreeMap<u32, Vec<PathBuf>>;

/// Resolve the row → media mapping of the sheet at a 1-based workbook index.
///
/// Row numbers are visible spreadsheet rows (the header is row 1); no header
/// offset is applied.
///
/// # Errors
/// Returns [`Error::SheetResolutionFailed`] when a part on the chain exists
/// but cannot be parsed.
pub fn resolve(tree: &PackageTree, workbook: &Workbook, sheet_index: usize) -> Result<RowImages> {
    resolve_chain(tree, workbook, sheet_index)
        .map(Option::unwrap_or_default)
        .map_err(|e| Error::SheetResolutionFailed {
            sheet: sheet_label(workbook, sheet_index),
            reason: e.to_string(),
        })
}

fn sheet_label(workbook: &Workbook, sheet_index: usize) -> String {
    workbook
        .sheets()
        .get(sheet_index.wrapping_sub(1))
        .map_or_else(|| format!("#{}", sheet_index), |sheet| sheet.name.clone())
}

/// The drawing part of a sheet, if the sheet references one that exists.
fn drawing_part(tree: &PackageTree, sheet_part: &PackURI) -> OpcResult<Option<PackURI>> {
    let Some(sheet_xml) = tree.read_part(sheet_part)? else {
        debug!(part = %sheet_part, "sheet part not found");
        return Ok(None);
    };
    let Some(drawing_rid) = find_drawing_rel_id(&sheet_xml)? else {
        return Ok(None);
    };
    let Some(sheet_rels) = tree.relationships_for(sheet_part)? else {
        debug!(part = %sheet_part, r_id = %drawing_rid, "sheet has a drawing reference but no relationships");
        return Ok(None);
    };
    let Some(drawing) = sheet_rels.target_partname(&drawing_rid) else {
        debug!(part = %sheet_part, r_id = %drawing_rid, "drawing relationship not found");
        return Ok(None);
    };
    Ok(tree.contains(&drawing).then_some(drawing))
}

fn resolve_chain(
    tree: &PackageTree,
    workbook: &Workbook,
    sheet_index: usize,
) -> OpcResult<Option<RowImages>> {
    let Some(sheet_part) = workbook.sheet_part(tree, sheet_index)? else {
        return Ok(None);
    };
    let Some(drawing) = drawing_part(tree, &sheet_part)? else {
        return Ok(None);
    };
    let Some(drawing_xml) = tree.read_part(&drawing)? else {
        return Ok(None);
    };

    let anchors = parse_anchors(&drawing_xml)?;
    if anchors.is_empty() {
        return Ok(None);
    }
    let Some(drawing_rels) = tree.relationships_for(&drawing)? else {
        debug!(part = %drawing, "drawing has anchors but no relationships");
        return Ok(None);
    };

    let mut images = RowImages::new();
    for anchor in anchors {
        let Some(media) = drawing_rels.target_partname(&anchor.relationship_id) else {
            debug!(part = %drawing, r_id = %anchor.relationship_id, "image relationship not found");
            continue;
        };
        let path = tree.part_path(&media);
        if !path.is_file() {
            debug!(part = %media, "media file missing from package");
            continue;
        }
        images.entry(anchor.row_number).or_default().push(path);
    }

    debug!(sheet = sheet_index, rows = images.len(), "images resolved");
    Ok(Some(images))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const WORKBOOK: &str = r#"<workbook xmlns:r="urn:r"><sheets>
        <sheet name="Spring" sheetId="1" r:id="rId1"/>
        <sheet name="Plain" sheetId="2" r:id="rId2"/>
        <sheet name="Broken" sheetId="3" r:id="rId3"/>
        <sheet name="Dangling" sheetId="4" r:id="rId4"/>
    </sheets></workbook>"#;

    const WORKBOOK_RELS: &str = r#"<Relationships>
        <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
        <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
        <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet3.xml"/>
        <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet4.xml"/>
    </Relationships>"#;

    const SHEET_WITH_DRAWING: &str =
        r#"<worksheet xmlns:r="urn:r"><sheetData/><drawing r:id="rId1"/></worksheet>"#;

    const SHEET_RELS: &str = r#"<Relationships>
        <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
    </Relationships>"#;

    fn anchor(row: u32, r_id: &str) -> String {
        format!(
            r#"<xdr:twoCellAnchor><xdr:from><xdr:col>2</xdr:col><xdr:row>{}</xdr:row></xdr:from>
               <xdr:pic><xdr:blipFill><a:blip r:embed="{}"/></xdr:blipFill></xdr:pic></xdr:twoCellAnchor>"#,
            row, r_id
        )
    }

    const DRAWING_RELS: &str = r#"<Relationships>
        <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
        <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image2.jpeg"/>
        <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/missing.png"/>
    </Relationships>"#;

    fn put(root: &Path, name: &str, content: &[u8]) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn package(root: &Path) {
        put(root, "xl/workbook.xml", WORKBOOK.as_bytes());
        put(root, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes());

        put(root, "xl/worksheets/sheet1.xml", SHEET_WITH_DRAWING.as_bytes());
        put(root, "xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS.as_bytes());
        let drawing = format!(
            r#"<xdr:wsDr xmlns:xdr="urn:x" xmlns:a="urn:a" xmlns:r="urn:r">{}{}{}{}{}</xdr:wsDr>"#,
            anchor(1, "rId1"),
            anchor(4, "rId2"),
            anchor(1, "rId2"),
            anchor(2, "rId3"),
            anchor(6, "rId9"),
        );
        put(root, "xl/drawings/drawing1.xml", drawing.as_bytes());
        put(root, "xl/drawings/_rels/drawing1.xml.rels", DRAWING_RELS.as_bytes());
        put(root, "xl/media/image1.png", b"\x89PNG one");
        put(root, "xl/media/image2.jpeg", b"\xFF\xD8 two");

        put(root, "xl/worksheets/sheet2.xml", b"<worksheet><sheetData/></worksheet>");

        put(root, "xl/worksheets/sheet3.xml", SHEET_WITH_DRAWING.as_bytes());
        put(root, "xl/worksheets/_rels/sheet3.xml.rels", SHEET_RELS.replace("drawing1", "drawing3").as_bytes());
        put(root, "xl/drawings/drawing3.xml", b"<xdr:wsDr><xdr:twoCellAnchor></xdr:wsDr>");

        // Sheet 4 references a drawing but its relationship part is missing
        put(root, "xl/worksheets/sheet4.xml", SHEET_WITH_DRAWING.as_bytes());
    }

    #[test]
    fn test_resolve_rows_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        package(dir.path());
        let tree = PackageTree::from_dir(dir.path());
        let workbook = Workbook::read(&tree).unwrap();

        let images = resolve(&tree, &workbook, 1).unwrap();
        let media = |name: &str| dir.path().join("xl/media").join(name);

        assert_eq!(images.len(), 2);
        // Same-row anchors accumulate in document order
        assert_eq!(images[&2], vec![media("image1.png"), media("image2.jpeg")]);
        assert_eq!(images[&5], vec![media("image2.jpeg")]);
        // Missing media file and unknown relationship are skipped
        assert!(!images.contains_key(&3));
        assert!(!images.contains_key(&7));

        // Resolving again gives the same mapping
        assert_eq!(resolve(&tree, &workbook, 1).unwrap(), images);
    }

    #[test]
    fn test_absent_hops_yield_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        package(dir.path());
        let tree = PackageTree::from_dir(dir.path());
        let workbook = Workbook::read(&tree).unwrap();

        // No drawing reference
        assert!(resolve(&tree, &workbook, 2).unwrap().is_empty());
        // Sheet relationships missing
        assert!(resolve(&tree, &workbook, 4).unwrap().is_empty());
        // Sheet not declared and not present on disk
        assert!(resolve(&tree, &workbook, 9).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_drawing_fails_sheet() {
        let dir = tempfile::tempdir().unwrap();
        package(dir.path());
        let tree = PackageTree::from_dir(dir.path());
        let workbook = Workbook::read(&tree).unwrap();

        match resolve(&tree, &workbook, 3) {
            Err(Error::SheetResolutionFailed { sheet, .. }) => assert_eq!(sheet, "Broken"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
