/// Constant values related to the Open Packaging Convention.
///
/// This module contains the content types handed to image stores, the
/// well-known part names of a SpreadsheetML package, and the relationship
/// types followed while walking from a workbook to its embedded media.

/// Content type URIs (like MIME-types) for embedded media
pub mod content_type {
    pub const BMP: &str = "image/bmp";
    pub const GIF: &str = "image/gif";
    pub const JPEG: &str = "image/jpeg";
    pub const PNG: &str = "image/png";
    pub const TIFF: &str = "image/tiff";
    pub const WEBP: &str = "image/webp";
    pub const X_EMF: &str = "image/x-emf";
    pub const X_WMF: &str = "image/x-wmf";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    /// Content type for a media file extension (without the leading period).
    pub fn for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => PNG,
            "jpg" | "jpeg" => JPEG,
            "gif" => GIF,
            "webp" => WEBP,
            "bmp" => BMP,
            "tif" | "tiff" => TIFF,
            "emf" => X_EMF,
            "wmf" => X_WMF,
            _ => OCTET_STREAM,
        }
    }
}

/// Well-known part names of a SpreadsheetML package
pub mod part_name {
    pub const WORKBOOK: &str = "/xl/workbook.xml";
    pub const SHARED_STRINGS: &str = "/xl/sharedStrings.xml";
    pub const STYLES: &str = "/xl/styles.xml";
    /// Directory holding `sheet<N>.xml` parts when no workbook relationship names them
    pub const WORKSHEETS_DIR: &str = "/xl/worksheets";
}

/// Open XML relationship target modes
pub mod target_mode {
    /// Internal relationship target mode (default)
    pub const INTERNAL: &str = "Internal";

    /// External relationship target mode (e.g., hyperlinks to external URLs)
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs used in SpreadsheetML packages
pub mod relationship_type {
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
}

#[cfg(test)]
mod tests {
    use super::content_type;

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type::for_extension("png"), "image/png");
        assert_eq!(content_type::for_extension("JPEG"), "image/jpeg");
        assert_eq!(content_type::for_extension("jpg"), "image/jpeg");
        assert_eq!(content_type::for_extension("emf"), "image/x-emf");
        assert_eq!(content_type::for_extension("heic"), "application/octet-stream");
        assert_eq!(content_type::for_extension(""), "application/octet-stream");
    }
}
