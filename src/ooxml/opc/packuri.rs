/// Provides the PackURI value type and utilities for working with package URIs.
///
/// A PackURI represents a part name within an OPC package, following the URI format
/// defined by the Open Packaging Conventions specification. Once a package has been
/// unpacked, a PackURI also addresses a file under the unpacked tree.
use std::path::{Path, PathBuf};

/// Represents a package URI, which is a partname within an OPC package.
///
/// PackURIs always begin with a forward slash and use forward slashes as path separators,
/// following the OPC specification. They provide access to various components like
/// the base URI (directory), filename and on-disk location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/xl/worksheets/sheet1.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Arguments
    /// * `uri` - The URI string, which must begin with a forward slash
    ///
    /// # Returns
    /// * `Ok(PackURI)` if the URI is valid
    /// * `Err` if the URI doesn't start with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a relationship target and the source's base URI.
    ///
    /// This translates a relative reference (like "../drawings/drawing1.xml") onto a
    /// base URI (like "/xl/worksheets") to produce an absolute PackURI
    /// (like "/xl/drawings/drawing1.xml"). Targets that already start with a slash
    /// are package-absolute and only get normalized.
    ///
    /// # Arguments
    /// * `base_uri` - The base URI to resolve from
    /// * `relative_ref` - The relative reference to resolve
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let relative_ref = relative_ref.replace('\\', "/");
        let joined = if relative_ref.starts_with('/') {
            relative_ref
        } else {
            Self::join_paths(base_uri, &relative_ref)
        };
        let normalized = Self::normalize_path(&joined);
        Self::new(normalized)
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/xl/worksheets" for "/xl/worksheets/sheet1.xml".
    /// For the package pseudo-partname "/", returns "/".
    pub fn base_uri(&self) -> &str {
        if self.uri == "/" {
            return "/";
        }

        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For example, "sheet1.xml" for "/xl/worksheets/sheet1.xml".
    /// For the package pseudo-partname "/", returns an empty string.
    pub fn filename(&self) -> &str {
        if let Some(pos) = self.uri.rfind('/') {
            &self.uri[pos + 1..]
        } else {
            ""
        }
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the Zip file membername for the package item.
    /// Returns an empty string for the package pseudo-partname "/".
    pub fn membername(&self) -> &str {
        if self.uri == "/" {
            ""
        } else {
            &self.uri[1..]
        }
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/xl/worksheets/_rels/sheet1.xml.rels" for "/xl/worksheets/sheet1.xml".
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let filename = self.filename();
        let base_uri = self.base_uri();

        let rels_filename = format!("{}.rels", filename);
        let rels_uri_str = if base_uri == "/" {
            format!("/_rels/{}", rels_filename)
        } else {
            format!("{}/_rels/{}", base_uri, rels_filename)
        };

        Self::new(rels_uri_str)
    }

    /// Location of this part below an unpacked package root.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.membername().split('/').filter(|s| !s.is_empty()));
        path
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Helper function to join two paths using forward slashes
    fn join_paths(base: &str, rel: &str) -> String {
        if base.ends_with('/') {
            format!("{}{}", base, rel)
        } else {
            format!("{}/{}", base, rel)
        }
    }

    /// Helper function to normalize a path (resolve ".." and ".")
    ///
    /// ".." never climbs above the package root.
    fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();

        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop();
                },
                _ => parts.push(part),
            }
        }

        format!("/{}", parts.join("/"))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packuri_new() {
        assert!(PackURI::new("/xl/workbook.xml").is_ok());
        assert!(PackURI::new("xl/workbook.xml").is_err());
    }

    #[test]
    fn test_base_uri() {
        let uri = PackURI::new("/xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(uri.base_uri(), "/xl/worksheets");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.base_uri(), "/");

        let top = PackURI::new("/[Content_Types].xml").unwrap();
        assert_eq!(top.base_uri(), "/");
    }

    #[test]
    fn test_filename() {
        let uri = PackURI::new("/xl/media/image1.PNG").unwrap();
        assert_eq!(uri.filename(), "image1.PNG");

        let root = PackURI::new("/").unwrap();
        assert_eq!(root.filename(), "");
    }

    #[test]
    fn test_membername() {
        let uri = PackURI::new("/xl/workbook.xml").unwrap();
        assert_eq!(uri.membername(), "xl/workbook.xml");

        let root = PackURI::new("/").unwrap();
        assert_eq!(root.membername(), "");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/xl/worksheets", "../drawings/drawing1.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/drawings/drawing1.xml");

        let uri = PackURI::from_rel_ref("/xl", "worksheets/sheet2.xml").unwrap();
        assert_eq!(uri.as_str(), "/xl/worksheets/sheet2.xml");

        let uri = PackURI::from_rel_ref("/xl/drawings", "/xl/media/image3.jpeg").unwrap();
        assert_eq!(uri.as_str(), "/xl/media/image3.jpeg");

        // Cannot escape the package root
        let uri = PackURI::from_rel_ref("/xl", "../../../etc/passwd").unwrap();
        assert_eq!(uri.as_str(), "/etc/passwd");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/xl/drawings/drawing1.xml").unwrap();
        assert_eq!(
            uri.rels_uri().unwrap().as_str(),
            "/xl/drawings/_rels/drawing1.xml.rels"
        );

        let uri = PackURI::new("/workbook.xml").unwrap();
        assert_eq!(uri.rels_uri().unwrap().as_str(), "/_rels/workbook.xml.rels");
    }

    #[test]
    fn test_to_path() {
        let uri = PackURI::new("/xl/media/image1.png").unwrap();
        let path = uri.to_path(Path::new("/tmp/pkg"));
        assert_eq!(path, Path::new("/tmp/pkg/xl/media/image1.png"));
    }
}
