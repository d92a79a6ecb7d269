//! Unpacks a physical OPC package (ZIP file) into an addressable file tree.
//!
//! The workbook container is extracted once into a scratch directory; every
//! later stage (relationship walking, sheet reading, image copying) reads parts
//! from that tree through [`PackageTree`]. The tree is read-only after
//! extraction and can be shared across threads.
//!
//! The scratch directory is owned by the tree and removed when it is dropped,
//! so cleanup happens on every exit path, including early returns and panics
//! unwinding through the ingestion run.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Ownership of the directory a package was unpacked into.
#[derive(Debug)]
enum Scratch {
    /// Fresh temporary directory, removed by `TempDir` on drop
    Temp(TempDir),
    /// Caller-chosen scratch location, removed by `PackageTree` on drop
    Owned(PathBuf),
    /// Pre-existing tree that belongs to someone else; never removed
    Borrowed(PathBuf),
}

impl Scratch {
    fn path(&self) -> &Path {
        match self {
            Scratch::Temp(dir) => dir.path(),
            Scratch::Owned(path) | Scratch::Borrowed(path) => path,
        }
    }
}

/// An unpacked OPC package rooted at a scratch directory.
#[derive(Debug)]
pub struct PackageTree {
    scratch: Scratch,
}

impl PackageTree {
    /// Unpack a workbook container into a fresh temporary directory.
    ///
    /// # Errors
    /// Returns [`OpcError::PackageCorrupt`] if the container is not a valid
    /// ZIP archive, or an IO error if the container cannot be read.
    pub fn unpack<P: AsRef<Path>>(container: P) -> Result<Self> {
        let mut archive = open_archive(container.as_ref())?;
        let dir = tempfile::Builder::new().prefix("catalog-ingest-").tempdir()?;
        let tree = Self {
            scratch: Scratch::Temp(dir),
        };
        extract_all(&mut archive, tree.root())?;
        Ok(tree)
    }

    /// Unpack a workbook container into `scratch_dir`.
    ///
    /// Any tree already present at `scratch_dir` is removed first so that state
    /// from a previous run never leaks into this one. The directory is deleted
    /// again when the returned tree is dropped.
    pub fn unpack_into<P: AsRef<Path>, Q: AsRef<Path>>(container: P, scratch_dir: Q) -> Result<Self> {
        let mut archive = open_archive(container.as_ref())?;
        let root = scratch_dir.as_ref().to_path_buf();

        if root.exists() {
            debug!(path = %root.display(), "removing stale scratch tree");
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;

        // From here on the guard owns the directory, so a failed extraction
        // still cleans up after itself.
        let tree = Self {
            scratch: Scratch::Owned(root),
        };
        extract_all(&mut archive, tree.root())?;
        Ok(tree)
    }

    /// Wrap a tree that was unpacked by someone else. It is never deleted.
    pub fn from_dir<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            scratch: Scratch::Borrowed(root.into()),
        }
    }

    /// Root directory of the unpacked package.
    #[inline]
    pub fn root(&self) -> &Path {
        self.scratch.path()
    }

    /// Filesystem location of a part.
    #[inline]
    pub fn part_path(&self, pack_uri: &PackURI) -> PathBuf {
        pack_uri.to_path(self.root())
    }

    /// Check if a part exists in the tree.
    #[inline]
    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.part_path(pack_uri).is_file()
    }

    /// Read a part's bytes, or `None` if the part does not exist.
    pub fn read_part(&self, pack_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        match fs::read(self.part_path(pack_uri)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a part's bytes, failing if it does not exist.
    pub fn blob_for(&self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        self.read_part(pack_uri)?
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    /// Get the relationships XML for a specific source URI.
    ///
    /// Relationships files are stored in _rels directories and have a .rels extension.
    /// Returns None if the source has no relationships file.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Result<Option<Vec<u8>>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        self.read_part(&rels_uri)
    }

    /// Parse the relationships of a source part.
    ///
    /// Returns `Ok(None)` when the source has no relationship part, and an
    /// error when the relationship part exists but is not well-formed.
    pub fn relationships_for(&self, source_uri: &PackURI) -> Result<Option<Relationships>> {
        match self.rels_xml_for(source_uri)? {
            Some(xml) => Relationships::from_xml(&xml, source_uri.base_uri()).map(Some),
            None => Ok(None),
        }
    }
}

impl Drop for PackageTree {
    fn drop(&mut self) {
        if let Scratch::Owned(root) = &self.scratch
            && let Err(e) = fs::remove_dir_all(root)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %root.display(), error = %e, "failed to remove scratch tree");
        }
    }
}

fn open_archive(container: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(container)?;
    ZipArchive::new(file).map_err(|e| {
        OpcError::PackageCorrupt(format!("{}: {}", container.display(), e))
    })
}

/// Extract every member of the archive below `root`.
///
/// Members whose names would escape `root` are skipped.
fn extract_all(archive: &mut ZipArchive<File>, root: &Path) -> Result<()> {
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|e| OpcError::PackageCorrupt(e.to_string()))?;

        let Some(relative) = member.enclosed_name() else {
            warn!(name = member.name(), "skipping archive member with unsafe path");
            continue;
        };
        let target = root.join(relative);

        if member.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut member, &mut out)
            .map_err(|e| OpcError::PackageCorrupt(format!("{}: {}", member.name(), e)))?;
    }

    debug!(root = %root.display(), members = archive.len(), "package unpacked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, bytes) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_unpack_and_read_parts() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("book.xlsx");
        write_zip(
            &container,
            &[
                ("xl/workbook.xml", b"<workbook/>"),
                ("xl/media/image1.png", b"\x89PNG"),
            ],
        );

        let tree = PackageTree::unpack(&container).unwrap();
        let workbook = PackURI::new("/xl/workbook.xml").unwrap();
        let missing = PackURI::new("/xl/sharedStrings.xml").unwrap();

        assert!(tree.contains(&workbook));
        assert_eq!(tree.blob_for(&workbook).unwrap(), b"<workbook/>");
        assert!(tree.read_part(&missing).unwrap().is_none());
        assert!(tree.rels_xml_for(&workbook).unwrap().is_none());
        assert!(matches!(tree.blob_for(&missing), Err(OpcError::PartNotFound(_))));
    }

    #[test]
    fn test_unpack_into_replaces_stale_tree_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("book.xlsx");
        write_zip(&container, &[("xl/workbook.xml", b"<workbook/>")]);

        let scratch = dir.path().join("scratch");
        fs::create_dir_all(scratch.join("xl/media")).unwrap();
        fs::write(scratch.join("xl/media/stale.png"), b"old").unwrap();

        {
            let tree = PackageTree::unpack_into(&container, &scratch).unwrap();
            assert!(!tree.root().join("xl/media/stale.png").exists());
            assert!(tree.root().join("xl/workbook.xml").is_file());
        }

        assert!(!scratch.exists());
    }

    #[test]
    fn test_not_an_archive_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("book.xlsx");
        fs::write(&container, b"definitely not a zip file").unwrap();

        let err = PackageTree::unpack(&container).unwrap_err();
        assert!(matches!(err, OpcError::PackageCorrupt(_)));

        // A corrupt container must not wipe an existing scratch location
        let scratch = dir.path().join("scratch");
        fs::create_dir_all(&scratch).unwrap();
        assert!(PackageTree::unpack_into(&container, &scratch).is_err());
        assert!(scratch.exists());
    }

    #[test]
    fn test_borrowed_tree_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        {
            let tree = PackageTree::from_dir(dir.path());
            assert_eq!(tree.root(), dir.path());
        }
        assert!(dir.path().exists());
    }
}
