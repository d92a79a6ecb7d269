//! Image materialization: naming, deduplicating and persisting the media
//! files resolved for a row.
//!
//! Images are named after the record's SKU slug: the first image of a record
//! is `<slug>.<ext>`, the N-th is `<slug>_<N>.<ext>`, where N counts the
//! images already attached to the record across every sheet. With
//! deduplication enabled, bytes identical to an image persisted earlier in
//! the run reuse that image's reference instead of being written again.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::common::{Error, IngestConfig, Result};
use crate::ooxml::opc::constants::content_type;

/// Extension used for media files that have none.
const FALLBACK_EXTENSION: &str = "bin";

/// Destination of persisted images (filesystem, object storage, ...).
pub trait ImageStore {
    /// Persist `bytes` under `key` and return the reference recorded in the
    /// catalog (URL or relative path).
    fn write(&self, bytes: &[u8], key: &str, content_type: &str) -> Result<String>;
}

/// Image store writing below a local directory.
///
/// References are the key itself, or `<public_base_url>/<key>` when a base
/// URL is configured.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl FsImageStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            public_base_url: None,
        }
    }

    pub fn with_public_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.public_base_url = Some(base_url.into());
        self
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            root: config.image_dir.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageStore for FsImageStore {
    fn write(&self, bytes: &[u8], key: &str, _content_type: &str) -> Result<String> {
        let path = key.split('/').fold(self.root.clone(), |path, segment| path.join(segment));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;

        Ok(match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => key.to_string(),
        })
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn slugify(sku: &str) -> String {
    sku.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name of the `position`-th (1-based) image of a record.
pub fn image_file_name(slug: &str, position: usize, ext: &str) -> String {
    if position <= 1 {
        format!("{}.{}", slug, ext)
    } else {
        format!("{}_{}.{}", slug, position, ext)
    }
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| FALLBACK_EXTENSION.to_string(), |ext| ext.to_ascii_lowercase())
}

/// Counters of one run's image handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    /// Images written to the store
    pub persisted: usize,
    /// Images that reused the reference of identical bytes
    pub deduplicated: usize,
    /// Images dropped because they could not be read or written
    pub skipped: usize,
}

/// Names, deduplicates and persists images for the records of one run.
pub struct Materializer<'a> {
    store: &'a dyn ImageStore,
    prefix: String,
    dedupe: bool,
    seen: HashMap<Vec<u8>, String>,
    stats: MaterializeStats,
}

impl<'a> Materializer<'a> {
    pub fn new(store: &'a dyn ImageStore, config: &IngestConfig) -> Self {
        Self {
            store,
            prefix: config.image_prefix.trim_matches('/').to_string(),
            dedupe: config.dedupe_images,
            seen: HashMap::new(),
            stats: MaterializeStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> MaterializeStats {
        self.stats
    }

    fn key_for(&self, file_name: &str) -> String {
        if self.prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.prefix, file_name)
        }
    }

    /// Persist the media files of one row and return their references in
    /// the same order.
    ///
    /// `attached` is the number of images the record already holds. An image
    /// that fails is logged, counted and left out; the others continue.
    pub fn materialize(&mut self, sku_slug: &str, attached: usize, paths: &[PathBuf]) -> Vec<String> {
        let mut references = Vec::with_capacity(paths.len());

        for path in paths {
            let position = attached + references.len() + 1;
            let ext = lowercase_extension(path);
            let key = self.key_for(&image_file_name(sku_slug, position, &ext));

            match self.persist(path, &key, &ext) {
                Ok(reference) => references.push(reference),
                Err(e) => {
                    warn!(key = %key, source = %path.display(), error = %e, "dropping image");
                    self.stats.skipped += 1;
                },
            }
        }

        references
    }

    fn persist(&mut self, path: &Path, key: &str, ext: &str) -> Result<String> {
        let persist_failed = |reason: String| Error::ImagePersistFailed {
            key: key.to_string(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| persist_failed(e.to_string()))?;

        let digest = self.dedupe.then(|| Sha256::digest(&bytes).to_vec());
        if let Some(digest) = &digest
            && let Some(existing) = self.seen.get(digest)
        {
            debug!(key = %key, reuses = %existing, "identical image already persisted");
            self.stats.deduplicated += 1;
            return Ok(existing.clone());
        }

        let reference = self
            .store
            .write(&bytes, key, content_type::for_extension(ext))
            .map_err(|e| match e {
                Error::ImagePersistFailed { .. } => e,
                other => persist_failed(other.to_string()),
            })?;

        if let Some(digest) = digest {
            self.seen.insert(digest, reference.clone());
        }
        self.stats.persisted += 1;
        Ok(reference)
    }
}
