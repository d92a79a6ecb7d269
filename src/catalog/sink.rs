//! Persistence sinks for consolidated records.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::common::{Error, Result};

/// Receiver of consolidated records.
///
/// Records are handed over with null fields already stripped.
pub trait CatalogSink {
    fn put(&mut self, sku: &str, fields: Map<String, Value>) -> Result<()>;

    /// Flush everything received so far.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink writing all records as one pretty-printed JSON array.
pub struct JsonCatalogWriter<W: Write> {
    writer: W,
    records: Vec<Value>,
}

impl JsonCatalogWriter<BufWriter<File>> {
    /// Create (or truncate) the output file, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .map_err(|e| Error::Sink(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonCatalogWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }

    /// Number of records received.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CatalogSink for JsonCatalogWriter<W> {
    fn put(&mut self, _sku: &str, fields: Map<String, Value>) -> Result<()> {
        self.records.push(Value::Object(fields));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.records)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
