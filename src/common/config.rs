//! Ingestion configuration.
//!
//! Every component receives its settings from an explicit [`IngestConfig`]
//! value instead of module-level constants. All fields have defaults, so an
//! empty YAML document (or `IngestConfig::default()`) is a complete config.
//!
//! ```yaml
//! sku_column: sku
//! sku_aliases: [sku, sku_number, item_sku]
//! image_dir: output
//! public_base_url: https://product-images.example.com
//! dedupe_images: true
//! ```

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Canonical key of the SKU column in every record
    pub sku_column: String,
    /// Canonical column names that all mean "the SKU column"
    pub sku_aliases: Vec<String>,
    /// Canonical column names dropped from record fields (legacy image columns)
    pub ignored_columns: Vec<String>,
    /// Visible (1-based) row number of the header row
    pub header_row: u32,
    /// Where the workbook is unpacked; a fresh temporary directory when unset
    pub scratch_dir: Option<PathBuf>,
    /// Root directory of the filesystem image store; keys are written below it
    pub image_dir: PathBuf,
    /// Key prefix of every persisted image
    pub image_prefix: String,
    /// Base URL prepended to image keys; references are bare keys when unset
    pub public_base_url: Option<String>,
    /// Reuse the reference of an identical, already persisted image
    pub dedupe_images: bool,
    /// Run the per-sheet producers on the rayon pool
    pub parallel: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sku_column: "sku".to_string(),
            sku_aliases: ["sku", "sku_number", "sku_no", "sku_id"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignored_columns: vec!["image".to_string(), "image_local".to_string()],
            header_row: 1,
            scratch_dir: None,
            image_dir: PathBuf::from("output"),
            image_prefix: "images".to_string(),
            public_base_url: None,
            dedupe_images: true,
            parallel: true,
        }
    }
}

impl IngestConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject settings no run can work with.
    pub fn validate(&self) -> Result<()> {
        if self.sku_column.trim().is_empty() {
            return Err(Error::Config("sku_column must not be empty".to_string()));
        }
        if self.header_row == 0 {
            return Err(Error::Config("header_row is 1-based".to_string()));
        }
        Ok(())
    }

    /// Whether a canonical column name refers to the SKU column.
    pub fn is_sku_alias(&self, canonical: &str) -> bool {
        canonical == self.sku_column || self.sku_aliases.iter().any(|alias| alias == canonical)
    }

    /// Whether a canonical column name is dropped from record fields.
    pub fn is_ignored_column(&self, canonical: &str) -> bool {
        self.ignored_columns.iter().any(|c| c == canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.sku_column, "sku");
        assert_eq!(config.header_row, 1);
        assert!(config.dedupe_images);
        assert!(config.is_sku_alias("sku_number"));
        assert!(config.is_sku_alias("sku"));
        assert!(!config.is_sku_alias("skus"));
        assert!(config.is_ignored_column("image_local"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = IngestConfig::from_yaml_str(
            "public_base_url: https://cdn.example.com\ndedupe_images: false\n",
        )
        .unwrap();
        assert_eq!(config.public_base_url.as_deref(), Some("https://cdn.example.com"));
        assert!(!config.dedupe_images);
        assert_eq!(config.image_prefix, "images");
        assert_eq!(config.sku_aliases, IngestConfig::default().sku_aliases);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(IngestConfig::from_yaml_str("  \n").unwrap(), IngestConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            IngestConfig::from_yaml_str("header_row: [1, 2]"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            IngestConfig::from_yaml_str("header_row: 0"),
            Err(Error::Config(_))
        ));
    }
}
