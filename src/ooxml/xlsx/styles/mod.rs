//! Cell styles, reduced to what value typing needs.
//!
//! A numeric cell is a timestamp exactly when its style index (`s`) points at
//! a cell format record whose number format is date-like. [`Styles`] answers
//! that question per style index.
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_ingest::ooxml::xlsx::Styles;
//!
//! let styles_xml = std::fs::read("xl/styles.xml")?;
//! let styles = Styles::parse(&styles_xml)?;
//!
//! if styles.is_date_style(1) {
//!     println!("style 1 formats dates");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod number_format;
mod parser;

pub use number_format::{NumberFormat, is_builtin_date_format, is_date_format};

use std::collections::HashMap;

use crate::ooxml::opc::error::Result;

/// Number format information for an Excel workbook.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats (ID -> format code)
    pub number_formats: HashMap<u32, NumberFormat>,
    /// Number format ID of each cell format record (cellXfs), by style index
    pub cell_xf_formats: Vec<u32>,
}

impl Styles {
    /// Create a new empty styles collection.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse styles from xl/styles.xml content.
    pub fn parse(content: &[u8]) -> Result<Self> {
        parser::parse_styles_xml(content)
    }

    /// Number format ID applied by a cell style index.
    #[inline]
    pub fn number_format_id(&self, style_index: usize) -> Option<u32> {
        self.cell_xf_formats.get(style_index).copied()
    }

    /// Whether cells with this style index hold dates or times.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        let Some(id) = self.number_format_id(style_index) else {
            return false;
        };

        match self.number_formats.get(&id) {
            Some(custom) => custom.is_date_format(),
            None => is_builtin_date_format(id),
        }
    }
}
