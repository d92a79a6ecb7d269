//! DrawingML (DML) support for spreadsheet drawing parts.
//!
//! A worksheet's pictures live in a separate drawing part
//! (`xl/drawings/drawingN.xml`). Each picture is wrapped in an anchor that
//! pins it to a cell; the picture's `<a:blip r:embed>` names the relationship
//! of the drawing part that points at the media file.

pub mod anchor;
pub mod blip;

pub use anchor::{ImageAnchor, parse_anchors};
