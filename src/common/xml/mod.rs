//! Small XML helpers shared by the part readers.

mod escape;
mod text;

pub use escape::unescape_xml;
pub use text::{TextBuffer, attr_local};
