//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from internal
//! error types to the unified Error type.

use super::types::Error;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        Error::from_opc_error(err)
    }
}

impl Error {
    pub(crate) fn from_opc_error(err: OpcError) -> Self {
        match err {
            OpcError::PackageCorrupt(s) => Error::PackageCorrupt(s),
            OpcError::ZipError(e) => Error::PackageCorrupt(e.to_string()),
            OpcError::IoError(e) => Error::Io(e),
            OpcError::XmlError(s) => Error::XmlError(s),
            OpcError::QuickXmlError(e) => Error::XmlError(e.to_string()),
            OpcError::AttrError(s) => Error::XmlError(s),
            _ => Error::XmlError(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}
