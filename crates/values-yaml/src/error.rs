//! Error types for YAML parsing with source locations.

use crate::SourceInfo;
use thiserror::Error;

/// Result type alias for values-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during YAML parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// YAML syntax error
    #[error("parse error: {message}")]
    Parse {
        message: String,
        location: Option<SourceInfo>,
    },

    /// Well-formed YAML this crate cannot represent (complex keys, dangling aliases)
    #[error("invalid YAML structure: {message}{}", location_suffix(.location))]
    InvalidStructure {
        message: String,
        location: Option<SourceInfo>,
    },
}

fn location_suffix(location: &Option<SourceInfo>) -> String {
    location
        .as_ref()
        .map(|loc| format!(" (at {})", loc))
        .unwrap_or_default()
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = err.marker();
        Error::Parse {
            message: err.to_string(),
            location: Some(SourceInfo::from_marker(marker, 0)),
        }
    }
}
