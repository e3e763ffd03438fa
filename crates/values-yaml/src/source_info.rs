//! Source location information for YAML nodes.

use serde::{Deserialize, Serialize};

/// Position of a YAML element in the original source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Optional filename or source identifier
    pub file: Option<String>,

    /// Character offset from start of source (0-based)
    pub offset: usize,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters not bytes)
    pub col: usize,

    /// Length in characters
    pub len: usize,
}

impl SourceInfo {
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize, len: usize) -> Self {
        Self {
            file,
            offset,
            line,
            col,
            len,
        }
    }

    /// Create a SourceInfo from a yaml-rust2 marker.
    ///
    /// yaml-rust2 reports lines 1-based and columns 0-based.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker, len: usize) -> Self {
        Self {
            file: None,
            offset: marker.index(),
            line: marker.line(),
            col: marker.col() + 1,
            len,
        }
    }

    /// Set the filename for this source location.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Get the end offset (exclusive) of this location.
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            file: None,
            offset: 0,
            line: 1,
            col: 1,
            len: 0,
        }
    }
}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.col),
            None => write!(f, "{}:{}", self.line, self.col),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_info_creation() {
        let info = SourceInfo::new(Some("values.yaml".into()), 10, 2, 5, 8);
        assert_eq!(info.file, Some("values.yaml".into()));
        assert_eq!(info.end_offset(), 18);
    }

    #[test]
    fn test_display() {
        let info = SourceInfo::new(None, 0, 3, 7, 1);
        assert_eq!(info.to_string(), "3:7");
        assert_eq!(info.with_file("values.yaml").to_string(), "values.yaml:3:7");
    }
}
