// Loading of `$ref` targets that live next to the values file

use crate::schema::Schema;
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A `$ref` split into its file part and optional JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub path: &'a str,
    pub pointer: Option<&'a str>,
}

impl<'a> Reference<'a> {
    pub fn parse(reference: &'a str) -> Self {
        match reference.split_once('#') {
            Some((path, pointer)) => Reference {
                path,
                pointer: Some(pointer),
            },
            None => Reference {
                path: reference,
                pointer: None,
            },
        }
    }

    /// The file this reference points at, relative to `values_path`.
    ///
    /// `None` for local (`#/...`) references, URLs and absolute paths; those
    /// are left for whoever consumes the generated document.
    fn local_file(&self, values_path: &Path) -> Option<PathBuf> {
        if self.path.is_empty() || self.path.contains("://") || Path::new(self.path).is_absolute() {
            return None;
        }
        let dir = values_path.parent().unwrap_or_else(|| Path::new(""));
        Some(dir.join(self.path))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn decode_document(reference: &str, path: &Path, content: &str) -> Result<Value> {
    if is_yaml(path) {
        let root = values_yaml::parse_file(content, &path.to_string_lossy())?;
        return Ok(root.to_json());
    }
    serde_json::from_str(content).map_err(|e| Error::Reference {
        reference: reference.to_string(),
        message: e.to_string(),
    })
}

/// Load the schema a `$ref` points to.
///
/// Returns `Ok(None)` when the reference cannot be resolved locally: it is
/// a URL, an absolute path, a local pointer, a file that does not exist or
/// an empty file. The caller then keeps the `$ref` as written. A file that
/// exists but cannot be read or decoded is an error.
pub fn resolve_reference(reference: &str, values_path: &Path) -> Result<Option<Schema>> {
    let parsed = Reference::parse(reference);
    let Some(path) = parsed.local_file(values_path) else {
        debug!(reference, "reference is not a relative file, leaving it unresolved");
        return Ok(None);
    };
    if !path.is_file() {
        debug!(reference, path = %path.display(), "referenced file not found, leaving it unresolved");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    if content.is_empty() {
        debug!(reference, path = %path.display(), "referenced file is empty");
        return Ok(None);
    }

    let document = decode_document(reference, &path, &content)?;
    let target = match parsed.pointer {
        Some(pointer) => document
            .pointer(pointer)
            .ok_or_else(|| Error::PointerNotFound {
                pointer: pointer.to_string(),
                path: path.clone(),
            })?,
        None => &document,
    };

    let mut schema = Schema::from_value(target).map_err(|e| Error::Reference {
        reference: reference.to_string(),
        message: e.to_string(),
    })?;
    schema.has_data = true;

    debug!(reference, path = %path.display(), "loaded referenced schema");
    Ok(Some(schema))
}
