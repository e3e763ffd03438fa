// Error types for schema generation

use crate::schema::SchemaType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema generation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort schema generation.
///
/// Generation stops at the first error; there is no partial output.
#[derive(Debug, Error)]
pub enum Error {
    /// A `# @schema` block was opened but never closed
    #[error("unclosed schema block found in comment: {comment}")]
    UnclosedSchemaBlock { comment: String },

    /// The annotation block is not a valid schema document
    #[error("invalid schema annotation: {0}")]
    AnnotationDecode(#[source] serde_json::Error),

    /// A value carries a YAML tag with no JSON Schema counterpart
    #[error("unsupported yaml tag found: {0}")]
    UnsupportedTag(String),

    /// The values file or an annotation is not valid YAML
    #[error(transparent)]
    Yaml(#[from] values_yaml::Error),

    /// A referenced schema file exists but could not be decoded
    #[error("could not load reference '{reference}': {message}")]
    Reference { reference: String, message: String },

    /// The JSON pointer of a reference does not address anything
    #[error("json pointer '{pointer}' not found in '{}'", path.display())]
    PointerNotFound { pointer: String, path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document root is neither a mapping nor empty
    #[error("the values document must be a mapping, found {tag}")]
    InvalidRoot { tag: String },

    /// Unknown names given to skip auto-generation
    #[error("unsupported field names '{}' for skipping auto-generation", fields.join("', '"))]
    UnsupportedSkipFields { fields: Vec<String> },

    /// An explicit annotation failed semantic validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Any of the above, raised while handling the key at `key`
    #[error("error in key '{key}': {source}")]
    AtKey {
        key: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attribute this error to a mapping key, building up a dotted path
    /// as the error travels towards the root.
    pub fn in_key(self, key: &str) -> Self {
        match self {
            Error::AtKey { key: inner, source } => {
                let separator = if inner.starts_with('[') { "" } else { "." };
                Error::AtKey {
                    key: format!("{key}{separator}{inner}"),
                    source,
                }
            }
            err => Error::AtKey {
                key: key.to_string(),
                source: Box::new(err),
            },
        }
    }

    /// Attribute this error to a sequence element.
    pub fn in_index(self, index: usize) -> Self {
        let segment = format!("[{index}]");
        match self {
            Error::AtKey { key: inner, source } => {
                let separator = if inner.starts_with('[') { "" } else { "." };
                Error::AtKey {
                    key: format!("{segment}{separator}{inner}"),
                    source,
                }
            }
            err => Error::AtKey {
                key: segment,
                source: Box::new(err),
            },
        }
    }

    /// The dotted key path this error was raised at, if any.
    pub fn key_path(&self) -> Option<&str> {
        match self {
            Error::AtKey { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The underlying error, without key attribution.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::AtKey { source, .. } => source.root_cause(),
            err => err,
        }
    }
}

/// Semantic violations found by `Schema::validate`.
///
/// Each rule has its own variant; validation stops at the first one.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("schema could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Rejected by the Draft-07 schema compiler
    #[error("schema is not a valid draft-07 schema: {message}")]
    Compile { message: String },

    #[error("unsupported type {type_name}")]
    UnsupportedType { type_name: String },

    #[error("cant use pattern if type is {types}. Use type=string")]
    PatternRequiresString { types: SchemaType },

    #[error("cant use format if type is {types}. Use type=string")]
    FormatRequiresString { types: SchemaType },

    #[error("cant use minLength ({min}) > maxLength ({max})")]
    MinLengthExceedsMaxLength { min: u64, max: u64 },

    #[error("cant use format and pattern option at the same time")]
    FormatWithPattern,

    #[error("cant use items if type is {types}. Use type=array")]
    ItemsRequireArray { types: SchemaType },

    #[error("if your are using const, you can't use type")]
    ConstWithType,

    #[error("if your are using enum, you can't use type")]
    EnumWithType,

    #[error("the format {format} is not supported")]
    UnsupportedFormat { format: String },

    #[error("if you use {keyword}, you cant use type={types}")]
    NumericConstraintRequiresNumber {
        keyword: &'static str,
        types: SchemaType,
    },

    #[error("multipleOf must be greater than 0")]
    MultipleOfNotPositive,

    #[error("you cant set minimum and exclusiveMinimum")]
    MinimumWithExclusiveMinimum,

    #[error("you cant set maximum and exclusiveMaximum")]
    MaximumWithExclusiveMaximum,
}
