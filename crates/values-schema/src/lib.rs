//! # values-schema
//!
//! Generates a JSON Schema (Draft-07) from a commented YAML values file.
//!
//! Every key of the values file becomes a property. Types, titles,
//! descriptions, defaults, required lists, nested properties and array
//! items are inferred from the values and their comments. Authors refine
//! the result with `# @schema` blocks in the comment above a key, or point
//! to an existing schema with `$ref`.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//! use values_schema::{GeneratorOptions, generate};
//!
//! let values = "# number of replicas\nreplicaCount: 3\n";
//! let schema = generate(Path::new("values.yaml"), values, &GeneratorOptions::default()).unwrap();
//!
//! let replicas = &schema.properties["replicaCount"];
//! assert_eq!(replicas.description.as_deref(), Some("number of replicas"));
//! assert_eq!(schema.required.names(), ["replicaCount"]);
//! ```

pub mod annotation;
mod error;
pub mod infer;
mod options;
pub mod reference;
pub mod schema;
mod transform;

pub use error::{Error, Result, ValidationError};
pub use options::{GeneratorOptions, SkipAutoGeneration};
pub use schema::{AdditionalProperties, Dependency, Required, Schema, SchemaType};
pub use transform::{SchemaBuilder, coerce_default};

use std::path::Path;

/// Generate the schema for values `content` read from `values_path`.
///
/// `values_path` names the file in error messages and anchors relative
/// `$ref` targets; the file itself is not read.
pub fn generate(values_path: &Path, content: &str, options: &GeneratorOptions) -> Result<Schema> {
    let root = values_yaml::parse_file(content, &values_path.to_string_lossy())?;
    SchemaBuilder::new(values_path, options).build_document(&root)
}

/// Read a values file and generate its schema.
pub fn generate_from_file(values_path: &Path, options: &GeneratorOptions) -> Result<Schema> {
    let content = std::fs::read_to_string(values_path).map_err(|source| Error::Io {
        path: values_path.to_path_buf(),
        source,
    })?;
    generate(values_path, &content.replace("\r\n", "\n"), options)
}
