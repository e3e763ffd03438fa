// Mapping from resolved YAML tags to JSON Schema types

use crate::schema::SchemaType;
use crate::{Error, Result};
use values_yaml::tags;

/// The JSON Schema type for a node carrying `tag`.
///
/// Timestamps are strings on the JSON side. Any tag outside the YAML core
/// schema is an error rather than a silent fallback.
pub fn type_from_tag(tag: &str) -> Result<SchemaType> {
    let type_name = match tag {
        tags::NULL => "null",
        tags::BOOL => "boolean",
        tags::STR | tags::TIMESTAMP => "string",
        tags::INT => "integer",
        tags::FLOAT => "number",
        tags::SEQ => "array",
        tags::MAP => "object",
        other => return Err(Error::UnsupportedTag(other.to_string())),
    };
    Ok(SchemaType::single(type_name))
}
