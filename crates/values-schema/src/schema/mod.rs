//! In-memory JSON Schema model.
//!
//! [`Schema`] holds the subset of Draft-07 keywords the generator supports,
//! plus custom `x-` annotations that are inlined next to the standard keys
//! when serialized. The model is decoded from annotation blocks and
//! referenced schema files, and encoded into the final document.

mod required;
mod validate;

pub use validate::SUPPORTED_FORMATS;

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Dialect URI written to the document root.
pub const DRAFT_07_SCHEMA: &str = "http://json-schema.org/draft-07/schema#";

/// Prefix that marks a custom annotation key.
pub const CUSTOM_ANNOTATION_PREFIX: &str = "x-";

/// Type names a schema may declare.
pub const SUPPORTED_TYPES: [&str; 7] = ["object", "string", "integer", "number", "array", "null", "boolean"];

/// One node of a JSON Schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `path[#pointer]` of an external schema that replaces this node
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "SchemaType::is_empty")]
    pub schema_type: SchemaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub write_only: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub pattern_properties: IndexMap<String, Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(skip_serializing_if = "Required::is_empty")]
    pub required: Required,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, Dependency>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,

    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub then: Option<Box<Schema>>,

    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<Box<Schema>>,

    #[serde(flatten)]
    pub custom_annotations: CustomAnnotations,

    /// Set when the content came from an explicit annotation or a loaded
    /// reference rather than being inferred. Never serialized.
    #[serde(skip)]
    pub has_data: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Schema {
    /// A schema declaring exactly one type.
    pub fn with_type(type_name: &str) -> Self {
        Self {
            schema_type: SchemaType::single(type_name),
            ..Self::default()
        }
    }

    /// Decode a schema from a generic structured value.
    ///
    /// Unknown keys are dropped unless they carry the `x-` prefix, in which
    /// case they are kept as custom annotations.
    pub fn from_value(value: &Value) -> std::result::Result<Self, serde_json::Error> {
        Schema::deserialize(value)
    }

    /// Decode a schema written as YAML, as found in annotation blocks.
    ///
    /// A document with no content decodes to an empty schema.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let root = values_yaml::parse(text)?;
        if root.is_null() {
            return Ok(Schema::default());
        }
        Schema::from_value(&root.to_json()).map_err(Error::AnnotationDecode)
    }

    pub fn to_json_value(&self) -> std::result::Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_string(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The `type` keyword: one or more type names.
///
/// Serialized as a plain string when exactly one type is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaType(Vec<String>);

impl SchemaType {
    pub fn single(type_name: &str) -> Self {
        Self(vec![type_name.to_string()])
    }

    pub fn new(types: Vec<String>) -> Self {
        Self(types)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, type_name: &str) -> bool {
        self.0.iter().any(|t| t == type_name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            many => write!(f, "[{}]", many.join(", ")),
        }
    }
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawType {
            Single(String),
            Many(Vec<Option<String>>),
        }

        let types = match Option::<RawType>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(RawType::Single(single)) => vec![single],
            // a YAML null inside the list means the "null" type
            Some(RawType::Many(many)) => many
                .into_iter()
                .map(|t| t.unwrap_or_else(|| "null".to_string()))
                .collect(),
        };
        Ok(SchemaType(types.into_iter().filter(|t| !t.is_empty()).collect()))
    }
}

/// The `required` keyword in its two forms.
///
/// While a tree is being built, a node may carry `Marker(true)`, meaning
/// "my parent must list me as required". The required normalizer turns
/// markers into `Names` on the parent; only `Names` is ever serialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Required {
    Marker(bool),
    Names(Vec<String>),
}

impl Default for Required {
    fn default() -> Self {
        Required::Names(Vec::new())
    }
}

impl Required {
    /// Nothing to emit: a marker, or an empty name list.
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    pub fn has_names(&self) -> bool {
        !self.names().is_empty()
    }

    pub fn marker(&self) -> Option<bool> {
        match self {
            Required::Marker(marker) => Some(*marker),
            Required::Names(_) => None,
        }
    }

    /// Remove the marker, leaving an empty name list in its place.
    pub fn take_marker(&mut self) -> Option<bool> {
        let marker = self.marker();
        if marker.is_some() {
            *self = Required::Names(Vec::new());
        }
        marker
    }

    pub fn names(&self) -> &[String] {
        match self {
            Required::Marker(_) => &[],
            Required::Names(names) => names,
        }
    }

    /// The name list, replacing a marker with an empty list first.
    pub fn names_mut(&mut self) -> &mut Vec<String> {
        if let Required::Marker(_) = self {
            *self = Required::Names(Vec::new());
        }
        match self {
            Required::Names(names) => names,
            Required::Marker(_) => unreachable!("marker was just replaced"),
        }
    }

    /// Append a name unless it is already listed.
    pub fn push_name(&mut self, name: &str) {
        let names = self.names_mut();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    /// Drop all names. A marker is left untouched.
    pub fn clear_names(&mut self) {
        if let Required::Names(names) = self {
            names.clear();
        }
    }
}

impl Serialize for Required {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

/// The `additionalProperties` keyword: a flag or a schema for extra keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// One entry of the `dependencies` keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    /// Properties that must be present alongside the key
    Properties(Vec<String>),
    /// Schema the whole object must satisfy when the key is present
    Schema(Box<Schema>),
}

/// Custom `x-` annotations, inlined next to the standard keys on output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomAnnotations(IndexMap<String, Value>);

impl CustomAnnotations {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert an annotation. Keys without the `x-` prefix are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if !key.starts_with(CUSTOM_ANNOTATION_PREFIX) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl Serialize for CustomAnnotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CustomAnnotations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut all = IndexMap::<String, Value>::deserialize(deserializer)?;
        all.retain(|key, _| key.starts_with(CUSTOM_ANNOTATION_PREFIX));
        Ok(CustomAnnotations(all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_type_serializes_single_as_string() {
        let schema = Schema::with_type("string");
        assert_eq!(schema.to_json_value().unwrap(), json!({"type": "string"}));

        let schema = Schema {
            schema_type: SchemaType::new(vec!["string".into(), "null".into()]),
            ..Schema::default()
        };
        assert_eq!(
            schema.to_json_value().unwrap(),
            json!({"type": ["string", "null"]})
        );
    }

    #[test]
    fn test_type_accepts_string_or_list() {
        let schema = Schema::from_yaml_str("type: [string, null]").unwrap();
        assert_eq!(schema.schema_type.as_slice(), ["string", "null"]);

        let schema = Schema::from_yaml_str("type: integer").unwrap();
        assert_eq!(schema.schema_type, SchemaType::single("integer"));
    }

    #[test]
    fn test_required_forms() {
        let schema = Schema::from_yaml_str("required: true").unwrap();
        assert_eq!(schema.required, Required::Marker(true));

        let schema = Schema::from_yaml_str("required: [a, b]").unwrap();
        assert_eq!(schema.required.names(), ["a", "b"]);

        assert!(Schema::from_yaml_str("required: 3").is_err());
    }

    #[test]
    fn test_marker_is_never_serialized() {
        let mut schema = Schema::with_type("string");
        schema.required = Required::Marker(true);
        assert_eq!(schema.to_json_value().unwrap(), json!({"type": "string"}));
    }

    #[test]
    fn test_required_push_and_take() {
        let mut required = Required::Marker(true);
        assert_eq!(required.take_marker(), Some(true));
        assert_eq!(required, Required::Names(vec![]));
        required.push_name("a");
        required.push_name("b");
        required.push_name("a");
        assert_eq!(required.names(), ["a", "b"]);
        assert_eq!(required.take_marker(), None);
    }

    #[test]
    fn test_custom_annotations_are_inlined() {
        let schema = Schema::from_yaml_str(
            "type: string\nx-ui-hint: password\nx-order: 3\nunknownKey: dropped\n",
        )
        .unwrap();
        assert_eq!(schema.custom_annotations.len(), 2);
        assert_eq!(
            schema.to_json_value().unwrap(),
            json!({"type": "string", "x-ui-hint": "password", "x-order": 3})
        );
    }

    #[test]
    fn test_nested_schemas_decode() {
        let schema = Schema::from_yaml_str(
            r#"
type: object
properties:
  name:
    type: string
    x-label: Name
additionalProperties:
  type: integer
dependencies:
  name: [age]
anyOf:
  - required: [name]
"#,
        )
        .unwrap();
        assert_eq!(
            schema.properties["name"].custom_annotations.get("x-label"),
            Some(&json!("Name"))
        );
        assert!(matches!(
            schema.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
        assert_eq!(
            schema.dependencies["name"],
            Dependency::Properties(vec!["age".into()])
        );
        assert_eq!(schema.any_of[0].required.names(), ["name"]);
    }

    #[test]
    fn test_reserialize_roundtrip_is_stable() {
        let text = r#"
type: object
title: Image
properties:
  tag:
    type: [string, "null"]
    pattern: ^v
    x-doc: tag
required: [tag]
if:
  properties:
    tag:
      const: latest
then:
  required: [tag]
"#;
        let first = Schema::from_yaml_str(text).unwrap();
        let second = Schema::from_value(&first.to_json_value().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_annotation_document() {
        let schema = Schema::from_yaml_str("").unwrap();
        assert_eq!(schema, Schema::default());
    }

    #[test]
    fn test_non_mapping_annotation_is_rejected() {
        let err = Schema::from_yaml_str("- a\n- b").unwrap_err();
        assert!(matches!(err, Error::AnnotationDecode(_)));
    }
}
