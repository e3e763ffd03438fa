//! Walk over a parsed values tree that builds the schema document.
//!
//! Each mapping key becomes a property. Its schema starts from the
//! annotation in the key's comment (or a loaded `$ref`), and whatever the
//! author left out is inferred from the value: type, title, description,
//! default, required-ness, nested properties and array items.

use crate::annotation::{parse_comment, strip_helm_docs, strip_leading_paragraphs};
use crate::infer::type_from_tag;
use crate::options::GeneratorOptions;
use crate::reference::resolve_reference;
use crate::schema::{AdditionalProperties, DRAFT_07_SCHEMA, Schema, SchemaType};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::path::Path;
use tracing::trace;
use values_yaml::{NodeKind, YamlHashEntry, YamlNode};

const GLOBAL_KEY: &str = "global";
const GLOBAL_DESCRIPTION: &str = "Global values are values that can be accessed from any chart or subchart by exactly the same name. This is a built-in helm object";

/// Builds a [`Schema`] from a values tree.
///
/// `values_path` is only used to resolve relative `$ref` targets.
pub struct SchemaBuilder<'a> {
    values_path: &'a Path,
    options: &'a GeneratorOptions,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(values_path: &'a Path, options: &'a GeneratorOptions) -> Self {
        Self {
            values_path,
            options,
        }
    }

    /// Build the root schema of a values document.
    ///
    /// The root must be a mapping; an empty document is treated as an empty
    /// mapping.
    pub fn build_document(&self, root: &YamlNode) -> Result<Schema> {
        let skip = &self.options.skip_auto_generation;
        let mut schema = Schema::with_type("object");
        schema.schema = Some(DRAFT_07_SCHEMA.to_string());

        match &root.kind {
            NodeKind::Mapping(entries) => {
                schema.properties = self.build_mapping(entries, schema.required.names_mut(), "")?;
            }
            _ if root.is_null() => {}
            _ => {
                return Err(Error::InvalidRoot {
                    tag: root.tag.clone(),
                });
            }
        }

        // helm lint expects a `global` property on every chart schema
        if !schema.properties.contains_key(GLOBAL_KEY) {
            let mut global = Schema::with_type("object");
            if !skip.title {
                global.title = Some(GLOBAL_KEY.to_string());
            }
            if !skip.description {
                global.description = Some(GLOBAL_DESCRIPTION.to_string());
            }
            schema.properties.insert(GLOBAL_KEY.to_string(), global);
        }

        if !skip.additional_properties {
            schema.additional_properties = Some(AdditionalProperties::Bool(false));
        }

        schema.normalize_required();
        Ok(schema)
    }

    /// Build one property per entry, in source order.
    ///
    /// Keys that end up required are appended to `parent_required`.
    fn build_mapping(
        &self,
        entries: &[YamlHashEntry],
        parent_required: &mut Vec<String>,
        parent_id: &str,
    ) -> Result<IndexMap<String, Schema>> {
        let mut properties = IndexMap::with_capacity(entries.len());
        for entry in entries {
            let key = entry.key.as_scalar().unwrap_or_default();
            let schema = self
                .build_property(key, entry, parent_required, parent_id)
                .map_err(|e| e.in_key(key))?;
            properties.insert(key.to_string(), schema);
        }
        Ok(properties)
    }

    fn build_property(
        &self,
        key: &str,
        entry: &YamlHashEntry,
        parent_required: &mut Vec<String>,
        parent_id: &str,
    ) -> Result<Schema> {
        trace!(key, parent_id, "building property");
        let skip = &self.options.skip_auto_generation;
        let value = &entry.value;

        let comment = if self.options.keep_full_comment {
            entry.head_comment.clone()
        } else {
            strip_leading_paragraphs(&entry.head_comment)
        };
        let parsed = parse_comment(&comment)?;
        let mut schema = parsed.schema;
        let description = if self.options.keep_helm_docs_prefix {
            parsed.description
        } else {
            strip_helm_docs(&parsed.description)
        };

        if let Some(reference) = &schema.reference
            && let Some(loaded) = resolve_reference(reference, self.values_path)?
        {
            schema = loaded;
        }

        if schema.has_data {
            if schema.schema_type.is_empty()
                && schema.const_value.is_none()
                && schema.enum_values.is_none()
            {
                schema.schema_type = type_from_tag(&value.tag)?;
            }
            schema.validate()?;
        } else {
            schema.schema_type = type_from_tag(&value.tag)?;
        }

        let id = if parent_id.is_empty() {
            format!("#/properties/{key}")
        } else {
            format!("{parent_id}/properties/{key}")
        };
        schema.id = Some(id.clone());

        if schema.reference.is_some() {
            return Ok(schema);
        }

        let marker = schema.required.take_marker();
        let required_by_default = marker.is_none()
            && !schema.required.has_names()
            && !skip.required
            && !schema.has_data;
        if (marker == Some(true) || required_by_default) && !parent_required.iter().any(|k| k == key) {
            parent_required.push(key.to_string());
        }

        if !skip.additional_properties
            && value.is_mapping()
            && (!schema.has_data || schema.additional_properties.is_none())
        {
            schema.additional_properties = Some(AdditionalProperties::Bool(false));
        }

        if !skip.title && schema.title.as_deref().is_none_or(str::is_empty) {
            schema.title = Some(key.to_string());
        }
        if !skip.description
            && schema.description.as_deref().is_none_or(str::is_empty)
            && !description.is_empty()
        {
            schema.description = Some(description);
        }

        if !skip.default
            && schema.default.is_none()
            && let Some(raw) = value.as_scalar()
        {
            schema.default = Some(coerce_default(raw, &schema.schema_type));
        }

        match &value.kind {
            NodeKind::Mapping(entries) if schema.properties.is_empty() => {
                schema.properties = self.build_mapping(entries, schema.required.names_mut(), &id)?;
                schema.normalize_required();
            }
            NodeKind::Sequence(items) if schema.items.is_none() => {
                schema.items = Some(Box::new(self.build_items(items, &id)?));
                schema.schema_type = SchemaType::single("array");
                schema.normalize_required();
            }
            _ => {}
        }

        Ok(schema)
    }

    /// Schema for the elements of a sequence.
    ///
    /// One candidate is built per element. If all candidates are equal the
    /// first one is used, otherwise they become `anyOf` members in element
    /// order. An empty sequence allows anything.
    fn build_items(&self, items: &[YamlNode], parent_id: &str) -> Result<Schema> {
        let mut candidates = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let candidate = self
                .build_item(item, parent_id)
                .map_err(|e| e.in_index(index))?;
            candidates.push(candidate);
        }

        let uniform = candidates.windows(2).all(|pair| pair[0] == pair[1]);
        match candidates.len() {
            0 => Ok(Schema::default()),
            _ if uniform => Ok(candidates.swap_remove(0)),
            _ => Ok(Schema {
                any_of: candidates,
                ..Schema::default()
            }),
        }
    }

    fn build_item(&self, item: &YamlNode, parent_id: &str) -> Result<Schema> {
        let skip = &self.options.skip_auto_generation;
        match &item.kind {
            NodeKind::Scalar(_) => Ok(Schema {
                schema_type: type_from_tag(&item.tag)?,
                ..Schema::default()
            }),
            NodeKind::Mapping(entries) => {
                let mut schema = Schema::with_type("object");
                let mut required = Vec::new();
                schema.properties = self.build_mapping(entries, &mut required, parent_id)?;
                for name in &required {
                    schema.required.push_name(name);
                }
                if !skip.additional_properties {
                    schema.additional_properties = Some(AdditionalProperties::Bool(false));
                }
                Ok(schema)
            }
            NodeKind::Sequence(nested) => {
                let mut schema = Schema::with_type("array");
                schema.items = Some(Box::new(self.build_items(nested, parent_id)?));
                Ok(schema)
            }
        }
    }
}

/// Default value for a scalar, typed after the schema's declared types.
///
/// The first declared type the raw text parses as wins. Text that fits
/// none of them is kept as a string.
pub fn coerce_default(raw: &str, types: &SchemaType) -> Value {
    for type_name in types.as_slice() {
        match type_name.as_str() {
            "boolean" => match raw {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            },
            "integer" => {
                if let Ok(int) = raw.parse::<i64>() {
                    return Value::from(int);
                }
                if let Ok(uint) = raw.parse::<u64>() {
                    return Value::from(uint);
                }
            }
            "number" => {
                if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
                    return Value::Number(number);
                }
            }
            _ => {}
        }
    }
    Value::String(raw.to_string())
}
