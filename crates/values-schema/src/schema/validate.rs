// Semantic checks for explicitly authored schemas

use super::{SUPPORTED_TYPES, Schema};
use crate::error::ValidationError;
use jsonschema::{Retrieve, Uri};
use serde_json::Value;

/// Values accepted for the `format` keyword.
pub const SUPPORTED_FORMATS: [&str; 19] = [
    "date-time",
    "time",
    "date",
    "duration",
    "email",
    "idn-email",
    "hostname",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "uuid",
    "uri",
    "uri-reference",
    "iri",
    "iri-reference",
    "uri-template",
    "json-pointer",
    "relative-json-pointer",
    "regex",
];

/// Answers every remote lookup with the empty schema.
///
/// References are resolved by the generator itself or left for the
/// consumer of the document; the compile check only looks at syntax.
struct PermissiveRetriever;

impl Retrieve for PermissiveRetriever {
    fn retrieve(
        &self,
        _uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Value::Object(Default::default()))
    }
}

fn strip_identifiers(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("$ref");
            map.remove("$id");
            map.values_mut().for_each(strip_identifiers);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_identifiers),
        _ => {}
    }
}

fn check_compiles(schema: &Schema) -> Result<(), ValidationError> {
    let mut value = schema.to_json_value()?;
    strip_identifiers(&mut value);
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .with_retriever(PermissiveRetriever)
        .build(&value)
        .map_err(|e| ValidationError::Compile {
            message: e.to_string(),
        })?;
    Ok(())
}

impl Schema {
    /// Check an explicitly authored schema.
    ///
    /// The serialized form must first be accepted by a Draft-07 compiler.
    /// After that, keyword combinations the compiler tolerates but which
    /// make no sense for a values file are rejected. Checks stop at the
    /// first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_compiles(self)?;
        self.check_rules()
    }

    fn check_rules(&self) -> Result<(), ValidationError> {
        let types = &self.schema_type;

        if let Some(unknown) = types
            .as_slice()
            .iter()
            .find(|t| !SUPPORTED_TYPES.contains(&t.as_str()))
        {
            return Err(ValidationError::UnsupportedType {
                type_name: unknown.clone(),
            });
        }

        let untyped_or = |name: &str| types.is_empty() || types.matches(name);

        if self.pattern.is_some() && !untyped_or("string") {
            return Err(ValidationError::PatternRequiresString {
                types: types.clone(),
            });
        }

        if self.format.is_some() && !untyped_or("string") {
            return Err(ValidationError::FormatRequiresString {
                types: types.clone(),
            });
        }

        if let (Some(min), Some(max)) = (self.min_length, self.max_length)
            && min > max
        {
            return Err(ValidationError::MinLengthExceedsMaxLength { min, max });
        }

        if self.format.is_some() && self.pattern.is_some() {
            return Err(ValidationError::FormatWithPattern);
        }

        if let Some(items) = &self.items {
            items.check_rules()?;
            if !untyped_or("array") {
                return Err(ValidationError::ItemsRequireArray {
                    types: types.clone(),
                });
            }
        }

        if self.const_value.is_some() && !types.is_empty() {
            return Err(ValidationError::ConstWithType);
        }
        if self.enum_values.is_some() && !types.is_empty() {
            return Err(ValidationError::EnumWithType);
        }

        if let Some(format) = &self.format
            && !SUPPORTED_FORMATS.contains(&format.as_str())
        {
            return Err(ValidationError::UnsupportedFormat {
                format: format.clone(),
            });
        }

        let numeric = [
            ("minimum", self.minimum.is_some()),
            ("maximum", self.maximum.is_some()),
            ("exclusiveMinimum", self.exclusive_minimum.is_some()),
            ("exclusiveMaximum", self.exclusive_maximum.is_some()),
            ("multipleOf", self.multiple_of.is_some()),
        ];
        if let Some((keyword, _)) = numeric.iter().find(|(_, set)| *set)
            && !(untyped_or("number") || types.matches("integer"))
        {
            return Err(ValidationError::NumericConstraintRequiresNumber {
                keyword: *keyword,
                types: types.clone(),
            });
        }

        if let Some(multiple_of) = &self.multiple_of
            && multiple_of.as_f64().is_none_or(|m| m <= 0.0)
        {
            return Err(ValidationError::MultipleOfNotPositive);
        }

        if self.minimum.is_some() && self.exclusive_minimum.is_some() {
            return Err(ValidationError::MinimumWithExclusiveMinimum);
        }
        if self.maximum.is_some() && self.exclusive_maximum.is_some() {
            return Err(ValidationError::MaximumWithExclusiveMaximum);
        }

        Ok(())
    }
}
