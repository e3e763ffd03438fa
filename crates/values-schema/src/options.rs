// Generator configuration

use crate::Error;
use serde::Deserialize;

/// Switches that control how much of the schema is inferred.
///
/// Deserializes from camelCase keys with every field optional, so it can
/// be embedded in a larger tool configuration:
///
/// ```
/// use values_schema::GeneratorOptions;
///
/// let options: GeneratorOptions = serde_json::from_str(
///     r#"{"keepFullComment": true, "skipAutoGeneration": ["title", "default"]}"#,
/// ).unwrap();
/// assert!(options.keep_full_comment);
/// assert!(options.skip_auto_generation.title);
/// assert!(!options.skip_auto_generation.required);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// Use the whole head comment of a key, not just its last paragraph
    pub keep_full_comment: bool,
    /// Keep helm-docs `@tag` lines and `-- ` prefixes in descriptions
    pub keep_helm_docs_prefix: bool,
    pub skip_auto_generation: SkipAutoGeneration,
}

/// Keywords the generator must not fill in on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct SkipAutoGeneration {
    pub title: bool,
    pub description: bool,
    pub required: bool,
    pub default: bool,
    pub additional_properties: bool,
}

impl SkipAutoGeneration {
    pub const FIELD_NAMES: [&'static str; 5] =
        ["title", "description", "required", "default", "additionalProperties"];

    /// Build from keyword names.
    ///
    /// Every unknown name is reported in a single error.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, Error> {
        let mut skip = SkipAutoGeneration::default();
        let mut unknown = Vec::new();
        for field in fields {
            match field.as_ref() {
                "title" => skip.title = true,
                "description" => skip.description = true,
                "required" => skip.required = true,
                "default" => skip.default = true,
                "additionalProperties" => skip.additional_properties = true,
                other => unknown.push(other.to_string()),
            }
        }
        if unknown.is_empty() {
            Ok(skip)
        } else {
            Err(Error::UnsupportedSkipFields { fields: unknown })
        }
    }
}

impl TryFrom<Vec<String>> for SkipAutoGeneration {
    type Error = Error;

    fn try_from(fields: Vec<String>) -> Result<Self, Self::Error> {
        SkipAutoGeneration::from_fields(&fields)
    }
}
