//! Parsing of the comment attached to a values key.
//!
//! A comment holds free-text documentation and, optionally, an annotation
//! block delimited by two `# @schema` lines:
//!
//! ```yaml
//! # -- Number of replicas
//! # @schema
//! # type: integer
//! # minimum: 1
//! # @schema
//! replicaCount: 3
//! ```
//!
//! The block is decoded as a [`Schema`]; the remaining lines become the
//! description.

use crate::schema::Schema;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

const SCHEMA_MARKER: &str = "# @schema";
const COMMENT_LEADER: char = '#';

static LEADING_PARAGRAPHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(?m)(?:.*\n{2,})+").expect("valid regex"));

static HELM_DOCS_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)(\r\n|\r|\n)?\s*@\w+(\s+--\s)?[^\n\r]*").expect("valid regex")
});

static HELM_DOCS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^--\s?").expect("valid regex"));

/// Result of [`parse_comment`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedComment {
    /// Decoded annotation block; `has_data` is set when a block was present.
    pub schema: Schema,
    /// Comment lines outside the block, comment leader removed.
    pub description: String,
}

/// Keep only the last paragraph of a comment.
///
/// Everything up to the last blank line goes, so file headers and section
/// banners above a key do not end up in its description.
pub fn strip_leading_paragraphs(comment: &str) -> String {
    LEADING_PARAGRAPHS.replace_all(comment, "").into_owned()
}

/// Remove helm-docs `@tag` lines and `-- ` description prefixes.
pub fn strip_helm_docs(description: &str) -> String {
    let without_tags = HELM_DOCS_TAGS.replace_all(description, "");
    HELM_DOCS_PREFIX.replace_all(&without_tags, "").into_owned()
}

/// Split a comment into its annotation block and its description.
///
/// Fails when a block is opened and never closed, or when the block is
/// not a valid schema document.
pub fn parse_comment(comment: &str) -> Result<ParsedComment> {
    let mut description = Vec::new();
    let mut raw_schema = Vec::new();
    let mut inside_block = false;
    let mut has_data = false;

    for line in comment.lines() {
        if line.trim_end() == SCHEMA_MARKER {
            inside_block = !inside_block;
            continue;
        }
        if inside_block {
            let content = line.strip_prefix(COMMENT_LEADER).unwrap_or(line);
            let content = content.strip_prefix(COMMENT_LEADER).unwrap_or(content);
            raw_schema.push(content.strip_prefix(' ').unwrap_or(content));
            has_data = true;
        } else {
            let content = line.strip_prefix(COMMENT_LEADER).unwrap_or(line);
            description.push(content.strip_prefix(' ').unwrap_or(content));
        }
    }

    if inside_block {
        return Err(Error::UnclosedSchemaBlock {
            comment: comment.to_string(),
        });
    }

    let mut schema = Schema::from_yaml_str(&raw_schema.join("\n"))?;
    schema.has_data = has_data;

    Ok(ParsedComment {
        schema,
        description: description.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_comment_is_description() {
        let parsed = parse_comment("# number of replicas\n#second line").unwrap();
        assert!(!parsed.schema.has_data);
        assert_eq!(parsed.schema, Schema::default());
        assert_eq!(parsed.description, "number of replicas\nsecond line");
    }

    #[test]
    fn test_schema_block() {
        let parsed = parse_comment(
            "# Port to listen on\n# @schema\n# type: integer\n# minimum: 1\n# @schema",
        )
        .unwrap();
        assert!(parsed.schema.has_data);
        assert_eq!(parsed.schema.schema_type, SchemaType::single("integer"));
        assert_eq!(parsed.schema.minimum, Some(1.into()));
        assert_eq!(parsed.description, "Port to listen on");
    }

    #[test]
    fn test_block_keeps_nested_indentation() {
        let parsed = parse_comment(
            "# @schema\n# type: object\n# properties:\n#   name:\n#     type: string\n## x-note: double hash\n# @schema",
        )
        .unwrap();
        assert_eq!(
            parsed.schema.properties["name"].schema_type,
            SchemaType::single("string")
        );
        assert!(parsed.schema.custom_annotations.get("x-note").is_some());
    }

    #[test]
    fn test_marker_must_match_whole_line() {
        let parsed = parse_comment(
            "# @schemas are documented below\n# @schema \n# type: string\n# @schema",
        )
        .unwrap();
        assert!(parsed.schema.has_data);
        assert_eq!(parsed.description, "@schemas are documented below");
        assert_eq!(parsed.schema.schema_type, SchemaType::single("string"));
    }

    #[test]
    fn test_empty_block_still_counts_as_data() {
        let parsed = parse_comment("# @schema\n#\n# @schema").unwrap();
        assert!(parsed.schema.has_data);
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_comment("# @schema\n# type: string").unwrap_err();
        assert!(matches!(err, Error::UnclosedSchemaBlock { .. }));
    }

    #[test]
    fn test_invalid_block() {
        let err = parse_comment("# @schema\n# required: 5\n# @schema").unwrap_err();
        assert!(matches!(err, Error::AnnotationDecode(_)));

        let err = parse_comment("# @schema\n# type: [string\n# @schema").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_strip_leading_paragraphs() {
        assert_eq!(
            strip_leading_paragraphs("# header\n# more\n\n# section\n\n# the key"),
            "# the key"
        );
        assert_eq!(strip_leading_paragraphs("# only one"), "# only one");
    }

    #[test]
    fn test_strip_helm_docs() {
        assert_eq!(strip_helm_docs("-- The image tag"), "The image tag");
        assert_eq!(
            strip_helm_docs("-- Replicas\n@default -- 3\nmore text"),
            "Replicas\nmore text"
        );
        assert_eq!(strip_helm_docs("@ignored"), "");
    }
}
