//! Owned YAML node tree with resolved tags and source tracking.

use crate::SourceInfo;
use crate::resolve::{self, tags};
use serde_json::{Map, Number, Value};

/// A YAML node with its resolved tag and source location.
///
/// Unlike a plain value tree, every node remembers the tag the decoder
/// resolved for it (`!!int`, `!!str`, `!!map`, ...) and the raw scalar text,
/// so later stages can both infer types and recover the author's spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode {
    pub kind: NodeKind,

    /// Resolved short tag, e.g. `!!str` or a local tag like `!path`.
    pub tag: String,

    /// Source location for this node.
    pub source_info: SourceInfo,
}

/// Shape of a YAML node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Raw scalar text as written (without quotes)
    Scalar(String),

    /// Sequence elements in order
    Sequence(Vec<YamlNode>),

    /// Mapping entries in source order
    Mapping(Vec<YamlHashEntry>),
}

/// A key-value pair in a YAML mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlHashEntry {
    pub key: YamlNode,
    pub value: YamlNode,

    /// Comment lines directly above the key, with the indentation removed.
    ///
    /// Blank lines between comment blocks are kept as empty lines, so
    /// separate paragraphs are joined by `"\n\n"`.
    pub head_comment: String,
}

impl YamlNode {
    pub fn new_scalar(value: impl Into<String>, tag: impl Into<String>, source_info: SourceInfo) -> Self {
        Self {
            kind: NodeKind::Scalar(value.into()),
            tag: tag.into(),
            source_info,
        }
    }

    pub fn new_sequence(items: Vec<YamlNode>, tag: Option<String>, source_info: SourceInfo) -> Self {
        Self {
            kind: NodeKind::Sequence(items),
            tag: tag.unwrap_or_else(|| tags::SEQ.to_string()),
            source_info,
        }
    }

    pub fn new_mapping(entries: Vec<YamlHashEntry>, tag: Option<String>, source_info: SourceInfo) -> Self {
        Self {
            kind: NodeKind::Mapping(entries),
            tag: tag.unwrap_or_else(|| tags::MAP.to_string()),
            source_info,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    pub fn is_null(&self) -> bool {
        self.tag == tags::NULL
    }

    /// Raw text of a scalar node.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[YamlNode]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[YamlHashEntry]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a mapping value by its key text.
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        self.as_mapping()?
            .iter()
            .find(|entry| entry.key.as_scalar() == Some(key))
            .map(|entry| &entry.value)
    }

    /// Look up a mapping entry by its key text.
    pub fn get_entry(&self, key: &str) -> Option<&YamlHashEntry> {
        self.as_mapping()?
            .iter()
            .find(|entry| entry.key.as_scalar() == Some(key))
    }

    /// Number of children (sequence length or mapping entry count).
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Scalar(_) => 0,
            NodeKind::Sequence(items) => items.len(),
            NodeKind::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert the tree into a generic JSON value, honoring resolved tags.
    ///
    /// Integers that do not fit `i64`/`u64` and non-finite floats fall back
    /// to their source text. Mapping keys are always stringified.
    pub fn to_json(&self) -> Value {
        match &self.kind {
            NodeKind::Scalar(raw) => scalar_to_json(raw, &self.tag),
            NodeKind::Sequence(items) => Value::Array(items.iter().map(YamlNode::to_json).collect()),
            NodeKind::Mapping(entries) => {
                let mut map = Map::new();
                for entry in entries {
                    let key = entry.key.as_scalar().unwrap_or_default().to_string();
                    map.insert(key, entry.value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

fn scalar_to_json(raw: &str, tag: &str) -> Value {
    match tag {
        tags::NULL => Value::Null,
        tags::BOOL => match resolve::parse_bool(raw) {
            Some(b) => Value::Bool(b),
            None => Value::String(raw.to_string()),
        },
        tags::INT => match (resolve::parse_int(raw), resolve::parse_uint(raw)) {
            (Some(i), _) => Value::Number(i.into()),
            (None, Some(u)) => Value::Number(u.into()),
            (None, None) => Value::String(raw.to_string()),
        },
        tags::FLOAT => resolve::parse_float(raw)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}
