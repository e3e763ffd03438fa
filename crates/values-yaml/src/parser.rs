//! YAML parser that builds `YamlNode` trees.

use crate::comment::SourceLines;
use crate::resolve::{self, tags};
use crate::{Error, Result, SourceInfo, YamlHashEntry, YamlNode};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse YAML from a string, producing a `YamlNode` tree.
///
/// Only the first document is parsed. Input without any document (empty,
/// or only comments) yields a `!!null` scalar root.
///
/// # Example
///
/// ```rust
/// use values_yaml::parse;
///
/// let yaml = parse("replicaCount: 3").unwrap();
/// assert!(yaml.is_mapping());
/// assert_eq!(yaml.get("replicaCount").unwrap().tag, "!!int");
/// ```
///
/// # Errors
///
/// Returns an error if the YAML is invalid, uses a non-scalar mapping key,
/// or references an unknown anchor.
pub fn parse(content: &str) -> Result<YamlNode> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename.
///
/// The filename is included in source location information for better
/// error reporting.
pub fn parse_file(content: &str, filename: &str) -> Result<YamlNode> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<YamlNode> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = YamlBuilder::new(content, filename);

    parser
        .load(&mut builder, false) // false = single document only
        .map_err(|err| with_file(Error::from(err), filename))?;

    builder.result()
}

fn with_file(err: Error, filename: Option<&str>) -> Error {
    match (err, filename) {
        (Error::Parse { message, location: Some(loc) }, Some(file)) => Error::Parse {
            message,
            location: Some(loc.with_file(file)),
        },
        (err, _) => err,
    }
}

/// Builder that implements MarkedEventReceiver to construct a `YamlNode`.
struct YamlBuilder<'a> {
    lines: SourceLines<'a>,

    /// Optional filename for source info
    filename: Option<String>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, by anchor id
    anchors: HashMap<usize, YamlNode>,

    /// The completed root node
    root: Option<YamlNode>,

    /// First structural error; later events are ignored once set
    error: Option<Error>,

    /// Last source line of the most recent block scalar; comment lookups
    /// never scan above it
    block_floor: usize,
}

/// A collection being constructed during parsing.
enum BuildNode {
    Sequence {
        start_marker: Marker,
        anchor_id: usize,
        tag: Option<String>,
        items: Vec<YamlNode>,
    },

    Mapping {
        start_marker: Marker,
        anchor_id: usize,
        tag: Option<String>,
        /// (key, head comment, value)
        entries: Vec<(YamlNode, String, Option<YamlNode>)>,
    },
}

impl<'a> YamlBuilder<'a> {
    fn new(source: &'a str, filename: Option<&str>) -> Self {
        Self {
            lines: SourceLines::new(source),
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            error: None,
            block_floor: 0,
        }
    }

    fn result(self) -> Result<YamlNode> {
        let empty = YamlNode::new_scalar("", tags::NULL, self.source_info_at(0, 1, 1, 0));
        match (self.error, self.root) {
            (Some(err), _) => Err(err),
            (None, root) => Ok(root.unwrap_or(empty)),
        }
    }

    fn fail(&mut self, message: impl Into<String>, location: SourceInfo) {
        if self.error.is_none() {
            self.error = Some(Error::InvalidStructure {
                message: message.into(),
                location: Some(location),
            });
        }
    }

    fn source_info_at(&self, offset: usize, line: usize, col: usize, len: usize) -> SourceInfo {
        let info = SourceInfo::new(None, offset, line, col, len);
        match &self.filename {
            Some(filename) => info.with_file(filename.clone()),
            None => info,
        }
    }

    fn make_source_info(&self, marker: &Marker, len: usize) -> SourceInfo {
        let info = SourceInfo::from_marker(marker, len);
        self.source_info_at(info.offset, info.line, info.col, info.len)
    }

    fn remember_anchor(&mut self, anchor_id: usize, node: &YamlNode) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }
    }

    fn push_complete(&mut self, node: YamlNode) {
        let Some(parent) = self.stack.last_mut() else {
            // This is the root
            self.root = Some(node);
            return;
        };

        match parent {
            BuildNode::Sequence { items, .. } => items.push(node),
            BuildNode::Mapping { entries, .. } => match entries.last_mut() {
                Some((_, _, value @ None)) => *value = Some(node),
                _ => {
                    let comment = self.lines.head_comment(
                        node.source_info.line,
                        node.source_info.col,
                        self.block_floor,
                    );
                    entries.push((node, comment, None));
                }
            },
        }
    }

    fn finish_sequence(&mut self, end_marker: &Marker) {
        let Some(BuildNode::Sequence {
            start_marker,
            anchor_id,
            tag,
            items,
        }) = self.stack.pop()
        else {
            let location = self.make_source_info(end_marker, 0);
            self.fail("sequence end without a matching start", location);
            return;
        };

        let len = end_marker.index().saturating_sub(start_marker.index());
        let node = YamlNode::new_sequence(items, tag, self.make_source_info(&start_marker, len));
        self.remember_anchor(anchor_id, &node);
        self.push_complete(node);
    }

    fn finish_mapping(&mut self, end_marker: &Marker) {
        let Some(BuildNode::Mapping {
            start_marker,
            anchor_id,
            tag,
            entries,
        }) = self.stack.pop()
        else {
            let location = self.make_source_info(end_marker, 0);
            self.fail("mapping end without a matching start", location);
            return;
        };

        let mut hash_entries = Vec::with_capacity(entries.len());
        for (key, head_comment, value) in entries {
            if !key.is_scalar() {
                self.fail("mapping keys must be scalars", key.source_info);
                return;
            }
            let Some(value) = value else {
                self.fail("mapping entry without a value", key.source_info);
                return;
            };
            hash_entries.push(YamlHashEntry {
                key,
                value,
                head_comment,
            });
        }

        let len = end_marker.index().saturating_sub(start_marker.index());
        let node = YamlNode::new_mapping(hash_entries, tag, self.make_source_info(&start_marker, len));
        self.remember_anchor(anchor_id, &node);
        self.push_complete(node);
    }
}

fn explicit_tag(tag: Option<Tag>) -> Option<String> {
    tag.map(|t| resolve::normalize_tag(&t.handle, &t.suffix))
}

impl MarkedEventReceiver for YamlBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, style, anchor_id, tag) => {
                let tag = match explicit_tag(tag) {
                    Some(tag) => tag,
                    None if matches!(style, TScalarStyle::Plain) => resolve::resolve_plain(&value).to_string(),
                    None => tags::STR.to_string(),
                };
                if matches!(style, TScalarStyle::Literal | TScalarStyle::Folded) {
                    self.block_floor = self.lines.block_scalar_end(marker.line());
                }
                let source_info = self.make_source_info(&marker, value.chars().count());
                let node = YamlNode::new_scalar(value, tag, source_info);
                self.remember_anchor(anchor_id, &node);
                self.push_complete(node);
            }

            Event::SequenceStart(anchor_id, tag) => {
                self.stack.push(BuildNode::Sequence {
                    start_marker: marker,
                    anchor_id,
                    tag: explicit_tag(tag),
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => self.finish_sequence(&marker),

            Event::MappingStart(anchor_id, tag) => {
                self.stack.push(BuildNode::Mapping {
                    start_marker: marker,
                    anchor_id,
                    tag: explicit_tag(tag),
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => self.finish_mapping(&marker),

            Event::Alias(anchor_id) => match self.anchors.get(&anchor_id).cloned() {
                Some(mut node) => {
                    // the copy lives where the alias was written
                    node.source_info = self.make_source_info(&marker, 0);
                    self.push_complete(node);
                }
                None => {
                    let location = self.make_source_info(&marker, 0);
                    self.fail(format!("unknown anchor (id {anchor_id})"), location);
                }
            },
        }
    }
}
