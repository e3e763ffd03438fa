//! # values-yaml
//!
//! YAML parsing for configuration files that carry documentation in comments.
//!
//! This crate provides [`YamlNode`], an owned tree in which every node keeps
//! the tag the decoder resolved for it and its source location, and every
//! mapping entry keeps the comment block written directly above its key.
//! Anchors are expanded, so consumers never see aliases.
//!
//! ## Example
//!
//! ```rust
//! use values_yaml::parse;
//!
//! let content = "# number of replicas\nreplicaCount: 3\n";
//!
//! let yaml = parse(content).unwrap();
//! let entry = yaml.get_entry("replicaCount").unwrap();
//! assert_eq!(entry.head_comment, "# number of replicas");
//! assert_eq!(entry.value.tag, "!!int");
//! ```

mod comment;
mod error;
mod node;
mod parser;
pub mod resolve;
mod source_info;

pub use error::{Error, Result};
pub use node::{NodeKind, YamlHashEntry, YamlNode};
pub use parser::{parse, parse_file};
pub use resolve::tags;
pub use source_info::SourceInfo;
