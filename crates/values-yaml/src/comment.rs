//! Head comment extraction.
//!
//! yaml-rust2 drops comments while scanning, so they are recovered from the
//! source text using the position of each mapping key.

/// Source text split into lines, for comment lookups by line number.
pub(crate) struct SourceLines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceLines<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
        }
    }

    /// Last line (1-based) of the block scalar whose `|`/`>` indicator is
    /// on `indicator_line`.
    ///
    /// The first non-blank line after the indicator sets the content
    /// indentation, provided it is deeper than the indicator line. The
    /// block runs until a non-blank line is indented less than that. An
    /// empty block ends on the indicator line itself.
    pub(crate) fn block_scalar_end(&self, indicator_line: usize) -> usize {
        let Some(first) = indicator_line.checked_sub(1).and_then(|idx| self.lines.get(idx)) else {
            return indicator_line;
        };
        let parent_indent = indentation(first);
        let mut content_indent = None;
        let mut end = indicator_line;
        for (idx, text) in self.lines.iter().enumerate().skip(indicator_line) {
            if text.trim().is_empty() {
                continue;
            }
            let indent = indentation(text);
            let required = *content_indent.get_or_insert(indent);
            if indent <= parent_indent || indent < required {
                break;
            }
            end = idx + 1;
        }
        end
    }

    /// Collect the comment block directly above a key.
    ///
    /// `line` is 1-based, `col` is 1-based in characters. Keys that share
    /// their line with earlier content (flow mappings, `key: {a: 1}`) have
    /// no head comment. A leading `- ` sequence indicator is allowed.
    ///
    /// The scan upwards stops at the first content line, at a comment
    /// indented deeper than the key (it trails the previous block), and at
    /// `floor`, the last line of any block scalar above the key.
    pub(crate) fn head_comment(&self, line: usize, col: usize, floor: usize) -> String {
        let Some(key_line) = line.checked_sub(1).and_then(|idx| self.lines.get(idx)) else {
            return String::new();
        };
        let prefix: String = key_line.chars().take(col.saturating_sub(1)).collect();
        if !prefix.chars().all(|c| c == ' ' || c == '\t' || c == '-') {
            return String::new();
        }
        let key_indent = prefix.chars().count();

        let mut collected = Vec::new();
        for text in self.lines[floor.min(line - 1)..line - 1].iter().rev() {
            let trimmed = text.trim_start();
            if trimmed.is_empty() {
                collected.push("");
            } else if trimmed.starts_with('#') && indentation(text) <= key_indent {
                collected.push(trimmed.trim_end());
            } else {
                break;
            }
        }
        collected.reverse();

        let start = collected.iter().position(|l| !l.is_empty());
        let end = collected.iter().rposition(|l| !l.is_empty());
        match (start, end) {
            (Some(start), Some(end)) => collected[start..=end].join("\n"),
            _ => String::new(),
        }
    }
}

fn indentation(text: &str) -> usize {
    text.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}
