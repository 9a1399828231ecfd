//! YAML front-matter fence detection and raw splitting.
//!
//! Splitting is purely positional: the body is handed back as the exact byte
//! range after the closing fence line, so a split → reassemble round trip
//! never disturbs body content.

use brainguide_shared::{BrainGuideError, Result};
use serde_yaml::{Mapping, Value};

/// Split content into a front-matter block and the raw body.
///
/// The file must open with a `---` fence line; the block runs to the next
/// `---` fence line. Returns `Ok(None)` when the file has no front-matter
/// block at all, and an error when a block opens but never closes.
pub fn split_front_matter(input: &str) -> Result<Option<(&str, &str)>> {
    let Some(block_start) = opening_fence_end(input) else {
        return Ok(None);
    };

    let mut cursor = block_start;
    while cursor < input.len() {
        let line_end = match input[cursor..].find('\n') {
            Some(pos) => cursor + pos + 1,
            None => input.len(),
        };

        if is_fence(&input[cursor..line_end]) {
            let block = &input[block_start..cursor];
            let body = &input[line_end..];
            return Ok(Some((block, body)));
        }

        cursor = line_end;
    }

    Err(BrainGuideError::malformed(
        "unterminated front-matter block: expected closing `---`",
    ))
}

/// Parse a raw front-matter block into an insertion-ordered mapping.
pub fn parse_mapping(block: &str) -> Result<Mapping> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value = serde_yaml::from_str(block)
        .map_err(|e| BrainGuideError::malformed(e.to_string()))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(BrainGuideError::malformed(
            "front matter must be a YAML mapping at the top level",
        )),
    }
}

/// Byte offset just past the opening fence line, if the input starts with one.
fn opening_fence_end(input: &str) -> Option<usize> {
    let line_end = match input.find('\n') {
        Some(pos) => pos + 1,
        None => input.len(),
    };
    is_fence(&input[..line_end]).then_some(line_end)
}

/// A fence line is `---` alone, tolerating CRLF endings.
fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}
