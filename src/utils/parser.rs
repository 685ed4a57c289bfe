//! Text extraction primitives built on `regex`.
//!
//! Patterns carry exactly one capture group: the value being read or replaced.

use std::ops::Range;

use regex::Regex;

use crate::error::{Error, Result};

/// Compile a pattern, mapping a bad pattern to a validation error.
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        Error::validation_invalid_argument(
            "pattern",
            format!("Invalid regex pattern '{}': {}", pattern, e),
            None,
            Some(vec![pattern.to_string()]),
        )
    })
}

/// Byte ranges of the first capture group for every match, in order.
pub fn capture_spans(content: &str, re: &Regex) -> Vec<Range<usize>> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.range()))
        .collect()
}

/// Replace the given byte range, leaving every other byte untouched.
pub fn splice(content: &str, span: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() - span.len() + replacement.len());
    out.push_str(&content[..span.start]);
    out.push_str(replacement);
    out.push_str(&content[span.end..]);
    out
}
