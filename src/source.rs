//! Input text as seen by the parser.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Number of characters quoted before a position by `StrSource::describe`.
const DESCRIBE_WINDOW: usize = 15;

/// Text addressed by code-point index.
///
/// Implemented once per input representation. The parser only asks for
/// `slice(i, j)` with `0 <= i <= j <= length()` and `codepoint_at(i)` with
/// `i < length()`.
pub trait Source {
    /// Number of code points in the input.
    fn length(&self) -> usize;

    /// Text between code-point positions `i` and `j`.
    fn slice(&self, i: usize, j: usize) -> Cow<'_, str>;

    /// The code point at position `i`.
    fn codepoint_at(&self, i: usize) -> char;

    /// Short human-readable locator for `pos`, used as the prefix of error
    /// reports.
    fn describe(&self, pos: usize) -> String;
}

/// An in-memory `Source` over a string.
#[derive(Debug, Clone)]
pub struct StrSource {
    text: String,
    /// Byte offset of every code point, plus one entry for the end.
    offsets: Vec<usize>,
}

impl StrSource {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        StrSource { text, offsets }
    }

    /// Read a whole file as the parser input.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(StrSource::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<&str> for StrSource {
    fn from(text: &str) -> Self {
        StrSource::new(text)
    }
}

impl From<String> for StrSource {
    fn from(text: String) -> Self {
        StrSource::new(text)
    }
}

impl Source for StrSource {
    fn length(&self) -> usize {
        self.offsets.len() - 1
    }

    fn slice(&self, i: usize, j: usize) -> Cow<'_, str> {
        Cow::Borrowed(&self.text[self.offsets[i]..self.offsets[j]])
    }

    fn codepoint_at(&self, i: usize) -> char {
        self.text[self.offsets[i]..].chars().next().unwrap_or('\0')
    }

    fn describe(&self, pos: usize) -> String {
        if pos > DESCRIBE_WINDOW {
            format!("after '...{}'", printable(&self.slice(pos - DESCRIBE_WINDOW, pos)))
        } else if pos > 0 {
            format!("after '{}'", printable(&self.slice(0, pos)))
        } else {
            "at start".to_string()
        }
    }
}

/// Escape control characters so a locator stays on one line.
fn printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_debug());
        } else {
            out.push(c);
        }
    }
    out
}
