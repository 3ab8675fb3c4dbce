//! Parse error reporting

use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for setup-time operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures that happen before any input is matched.
#[derive(Error, Debug)]
pub enum Error {
    /// Memoization capacity outside the supported range.
    #[error("memoization capacity {capacity} is outside range 0-{max}")]
    MemoCapacity { capacity: usize, max: usize },

    /// The input could not be read.
    #[error("failed to read source `{}`: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Prefix marking a label as something that must not appear.
pub(crate) const NOT_PREFIX: &str = "not ";

/// The labels that failed to match at the furthest failure position,
/// deduplicated in first-seen order.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ExpectedSet {
    labels: Vec<String>,
}

impl ExpectedSet {
    pub(crate) fn from_labels<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let mut set = ExpectedSet::default();
        for label in labels {
            if !set.labels.contains(label) {
                set.labels.push(label.clone());
            }
        }
        set
    }

    /// All labels, positive and negative, in first-seen order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(String::as_str)
    }

    /// Labels of things that were expected.
    pub fn expected(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens().filter(|l| !l.starts_with(NOT_PREFIX))
    }

    /// Labels of things that were present but must not be, without the
    /// `not ` prefix.
    pub fn not_expected(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens().filter_map(|l| l.strip_prefix(NOT_PREFIX))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn write_alternatives<'a>(
    fmt: &mut fmt::Formatter,
    mut items: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    if let Some(first) = items.next() {
        write!(fmt, "{}", first)?;
    }
    for item in items {
        write!(fmt, " or {}", item)?;
    }
    Ok(())
}

impl Display for ExpectedSet {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let has_positive = self.expected().next().is_some();
        let has_negative = self.not_expected().next().is_some();

        if !has_positive && !has_negative {
            return write!(fmt, "expected <unreported>");
        }
        if has_positive {
            write!(fmt, "expected ")?;
            write_alternatives(fmt, self.expected())?;
            if has_negative {
                write!(fmt, "; ")?;
            }
        }
        if has_negative {
            write!(fmt, "not expected ")?;
            write_alternatives(fmt, self.not_expected())?;
        }
        Ok(())
    }
}

/// A parse failure.
#[derive(Error, PartialEq, Eq, Debug, Clone)]
#[error("{location}: {expected}")]
pub struct ParseError {
    /// The furthest position the parser reached in the input before failing.
    pub offset: usize,

    /// Human-readable locator of `offset`, from `Source::describe`.
    pub location: String,

    /// The set of labels that failed to match at that position.
    pub expected: ExpectedSet,
}
