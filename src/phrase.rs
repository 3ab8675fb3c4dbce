//! Parse-tree nodes and furthest-failure bookkeeping.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::{ExpectedSet, ParseError};
use crate::source::Source;

/// The furthest failure seen inside a node: a position and every label that
/// failed there.
///
/// `pos == None` means nothing has been recorded. `None` orders before every
/// `Some`, so comparisons read the same as for positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    pos: Option<usize>,
    labels: Vec<String>,
}

impl Failure {
    pub fn position(&self) -> Option<usize> {
        self.pos
    }

    /// Labels recorded at `position()`, duplicates included.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_none(&self) -> bool {
        self.pos.is_none()
    }

    pub(crate) fn clear(&mut self) {
        self.pos = None;
        self.labels.clear();
    }

    /// Replace everything with a single label at `pos`.
    pub(crate) fn set(&mut self, label: impl Into<String>, pos: usize) {
        self.labels.clear();
        self.labels.push(label.into());
        self.pos = Some(pos);
    }

    /// Note that `label` failed to match at `cursor`.
    pub(crate) fn record(&mut self, label: impl Into<String>, cursor: usize) {
        let at = Some(cursor);
        if self.pos > at {
            return;
        }
        let label = label.into();
        trace!(label = %label, pos = cursor, "failure recorded");
        if self.pos < at {
            self.set(label, cursor);
        } else {
            self.labels.push(label);
        }
    }

    /// Fold `other` into this record, keeping whichever is further ahead.
    ///
    /// When both records lie behind `cursor`, parsing has already moved
    /// past them successfully and the record is dropped.
    pub(crate) fn merge(&mut self, other: &Failure, cursor: usize) {
        let at = Some(cursor);
        if other.pos < at && self.pos < at {
            self.clear();
            return;
        }
        if other.pos.is_none() || self.pos > other.pos {
            return;
        }
        if self.pos < other.pos {
            self.pos = other.pos;
            self.labels.clear();
        }
        self.labels.extend(other.labels.iter().cloned());
    }

    /// Render as a report, or `None` when nothing was recorded.
    pub fn to_error(&self, source: &dyn Source) -> Option<ParseError> {
        let offset = self.pos?;
        Some(ParseError {
            offset,
            location: source.describe(offset),
            expected: ExpectedSet::from_labels(&self.labels),
        })
    }
}

/// One matched or attempted grammar expression over an input span.
///
/// A phrase for a terminal has an empty rule name. Children are shared
/// through `Rc` so that a memoized result can be attached again without
/// rebuilding it; nothing points back up the tree.
pub struct Phrase<V> {
    name: &'static str,
    diag: &'static str,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) success: bool,
    pub(crate) rhs: Vec<Rc<Phrase<V>>>,
    pub(crate) value: Option<V>,
    pub(crate) failure: Failure,
}

impl<V> Phrase<V> {
    pub(crate) fn new(name: &'static str, diag: &'static str, start: usize) -> Self {
        Phrase {
            name,
            diag,
            start,
            end: start,
            success: false,
            rhs: Vec::new(),
            value: None,
            failure: Failure::default(),
        }
    }

    pub(crate) fn terminal(start: usize, end: usize) -> Self {
        Phrase {
            end,
            success: true,
            ..Phrase::new("", "", start)
        }
    }

    /// Rule name; empty for terminals and inner expressions.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Label used when the phrase itself is reported as expected.
    pub fn diag(&self) -> &'static str {
        self.diag
    }

    pub fn is_a(&self, rule: &str) -> bool {
        self.name == rule
    }

    pub fn is_terminal(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn rhs(&self, i: usize) -> &Phrase<V> {
        &self.rhs[i]
    }

    pub fn rhs_size(&self) -> usize {
        self.rhs.len()
    }

    pub fn children(&self) -> impl Iterator<Item = &Phrase<V>> + '_ {
        self.rhs.iter().map(|p| &**p)
    }

    /// The semantic value written by this phrase's action, if any.
    pub fn get(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    /// The input text covered by this phrase.
    pub fn text<'s>(&self, source: &'s dyn Source) -> Cow<'s, str> {
        source.slice(self.start, self.end)
    }

    /// The `i`-th code point of this phrase's text.
    pub fn char_at(&self, source: &dyn Source, i: usize) -> char {
        source.codepoint_at(self.start + i)
    }

    /// This phrase's own furthest-failure report.
    pub fn error_message(&self, source: &dyn Source) -> Option<String> {
        self.failure.to_error(source).map(|e| e.to_string())
    }
}

impl<V: fmt::Debug> fmt::Debug for Phrase<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phrase")
            .field("name", &self.name)
            .field("span", &(self.start..self.end))
            .field("success", &self.success)
            .field("value", &self.value)
            .field("rhs", &self.rhs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(pos: usize, labels: &[&str]) -> Failure {
        Failure {
            pos: Some(pos),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn record_keeps_furthest() {
        let mut f = Failure::default();
        f.record("'a'", 2);
        f.record("'b'", 2);
        assert_eq!(f, at(2, &["'a'", "'b'"]));

        f.record("'c'", 1);
        assert_eq!(f, at(2, &["'a'", "'b'"]));

        f.record("'d'", 3);
        assert_eq!(f, at(3, &["'d'"]));
    }

    #[test]
    fn merge_is_furthest_wins_in_either_order() {
        let near = at(1, &["'x'"]);
        let far = at(4, &["'y'"]);

        let mut a = near.clone();
        a.merge(&far, 0);
        let mut b = far.clone();
        b.merge(&near, 0);

        assert_eq!(a, at(4, &["'y'"]));
        assert_eq!(b, at(4, &["'y'"]));
    }

    #[test]
    fn merge_appends_on_tie() {
        let mut a = at(2, &["'x'"]);
        a.merge(&at(2, &["'y'", "'x'"]), 2);
        assert_eq!(a, at(2, &["'x'", "'y'", "'x'"]));
    }

    #[test]
    fn merge_drops_stale_records() {
        let mut a = at(1, &["'x'"]);
        a.merge(&at(2, &["'y'"]), 5);
        assert!(a.is_none());
        assert!(a.labels().is_empty());

        // One record at or past the cursor keeps both alive.
        let mut b = at(1, &["'x'"]);
        b.merge(&at(5, &["'y'"]), 5);
        assert_eq!(b, at(5, &["'y'"]));
    }

    #[test]
    fn merge_of_nothing_keeps_current() {
        let mut a = at(3, &["'x'"]);
        a.merge(&Failure::default(), 2);
        assert_eq!(a, at(3, &["'x'"]));
    }

    #[test]
    fn terminal_phrase_shape() {
        let p: Phrase<()> = Phrase::terminal(2, 5);
        assert!(p.is_terminal());
        assert!(p.is_success());
        assert_eq!((p.start(), p.end()), (2, 5));
        assert_eq!(p.rhs_size(), 0);
        assert!(p.get().is_none());
    }
}
