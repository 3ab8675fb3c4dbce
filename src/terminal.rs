//! Character-level terminals.

use std::fmt;

use crate::source::Source;

/// One terminal expression of a grammar.
///
/// The `Display` form is the label reported when the terminal fails to
/// match, e.g. `'c'`, `not [a-z]` or `end of text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal<'t> {
    /// `'c'`
    Char(char),
    /// `^'c'`: any code point except `c`.
    NotChar(char),
    /// `"s"`
    Str(&'t str),
    /// `^"s"`: one code point, where the input does not start with `s`.
    NotStr(&'t str),
    /// `[s]`: any code point listed in `s`.
    InSet(&'t str),
    /// `^[s]`
    NotInSet(&'t str),
    /// `[a-z]`
    InRange(char, char),
    /// `^[a-z]`
    NotInRange(char, char),
    /// `_`
    Any,
    /// `!_`: end of input. Never consumes.
    End,
}

impl<'t> Terminal<'t> {
    /// Number of code points this terminal consumes at `pos`, or `None` if
    /// it does not match there.
    pub fn matches(&self, source: &dyn Source, pos: usize) -> Option<usize> {
        let end = source.length();
        let next = if pos < end {
            Some(source.codepoint_at(pos))
        } else {
            None
        };
        let one_if = |ok: bool| if ok { Some(1) } else { None };

        match *self {
            Terminal::Char(c) => one_if(next == Some(c)),
            Terminal::NotChar(c) => one_if(next.map_or(false, |n| n != c)),
            Terminal::Str(s) => starts_with(source, pos, s),
            Terminal::NotStr(s) => one_if(next.is_some() && starts_with(source, pos, s).is_none()),
            Terminal::InSet(set) => one_if(next.map_or(false, |n| set.contains(n))),
            Terminal::NotInSet(set) => one_if(next.map_or(false, |n| !set.contains(n))),
            Terminal::InRange(a, z) => one_if(next.map_or(false, |n| a <= n && n <= z)),
            Terminal::NotInRange(a, z) => one_if(next.map_or(false, |n| n < a || z < n)),
            Terminal::Any => one_if(next.is_some()),
            Terminal::End => {
                if next.is_none() {
                    Some(0)
                } else {
                    None
                }
            }
        }
    }

    /// The terminal matching exactly where this one does not, as far as
    /// labels are concerned.
    pub fn negate(&self) -> Terminal<'t> {
        match *self {
            Terminal::Char(c) => Terminal::NotChar(c),
            Terminal::NotChar(c) => Terminal::Char(c),
            Terminal::Str(s) => Terminal::NotStr(s),
            Terminal::NotStr(s) => Terminal::Str(s),
            Terminal::InSet(s) => Terminal::NotInSet(s),
            Terminal::NotInSet(s) => Terminal::InSet(s),
            Terminal::InRange(a, z) => Terminal::NotInRange(a, z),
            Terminal::NotInRange(a, z) => Terminal::InRange(a, z),
            Terminal::Any => Terminal::End,
            Terminal::End => Terminal::Any,
        }
    }
}

fn starts_with(source: &dyn Source, pos: usize, s: &str) -> Option<usize> {
    let end = source.length();
    let mut at = pos;
    for c in s.chars() {
        if at >= end || source.codepoint_at(at) != c {
            return None;
        }
        at += 1;
    }
    Some(at - pos)
}

impl fmt::Display for Terminal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Terminal::Char(c) => write!(f, "'{}'", c.escape_debug()),
            Terminal::NotChar(c) => write!(f, "not '{}'", c.escape_debug()),
            Terminal::Str(s) => write!(f, "\"{}\"", s.escape_debug()),
            Terminal::NotStr(s) => write!(f, "not \"{}\"", s.escape_debug()),
            Terminal::InSet(s) => write!(f, "[{}]", s.escape_debug()),
            Terminal::NotInSet(s) => write!(f, "not [{}]", s.escape_debug()),
            Terminal::InRange(a, z) => write!(f, "[{}-{}]", a.escape_debug(), z.escape_debug()),
            Terminal::NotInRange(a, z) => {
                write!(f, "not [{}-{}]", a.escape_debug(), z.escape_debug())
            }
            Terminal::Any => write!(f, "any character"),
            Terminal::End => write!(f, "end of text"),
        }
    }
}
