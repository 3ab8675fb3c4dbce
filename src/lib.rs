//! Runtime for parsers generated from Parsing Expression Grammars.
//!
//! A generated parser is a set of procedures, one per rule and per inner
//! expression, that drive a [`Parser`] through its primitives. The parser
//! builds a tree of [`Phrase`]s while it matches, backtracks when an
//! alternative fails, optionally reuses results saved in small per-rule
//! caches, and keeps the furthest failure seen so that a failed parse
//! produces one [`ParseError`] naming what was expected there.
//!
//! ```
//! use peg_engine::{Parser, ParserConfig, Semantics, StrSource, Terminal};
//!
//! // Number = [0-9]+
//! fn number(p: &mut Parser<'_, u64>) -> bool {
//!     p.begin("Number");
//!     if !p.next(Terminal::InRange('0', '9')) {
//!         return p.reject();
//!     }
//!     while p.next(Terminal::InRange('0', '9')) {}
//!     p.accept()
//! }
//!
//! let semantics = Semantics::<u64>::new().on("Number", |rule| {
//!     let value = rule.text().parse().unwrap_or(0);
//!     rule.put(value);
//! });
//!
//! let source = StrSource::new("1234");
//! let mut parser = Parser::new(&source, &semantics, ParserConfig::new());
//! let tree = parser.parse(number).unwrap();
//! assert_eq!(tree.get(), Some(&1234));
//!
//! let source = StrSource::new("");
//! let mut parser = Parser::new(&source, &semantics, ParserConfig::new());
//! let err = parser.parse(number).unwrap_err();
//! assert_eq!(err.to_string(), "at start: expected [0-9]");
//! ```

mod cache;
mod config;
pub mod error;
mod parser;
mod phrase;
mod semantics;
mod source;
mod stats;
mod terminal;

pub use cache::{CacheId, CacheStats};
pub use config::{ParserConfig, MAX_MEMO};
pub use error::{Error, ExpectedSet, ParseError, Result};
pub use parser::Parser;
pub use phrase::{Failure, Phrase};
pub use semantics::{Rule, Semantics};
pub use source::{Source, StrSource};
pub use stats::{ParseStats, RuleStats};
pub use terminal::Terminal;
