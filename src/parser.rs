//! The backtracking engine called by generated rule procedures.

use std::mem;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::cache::{Cache, CacheId, Lookup};
use crate::config::ParserConfig;
use crate::error::{ExpectedSet, ParseError, NOT_PREFIX};
use crate::phrase::{Failure, Phrase};
use crate::semantics::Semantics;
use crate::source::Source;
use crate::stats::ParseStats;
use crate::terminal::Terminal;

/// An open phrase and, when it was opened by `saved`, the cache slot that
/// receives its final state.
struct Frame<V> {
    phrase: Phrase<V>,
    memo: Option<(CacheId, u64)>,
}

/// Parser state for one input.
///
/// Generated rule procedures drive it with a fixed pattern: open a phrase
/// with `begin` (or `saved` for memoized rules), match the body with the
/// terminal and predicate primitives and nested procedures, then close it
/// with `accept` or `reject`. Every primitive returns whether it matched,
/// so ordered choice is plain `||` over alternatives.
///
/// Rejecting restores the cursor; a failed terminal never moves it.
pub struct Parser<'a, V> {
    source: &'a dyn Source,
    semantics: &'a Semantics<V>,
    config: ParserConfig,
    pos: usize,
    end: usize,
    /// Receives the root rule's phrase; open phrases are stacked above it.
    top: Phrase<V>,
    open: Vec<Frame<V>>,
    reuse: Option<Rc<Phrase<V>>>,
    caches: Vec<Cache<V>>,
    stats: ParseStats,
}

impl<'a, V> Parser<'a, V> {
    pub fn new(source: &'a dyn Source, semantics: &'a Semantics<V>, config: ParserConfig) -> Self {
        Parser {
            source,
            semantics,
            config,
            pos: 0,
            end: source.length(),
            top: Phrase::new("", "", 0),
            open: Vec::new(),
            reuse: None,
            caches: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    /// Register the memo table of one rule procedure.
    pub fn add_cache(&mut self, name: &'static str, diag: &'static str) -> CacheId {
        let mut cache = Cache::new(name, diag);
        cache.reset(self.config.memo());
        self.caches.push(cache);
        CacheId(self.caches.len() - 1)
    }

    /// Run `root` over the whole input from a clean state.
    ///
    /// On success returns the root rule's phrase. On failure returns the
    /// furthest-failure report collected over every alternative tried.
    pub fn parse<F>(&mut self, root: F) -> Result<Rc<Phrase<V>>, ParseError>
    where
        F: FnOnce(&mut Self) -> bool,
    {
        self.reset();
        debug!(length = self.end, memo = self.config.memo(), "parse started");

        let matched = root(self);
        assert!(
            self.open.is_empty(),
            "root procedure returned with {} phrase(s) still open",
            self.open.len()
        );
        let caches = self.caches.iter().map(|c| (c.name(), c.stats())).collect();
        self.stats.set_caches(caches);

        let mut top = mem::replace(&mut self.top, Phrase::new("", "", 0));
        if matched {
            debug!(end = self.pos, "parse succeeded");
            if top.rhs.len() == 1 {
                if let Some(root) = top.rhs.pop() {
                    return Ok(root);
                }
            }
            top.end = self.pos;
            top.success = true;
            return Ok(Rc::new(top));
        }

        let err = top.failure.to_error(self.source).unwrap_or_else(|| ParseError {
            offset: self.pos,
            location: self.source.describe(self.pos),
            expected: ExpectedSet::default(),
        });
        debug!(error = %err, "parse failed");
        Err(err)
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.end = self.source.length();
        self.top = Phrase::new("", "", 0);
        self.open.clear();
        self.reuse = None;
        let memo = self.config.memo();
        for cache in &mut self.caches {
            cache.reset(memo);
        }
        self.stats.clear();
    }

    /// Current input position, in code points.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn source(&self) -> &'a dyn Source {
        self.source
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Counters of the most recent parse.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    fn current(&mut self) -> &mut Phrase<V> {
        match self.open.last_mut() {
            Some(frame) => &mut frame.phrase,
            None => &mut self.top,
        }
    }

    fn pop(&mut self) -> Frame<V> {
        match self.open.pop() {
            Some(frame) => frame,
            None => panic!("no open phrase to close: begin and accept/reject calls are unbalanced"),
        }
    }

    /// Append a successful phrase to the current one.
    fn attach(&mut self, phrase: Rc<Phrase<V>>) {
        let pos = self.pos;
        let current = self.current();
        current.end = pos;
        current.failure.merge(&phrase.failure, pos);
        current.rhs.push(phrase);
    }

    fn merge_up(&mut self, failure: &Failure) {
        let pos = self.pos;
        self.current().failure.merge(failure, pos);
    }

    fn remember(&mut self, memo: Option<(CacheId, u64)>, phrase: Phrase<V>) {
        if let Some((id, serial)) = memo {
            self.caches[id.0].fill(serial, &Rc::new(phrase));
        }
    }

    fn closed(&mut self, phrase: &Phrase<V>) {
        let inner = phrase.name().is_empty();
        let rule = if inner { phrase.diag() } else { phrase.name() };
        trace!(
            rule,
            inner,
            start = phrase.start,
            end = phrase.end,
            success = phrase.success,
            "closed"
        );
        if !inner {
            self.stats.finished(phrase.name(), phrase.success);
        }
    }

    //------------------------------------------------------------------
    //  Sequencing
    //------------------------------------------------------------------

    /// Open a phrase for rule `name` at the cursor.
    pub fn begin(&mut self, name: &'static str) {
        self.begin_with_diag(name, name);
    }

    /// Open a phrase for an inner expression, reported as `diag`.
    pub fn begin_inner(&mut self, diag: &'static str) {
        self.begin_with_diag("", diag);
    }

    pub fn begin_with_diag(&mut self, name: &'static str, diag: &'static str) {
        let inner = name.is_empty();
        let rule = if inner { diag } else { name };
        trace!(rule, inner, start = self.pos, "begin");
        if !inner {
            self.stats.entered(name, self.pos);
        }
        self.open.push(Frame {
            phrase: Phrase::new(name, diag, self.pos),
            memo: None,
        });
    }

    /// Close the current phrase as matched and append it to its parent.
    ///
    /// The rule's semantic action runs here, while the right-hand side is
    /// still attached; afterwards only the phrase itself is kept.
    pub fn accept(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        phrase.end = self.pos;
        phrase.success = true;
        self.semantics.dispatch(&mut phrase, self.source);
        phrase.rhs.clear();
        self.closed(&phrase);

        let phrase = Rc::new(phrase);
        if let Some((id, serial)) = memo {
            self.caches[id.0].fill(serial, &phrase);
        }
        self.attach(phrase);
        true
    }

    /// Close the current phrase as matched, moving its children into the
    /// parent instead of nesting it.
    pub fn accept_inner(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        phrase.end = self.pos;
        phrase.success = true;
        self.closed(&phrase);

        let pos = self.pos;
        let current = self.current();
        current.end = pos;
        current.rhs.extend(phrase.rhs.iter().cloned());
        current.failure.merge(&phrase.failure, pos);
        self.remember(memo, phrase);
        true
    }

    /// Close the current phrase as failed and backtrack to its start.
    pub fn reject(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        self.pos = phrase.start;
        phrase.end = phrase.start;
        phrase.rhs.clear();
        phrase.success = false;
        if phrase.failure.position() < Some(phrase.start) && !phrase.diag().is_empty() {
            phrase.failure.set(phrase.diag(), phrase.start);
        }
        self.closed(&phrase);
        self.merge_up(&phrase.failure);
        self.remember(memo, phrase);
        false
    }

    /// Close the current inner phrase as failed and backtrack to its start.
    pub fn reject_inner(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        self.pos = phrase.start;
        phrase.end = phrase.start;
        phrase.rhs.clear();
        phrase.success = false;
        self.closed(&phrase);
        self.merge_up(&phrase.failure);
        self.remember(memo, phrase);
        false
    }

    //------------------------------------------------------------------
    //  Predicates
    //
    //  The argument's own failures never reach the report: a predicate
    //  that fails registers its own label at the point of call.
    //------------------------------------------------------------------

    /// Close `&e` whose argument matched: succeed without consuming.
    pub fn accept_and(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        self.pos = phrase.start;
        phrase.end = phrase.start;
        phrase.rhs.clear();
        phrase.failure.clear();
        phrase.success = true;
        self.closed(&phrase);
        self.remember(memo, phrase);
        true
    }

    /// Close `&e` whose argument failed: report the predicate's label as
    /// expected at the point of call.
    pub fn reject_and(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        self.pos = phrase.start;
        phrase.end = phrase.start;
        phrase.rhs.clear();
        phrase.failure.set(phrase.diag(), phrase.start);
        phrase.success = false;
        self.closed(&phrase);
        self.merge_up(&phrase.failure);
        self.remember(memo, phrase);
        false
    }

    /// Close `!e` whose argument failed: succeed without consuming.
    pub fn accept_not(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        self.pos = phrase.start;
        phrase.end = phrase.start;
        phrase.rhs.clear();
        phrase.failure.clear();
        phrase.success = true;
        self.closed(&phrase);
        self.remember(memo, phrase);
        true
    }

    /// Close `!e` whose argument matched: backtrack and report the
    /// predicate's label as not expected.
    pub fn reject_not(&mut self) -> bool {
        let Frame { mut phrase, memo } = self.pop();
        self.pos = phrase.start;
        phrase.end = phrase.start;
        phrase.rhs.clear();
        phrase.failure.set(format!("{}{}", NOT_PREFIX, phrase.diag()), phrase.start);
        phrase.success = false;
        self.closed(&phrase);
        self.merge_up(&phrase.failure);
        self.remember(memo, phrase);
        false
    }

    //------------------------------------------------------------------
    //  Terminals
    //------------------------------------------------------------------

    /// Match `terminal` at the cursor and consume it.
    pub fn next(&mut self, terminal: Terminal<'_>) -> bool {
        if matches!(terminal, Terminal::End) {
            return self.ahead(terminal);
        }
        match terminal.matches(self.source, self.pos) {
            Some(len) => {
                self.consume(len);
                true
            }
            None => self.fail(&terminal),
        }
    }

    /// `&t`: check that `terminal` matches without consuming it.
    pub fn ahead(&mut self, terminal: Terminal<'_>) -> bool {
        match terminal.matches(self.source, self.pos) {
            Some(_) => true,
            None => self.fail(&terminal),
        }
    }

    /// `!t`: check that `terminal` does not match, without consuming.
    pub fn ahead_not(&mut self, terminal: Terminal<'_>) -> bool {
        match terminal.matches(self.source, self.pos) {
            Some(_) => self.fail(&terminal.negate()),
            None => true,
        }
    }

    fn consume(&mut self, len: usize) {
        let start = self.pos;
        self.pos += len;
        debug_assert!(self.pos <= self.end);
        let pos = self.pos;
        let current = self.current();
        current.rhs.push(Rc::new(Phrase::terminal(start, pos)));
        current.end = pos;
    }

    fn fail(&mut self, terminal: &Terminal<'_>) -> bool {
        let pos = self.pos;
        self.current().failure.record(terminal.to_string(), pos);
        false
    }

    //------------------------------------------------------------------
    //  Memoization
    //------------------------------------------------------------------

    /// Look for a saved result of `cache`'s rule at the cursor.
    ///
    /// On a hit, returns `true` and the caller finishes with `reuse`. On a
    /// miss, opens the rule's phrase, reserves a cache slot for it, and
    /// returns `false`; the caller then runs the body as usual.
    pub fn saved(&mut self, cache: CacheId) -> bool {
        self.saved_as(cache, false)
    }

    /// `saved` for a memoized inner expression; finish a hit with
    /// `reuse_inner` or `reuse_predicate`.
    pub fn saved_inner(&mut self, cache: CacheId) -> bool {
        self.saved_as(cache, true)
    }

    fn saved_as(&mut self, id: CacheId, inner: bool) -> bool {
        let pos = self.pos;
        let cache = &mut self.caches[id.0];
        let (name, diag) = (cache.name(), cache.diag());
        let rule = if inner { "" } else { name };

        let found = match cache.find(pos) {
            Lookup::Hit(phrase) => {
                debug!(cache = name, pos, success = phrase.is_success(), "reusing saved result");
                Some(phrase)
            }
            Lookup::Pending => {
                debug!(cache = name, pos, "re-entered before finishing; left recursion fails here");
                Some(Rc::new(Phrase::new(rule, diag, pos)))
            }
            Lookup::Miss => None,
        };
        if let Some(phrase) = found {
            if !rule.is_empty() {
                self.stats.reused(rule);
            }
            self.reuse = Some(phrase);
            return true;
        }

        let serial = cache.save(pos);
        self.begin_with_diag(rule, diag);
        if let (Some(serial), Some(frame)) = (serial, self.open.last_mut()) {
            frame.memo = Some((id, serial));
        }
        false
    }

    fn take_reuse(&mut self) -> Rc<Phrase<V>> {
        match self.reuse.take() {
            Some(phrase) => phrase,
            None => panic!("reuse called without a preceding cache hit"),
        }
    }

    /// Apply a saved rule result as if the rule had just been parsed.
    pub fn reuse(&mut self) -> bool {
        let saved = self.take_reuse();
        if saved.success {
            self.pos = saved.end;
            self.attach(saved);
            true
        } else {
            self.merge_up(&saved.failure);
            false
        }
    }

    /// Apply a saved inner result, splicing its children into the current
    /// phrase.
    pub fn reuse_inner(&mut self) -> bool {
        let saved = self.take_reuse();
        if saved.success {
            self.pos = saved.end;
            let pos = self.pos;
            let current = self.current();
            current.end = pos;
            current.rhs.extend(saved.rhs.iter().cloned());
            current.failure.merge(&saved.failure, pos);
            true
        } else {
            self.merge_up(&saved.failure);
            false
        }
    }

    /// Apply a saved predicate outcome. Predicates never consume.
    pub fn reuse_predicate(&mut self) -> bool {
        let saved = self.take_reuse();
        if saved.success {
            true
        } else {
            self.merge_up(&saved.failure);
            false
        }
    }
}
