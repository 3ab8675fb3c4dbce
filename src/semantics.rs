//! Semantic actions and the view they get of an accepted rule.

use std::collections::HashMap;
use std::fmt;

use crate::phrase::Phrase;
use crate::source::Source;

type Action<V> = Box<dyn Fn(&mut Rule<'_, V>) + Send + Sync>;

/// One action per rule name, run each time that rule is accepted.
///
/// Actions compute a value for the accepted phrase from its right-hand
/// side and store it with `Rule::put`; they cannot influence parsing.
pub struct Semantics<V> {
    actions: HashMap<&'static str, Action<V>>,
}

impl<V> Semantics<V> {
    pub fn new() -> Self {
        Semantics {
            actions: HashMap::new(),
        }
    }

    /// Register `action` for `rule`, replacing any earlier one.
    pub fn on<F>(mut self, rule: &'static str, action: F) -> Self
    where
        F: Fn(&mut Rule<'_, V>) + Send + Sync + 'static,
    {
        self.actions.insert(rule, Box::new(action));
        self
    }

    pub fn has_action(&self, rule: &str) -> bool {
        self.actions.contains_key(rule)
    }

    pub(crate) fn dispatch(&self, phrase: &mut Phrase<V>, source: &dyn Source) {
        if let Some(action) = self.actions.get(phrase.name()) {
            action(&mut Rule { phrase, source });
        }
    }
}

impl<V> Default for Semantics<V> {
    fn default() -> Self {
        Semantics::new()
    }
}

impl<V> fmt::Debug for Semantics<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<_> = self.actions.keys().collect();
        rules.sort();
        f.debug_struct("Semantics").field("rules", &rules).finish()
    }
}

/// The rule whose action is running: its phrase as left-hand side, and
/// the phrases it matched as right-hand side, numbered from 0.
pub struct Rule<'p, V> {
    phrase: &'p mut Phrase<V>,
    source: &'p dyn Source,
}

impl<'p, V> Rule<'p, V> {
    pub fn lhs(&self) -> &Phrase<V> {
        &*self.phrase
    }

    /// Set the left-hand side's semantic value.
    pub fn put(&mut self, value: V) {
        self.phrase.value = Some(value);
    }

    pub fn rhs_size(&self) -> usize {
        self.phrase.rhs_size()
    }

    /// The `i`-th right-hand side phrase, `0 <= i < rhs_size()`.
    pub fn rhs(&self, i: usize) -> &Phrase<V> {
        self.phrase.rhs(i)
    }

    /// Text covered by right-hand side phrases `i` through `j - 1`.
    pub fn rhs_text(&self, i: usize, j: usize) -> String {
        if j <= i {
            return String::new();
        }
        self.source
            .slice(self.rhs(i).start(), self.rhs(j - 1).end())
            .into_owned()
    }

    /// Text covered by the whole left-hand side.
    pub fn text(&self) -> String {
        self.phrase.text(self.source).into_owned()
    }

    /// Text covered by any phrase of this parse.
    pub fn text_of(&self, phrase: &Phrase<V>) -> String {
        phrase.text(self.source).into_owned()
    }

    pub fn source(&self) -> &dyn Source {
        self.source
    }
}
