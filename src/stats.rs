//! Counters describing how much work a parse did.

use std::collections::{HashMap, HashSet};

use crate::cache::CacheStats;

/// Counters for one named rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleStats {
    /// Times the rule's body was entered.
    pub calls: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Times a memoized result was used instead of running the body.
    pub reused: usize,
    /// Times the body was entered at a position where it had already run.
    pub rescanned: usize,
}

/// Work done by the most recent parse.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    rules: HashMap<&'static str, RuleStats>,
    caches: Vec<(&'static str, CacheStats)>,
    visited: HashSet<(&'static str, usize)>,
}

impl ParseStats {
    pub fn rule(&self, name: &str) -> RuleStats {
        self.rules.get(name).copied().unwrap_or_default()
    }

    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &RuleStats)> + '_ {
        self.rules.iter().map(|(name, stats)| (*name, stats))
    }

    /// Counters of the cache registered under `name`.
    pub fn cache(&self, name: &str) -> Option<CacheStats> {
        self.caches
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, stats)| *stats)
    }

    pub(crate) fn clear(&mut self) {
        self.rules.clear();
        self.caches.clear();
        self.visited.clear();
    }

    pub(crate) fn entered(&mut self, name: &'static str, pos: usize) {
        let stats = self.rules.entry(name).or_default();
        stats.calls += 1;
        if !self.visited.insert((name, pos)) {
            stats.rescanned += 1;
        }
    }

    pub(crate) fn finished(&mut self, name: &'static str, success: bool) {
        let stats = self.rules.entry(name).or_default();
        if success {
            stats.succeeded += 1;
        } else {
            stats.failed += 1;
        }
    }

    pub(crate) fn reused(&mut self, name: &'static str) {
        self.rules.entry(name).or_default().reused += 1;
    }

    pub(crate) fn set_caches(&mut self, caches: Vec<(&'static str, CacheStats)>) {
        self.caches = caches;
    }
}
