//! Bounded per-rule memo tables.

use std::rc::Rc;

use tracing::debug;

use crate::phrase::Phrase;

/// Handle to a cache registered with a `Parser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheId(pub(crate) usize);

/// Counters for one cache over one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: usize,
    pub hits: usize,
    pub saves: usize,
    pub evictions: usize,
}

/// A saved result. `phrase` stays `None` while the rule that owns the slot
/// is still being parsed.
struct Slot<V> {
    start: usize,
    serial: u64,
    phrase: Option<Rc<Phrase<V>>>,
}

/// What a lookup found.
pub(crate) enum Lookup<V> {
    Miss,
    /// A finished result for this position.
    Hit(Rc<Phrase<V>>),
    /// The rule is being parsed at this very position right now.
    Pending,
}

/// Results of one memoized rule at the most recent start positions.
///
/// A fixed ring of slots: once full, each save overwrites the oldest slot
/// and that position is recomputed if the parser comes back to it.
pub(crate) struct Cache<V> {
    name: &'static str,
    diag: &'static str,
    slots: Vec<Option<Slot<V>>>,
    last: usize,
    serial: u64,
    stats: CacheStats,
}

impl<V> Cache<V> {
    pub fn new(name: &'static str, diag: &'static str) -> Self {
        Cache {
            name,
            diag,
            slots: Vec::new(),
            last: 0,
            serial: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn diag(&self) -> &'static str {
        self.diag
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Forget everything and size the ring for `capacity` entries.
    pub fn reset(&mut self, capacity: usize) {
        self.slots.clear();
        self.slots.resize_with(capacity, || None);
        self.last = 0;
        self.serial = 0;
        self.stats = CacheStats::default();
    }

    pub fn find(&mut self, pos: usize) -> Lookup<V> {
        if self.slots.is_empty() {
            return Lookup::Miss;
        }
        self.stats.lookups += 1;
        let found = self.slots.iter().flatten().find(|slot| slot.start == pos);
        match found {
            None => Lookup::Miss,
            Some(Slot { phrase: Some(p), .. }) => {
                self.stats.hits += 1;
                Lookup::Hit(p.clone())
            }
            Some(Slot { phrase: None, .. }) => {
                self.stats.hits += 1;
                Lookup::Pending
            }
        }
    }

    /// Reserve a slot for a result starting at `pos`. Returns the serial to
    /// pass to `fill` once the result is known, or `None` when memoization
    /// is disabled.
    pub fn save(&mut self, pos: usize) -> Option<u64> {
        if self.slots.is_empty() {
            return None;
        }
        self.last = (self.last + 1) % self.slots.len();
        self.serial += 1;
        let slot = &mut self.slots[self.last];
        if let Some(old) = slot {
            self.stats.evictions += 1;
            debug!(cache = self.name, evicted = old.start, pos, "cache slot reused");
        }
        *slot = Some(Slot {
            start: pos,
            serial: self.serial,
            phrase: None,
        });
        self.stats.saves += 1;
        Some(self.serial)
    }

    /// Store the finished result for the slot reserved under `serial`,
    /// unless that slot has been overwritten since.
    pub fn fill(&mut self, serial: u64, phrase: &Rc<Phrase<V>>) {
        let slot = self.slots.iter_mut().flatten().find(|slot| slot.serial == serial);
        if let Some(slot) = slot {
            slot.phrase = Some(phrase.clone());
        }
    }
}
