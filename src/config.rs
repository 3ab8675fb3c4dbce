use crate::error::{Error, Result};

/// Largest supported number of memoized results per rule.
pub const MAX_MEMO: usize = 9;

/// Engine-wide parser settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
    memo: usize,
}

impl ParserConfig {
    /// No memoization.
    pub fn new() -> Self {
        ParserConfig::default()
    }

    /// Keep up to `capacity` results per memoized rule; 0 disables
    /// memoization.
    pub fn with_memo(capacity: usize) -> Result<Self> {
        if capacity > MAX_MEMO {
            return Err(Error::MemoCapacity {
                capacity,
                max: MAX_MEMO,
            });
        }
        Ok(ParserConfig { memo: capacity })
    }

    pub fn memo(&self) -> usize {
        self.memo
    }
}
