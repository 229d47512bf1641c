//! Printability classification
//!
//! A character is unprintable when it belongs to one of the general
//! categories Cc (control), Cs (surrogate), Zl (line separator) or Zp
//! (paragraph separator). Surrogates cannot be held in a `char`; the
//! decoder reports them as undecodable spans instead.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;

const LINE_SEPARATOR: char = '\u{2028}';
const PARAGRAPH_SEPARATOR: char = '\u{2029}';

static SHARED_CACHE: Lazy<PrintableCache> = Lazy::new(PrintableCache::new);

/// Classify `ch` without consulting any cache
pub fn classify(ch: char) -> bool {
    !(ch.is_control() || ch == LINE_SEPARATOR || ch == PARAGRAPH_SEPARATOR)
}

/// Whether `ch` is safe to emit verbatim, using the process-wide cache
pub fn is_printable(ch: char) -> bool {
    SHARED_CACHE.is_printable(ch)
}

/// Memoized printability lookups.
///
/// Entries are only ever inserted, never changed, so concurrent readers
/// always agree with [`classify`].
#[derive(Debug, Default)]
pub struct PrintableCache {
    entries: RwLock<HashMap<char, bool>>,
}

impl PrintableCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_printable(&self, ch: char) -> bool {
        if let Some(&printable) = self.entries.read().get(&ch) {
            return printable;
        }
        *self.entries.write().entry(ch).or_insert_with(|| classify(ch))
    }

    /// Number of characters classified so far
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
