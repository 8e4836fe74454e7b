//! C3 — histogram: successor symbol -> count, with an entropy query.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A symbol in a segmented string: either an ordinary character or the
/// sentinel used to pad string boundaries (spec.md GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    Char(char),
    Boundary,
}

/// Maps successor symbols to counts, with `bits` returning the Shannon
/// self-information `log2(total / count[key])` of a given successor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    counts: HashMap<Symbol, u64>,
    total: u64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: Symbol, n: u64) {
        *self.counts.entry(key).or_insert(0) += n;
        self.total += n;
    }

    /// Bits of entropy for `key`, or `default` if `key` was never observed.
    ///
    /// `total / count` is integer division, matching the ground-truth
    /// original (`self.__counter / self[key]` under Python 2 semantics) —
    /// spec.md S2's literal values only hold under truncating division.
    pub fn bits(&self, key: Symbol, default: f64) -> f64 {
        match self.counts.get(&key) {
            Some(&count) if count > 0 => ((self.total / count) as f64).log2(),
            _ => default,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn counts(&self) -> &HashMap<Symbol, u64> {
        &self.counts
    }

    pub(crate) fn from_counts(counts: HashMap<Symbol, u64>) -> Self {
        let total = counts.values().sum();
        Self { counts, total }
    }
}
