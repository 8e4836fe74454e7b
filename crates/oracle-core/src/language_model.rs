//! C4 — character n-gram language model: context -> histogram, trained by
//! segmenting input strings, scored by summing per-position entropies.

use crate::histogram::{Histogram, Symbol};
use std::collections::HashMap;

/// The first `n-1` symbols of an n-gram window; the lookup key into the
/// language model.
pub type Context = Vec<Symbol>;

/// Segments `s` into `(context, successor)` pairs by padding with `n-1`
/// sentinels on each side and sliding a window of length `n` (spec.md
/// §4.3). For `n=3, s="ab"` this yields:
/// `((⊥,⊥),'a'), ((⊥,'a'),'b'), (('a','b'),⊥), (('b',⊥),⊥)`.
pub fn segment(s: &str, n: usize) -> Vec<(Context, Symbol)> {
    assert!(n >= 1, "tuple length must be at least 1");
    let mut padded: Vec<Symbol> = Vec::with_capacity(s.chars().count() + 2 * (n - 1));
    padded.extend(std::iter::repeat(Symbol::Boundary).take(n - 1));
    padded.extend(s.chars().map(Symbol::Char));
    padded.extend(std::iter::repeat(Symbol::Boundary).take(n - 1));

    let mut out = Vec::new();
    if padded.len() < n {
        return out;
    }
    for offset in 0..=(padded.len() - n) {
        let context = padded[offset..offset + n - 1].to_vec();
        let successor = padded[offset + n - 1];
        out.push((context, successor));
    }
    out
}

/// Drops the last element of a sequence, preserving order of the rest.
/// The input is already a materialized `Vec` by the time this is called, so
/// a plain pop suffices — no generator/iterator laziness to preserve here
/// (spec.md §9, "generator that drops the last element").
pub fn all_but_the_last<T>(items: Vec<T>) -> Vec<T> {
    let mut items = items;
    items.pop();
    items
}

/// A trained n-tuple language model: context -> histogram, plus the
/// default entropy (bits) assigned to an unseen context.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    contexts: HashMap<Context, Histogram>,
    default_bits: f64,
}

impl LanguageModel {
    pub const DEFAULT_BITS: f64 = 6.5;

    pub fn new(default_bits: f64) -> Self {
        Self { contexts: HashMap::new(), default_bits }
    }

    pub fn default_bits(&self) -> f64 {
        self.default_bits
    }

    /// Trains the model on a sequence of `(context, successor)` pairs,
    /// typically produced by [`segment`].
    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (Context, Symbol)>) {
        for (context, successor) in pairs {
            self.contexts.entry(context).or_insert_with(Histogram::new).increment(successor, 1);
        }
    }

    /// Trains the model from a corpus of passwords, one per line, with
    /// n-gram tuple length `n` (defaults to 3 per spec.md §4.3/original
    /// `language_model.compile`).
    pub fn compile<'a>(lines: impl IntoIterator<Item = &'a str>, n: usize) -> Self {
        let mut model = Self::new(Self::DEFAULT_BITS);
        for line in lines {
            model.extend(segment(line, n));
        }
        model
    }

    fn histogram(&self, context: &Context) -> Option<&Histogram> {
        self.contexts.get(context)
    }

    /// Scores `s`: the sum, over every segmentation pair except the last,
    /// of the per-context entropy of the successor. Absent contexts fall
    /// back to `default_bits` (the "dummy histogram" of spec.md §4.3/§9).
    pub fn bits(&self, s: &str, n: usize) -> f64 {
        let pairs = all_but_the_last(segment(s, n));
        pairs
            .into_iter()
            .map(|(context, successor)| match self.histogram(&context) {
                Some(hist) => hist.bits(successor, self.default_bits),
                None => self.default_bits,
            })
            .sum()
    }

    pub(crate) fn contexts(&self) -> &HashMap<Context, Histogram> {
        &self.contexts
    }

    pub(crate) fn from_parts(contexts: HashMap<Context, Histogram>, default_bits: f64) -> Self {
        Self { contexts, default_bits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Symbol::*;

    #[test]
    fn s6_segment_string() {
        let pairs = segment("string", 3);
        let expected_successors: Vec<Symbol> = "string".chars().map(Char).chain([Boundary, Boundary]).collect();
        assert_eq!(pairs.len(), 8);
        let successors: Vec<Symbol> = pairs.iter().map(|(_, s)| *s).collect();
        assert_eq!(successors, expected_successors);
        assert_eq!(pairs[0].0, vec![Boundary, Boundary]);
        assert_eq!(pairs[1].0, vec![Boundary, Char('s')]);
        assert_eq!(pairs[2].0, vec![Char('s'), Char('t')]);
        assert_eq!(pairs[7].0, vec![Char('g'), Boundary]);
    }

    #[test]
    fn segmentation_round_trip_recovers_original_string() {
        for s in ["", "a", "ab", "password123", "xyzzy"] {
            let pairs = segment(s, 3);
            let recovered: String = pairs
                .iter()
                .filter_map(|(_, successor)| match successor {
                    Char(c) => Some(*c),
                    Boundary => None,
                })
                .collect();
            assert_eq!(recovered, s);
        }
    }

    #[test]
    fn trained_histograms_match_hand_computation() {
        let model = LanguageModel::compile(["aaa", "aab", "abb", "aaa"], 3);

        let expect = |ctx: [Symbol; 2], key: Symbol, count: u64| {
            let hist = model.contexts().get(&ctx.to_vec()).unwrap();
            assert_eq!(hist.counts().get(&key).copied(), Some(count), "{ctx:?} -> {key:?}");
        };

        expect([Boundary, Boundary], Char('a'), 4);
        expect([Boundary, Char('a')], Char('a'), 3);
        expect([Boundary, Char('a')], Char('b'), 1);
        expect([Char('a'), Char('a')], Char('a'), 2);
        expect([Char('a'), Char('a')], Char('b'), 1);
        expect([Char('a'), Char('a')], Boundary, 2);
        expect([Char('a'), Char('b')], Char('b'), 1);
        expect([Char('a'), Char('b')], Boundary, 1);
        expect([Char('b'), Char('b')], Boundary, 1);
        expect([Char('a'), Boundary], Boundary, 2);
        expect([Char('b'), Boundary], Boundary, 2);

        // Entropy additivity, checked against spec.md S2's literal values.
        // Per-context bits truncate `total / count` before `log2` (see
        // histogram.rs), so:
        //   "aaa": (⊥,⊥)->a log2(4//4) + (⊥,a)->a log2(4//3)
        //        + (a,a)->a log2(5//2) + (a,a)->⊥ log2(5//2)
        //        = 0 + 0 + 1 + 1 = 2.0
        //   "aab": (⊥,⊥)->a log2(4//4) + (⊥,a)->a log2(4//3)
        //        + (a,a)->b log2(5//1) + (a,b)->⊥ log2(2//1)
        //        = 0 + 0 + log2(5) + 1 ≈ 3.32
        assert!((model.bits("aaa", 3) - 2.0).abs() < 0.01);
        assert!((model.bits("aab", 3) - 3.32).abs() < 0.01);
    }

    #[test]
    fn unseen_context_falls_back_to_default_bits() {
        let model = LanguageModel::new(6.5);
        assert!((model.bits("z", 3) - 2.0 * 6.5).abs() < 1e-9);
    }
}
