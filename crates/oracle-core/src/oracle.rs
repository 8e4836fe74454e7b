//! C6 — the oracle facade: glues the sketch and the language model behind
//! the three read queries (`available`, `entropy`, `all`) and the one
//! mutator (`add`) that the network façade exposes (spec.md §4.5/§6).

use crate::error::Result;
use crate::language_model::LanguageModel;
use crate::sketch::DeprecatingSketch;

/// Combined result of `all`: both answers the façade returns for a single
/// candidate password.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub available: bool,
    pub entropy: Option<f64>,
}

/// The n-gram tuple length the language model was trained with. Fixed at
/// construction since `bits` must segment candidates the same way the
/// corpus was segmented (spec.md §4.3).
#[derive(Debug, Clone)]
pub struct Oracle {
    sketch: DeprecatingSketch,
    model: Option<LanguageModel>,
    ngram: usize,
}

impl Oracle {
    pub fn new(sketch: DeprecatingSketch, model: Option<LanguageModel>, ngram: usize) -> Self {
        Self { sketch, model, ngram }
    }

    /// `¬ sketch.contains(password)` — not recently chosen by anyone else
    /// in this deployment.
    pub fn available(&self, password: &str) -> bool {
        !self.sketch.contains(password)
    }

    /// `model.bits(password)`, or `None` if no corpus model was loaded.
    pub fn entropy(&self, password: &str) -> Option<f64> {
        self.model.as_ref().map(|m| m.bits(password, self.ngram))
    }

    pub fn all(&self, password: &str) -> Verdict {
        Verdict { available: self.available(password), entropy: self.entropy(password) }
    }

    /// Records `password` as recently chosen. Not atomic with a prior
    /// `available` check by design — see spec.md §4.5's ordering note.
    pub fn add(&mut self, password: &str) -> Result<()> {
        self.sketch.add(password)
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn sketch(&self) -> &DeprecatingSketch {
        &self.sketch
    }

    pub fn model(&self) -> Option<&LanguageModel> {
        self.model.as_ref()
    }

    pub fn set_model(&mut self, model: Option<LanguageModel>) {
        self.model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle_with_corpus() -> Oracle {
        let sketch = DeprecatingSketch::new(1000, 2, 1).unwrap();
        let model = LanguageModel::compile(["aaa", "aab", "abb", "aaa"], 3);
        Oracle::new(sketch, Some(model), 3)
    }

    #[test]
    fn available_toggles_after_add() {
        let mut oracle = oracle_with_corpus();
        assert!(oracle.available("secret"));
        oracle.add("secret").unwrap();
        assert!(!oracle.available("secret"));
    }

    #[test]
    fn entropy_is_none_without_a_model() {
        let sketch = DeprecatingSketch::new(1000, 2, 1).unwrap();
        let oracle = Oracle::new(sketch, None, 3);
        assert_eq!(oracle.entropy("anything"), None);
        assert!(!oracle.has_model());
    }

    #[test]
    fn entropy_matches_the_underlying_model() {
        let oracle = oracle_with_corpus();
        let expected = oracle.model().unwrap().bits("aaa", 3);
        assert_eq!(oracle.entropy("aaa"), Some(expected));
    }

    #[test]
    fn all_combines_both_queries() {
        let mut oracle = oracle_with_corpus();
        oracle.add("aaa").unwrap();
        let verdict = oracle.all("aaa");
        assert!(!verdict.available);
        assert!(verdict.entropy.is_some());
    }

    #[test]
    fn s5_add_then_available_then_unseen_model_query() {
        let sketch = DeprecatingSketch::new(1000, 2, 1).unwrap();
        let mut oracle = Oracle::new(sketch, None, 3);
        assert!(oracle.available("secret"));
        oracle.add("secret").unwrap();
        assert!(!oracle.available("secret"));
        assert_eq!(oracle.entropy("secret"), None);
    }
}
