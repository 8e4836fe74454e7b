//! C2 — deprecating sketch: a counting Bloom filter paired with a FIFO of
//! its own insertions, so each `add` evicts the oldest.

use crate::error::{OracleError, Result};
use crate::hashing::{choose_digest, hashes, DigestKind};

/// Parameters that pin a sketch's shape. Two sketches are only
/// interchangeable (for persistence purposes) if these match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SketchParams {
    pub slots: u64,
    pub items: u64,
    pub per_item: usize,
}

impl SketchParams {
    pub fn queue_len(&self) -> u64 {
        self.items * self.per_item as u64
    }
}

/// A deprecating sketch: `slots` counters plus a circular `queue` of the
/// last `items * per_item` slot indices written, so insertion `k` evicts
/// insertion `k - items`.
#[derive(Debug, Clone)]
pub struct DeprecatingSketch {
    params: SketchParams,
    digest: DigestKind,
    slots: Vec<u64>,
    queue: Vec<Option<u64>>,
    head: usize,
}

impl DeprecatingSketch {
    /// Creates a fresh, empty sketch. Fails if `slots <= queue_len` or if
    /// `items * per_item` doesn't evenly split into `per_item`-sized
    /// rotations (both preconditions from spec.md §3/§4.2).
    pub fn new(slots: u64, items: u64, per_item: usize) -> Result<Self> {
        let params = SketchParams { slots, items, per_item };
        Self::validate(&params)?;
        let digest = Self::choose_digest_for(&params)?;

        Ok(Self {
            params,
            digest,
            slots: vec![0; slots as usize],
            queue: vec![None; params.queue_len() as usize],
            head: 0,
        })
    }

    fn validate(params: &SketchParams) -> Result<()> {
        if params.per_item == 0 {
            return Err(OracleError::ParameterError(
                "per_item must be at least 1".to_string(),
            ));
        }
        let queue_len = params.queue_len();
        if params.slots <= queue_len {
            return Err(OracleError::ParameterError(format!(
                "slots ({}) must be strictly greater than items * per_item ({})",
                params.slots, queue_len
            )));
        }
        Ok(())
    }

    fn choose_digest_for(params: &SketchParams) -> Result<DigestKind> {
        let required_bits = (params.slots as f64).log2() * params.per_item as f64;
        choose_digest(required_bits)
    }

    pub fn params(&self) -> SketchParams {
        self.params
    }

    /// Adds `s`: computes `per_item` slot indices and, for each one,
    /// rotates the queue — evicting whatever index sat at the write
    /// cursor `items` adds ago, decrementing its counter, then writing
    /// and incrementing the new index.
    pub fn add(&mut self, s: &str) -> Result<()> {
        let indices = hashes(self.digest, self.params.slots, self.params.per_item, s);
        for h in indices {
            self.add_hash(h)?;
        }
        Ok(())
    }

    fn add_hash(&mut self, h: u64) -> Result<()> {
        if let Some(evicted) = self.queue[self.head].take() {
            let counter = self
                .slots
                .get_mut(evicted as usize)
                .ok_or_else(|| OracleError::InvariantViolation("evicted index out of range".into()))?;
            *counter = counter.checked_sub(1).ok_or_else(|| {
                OracleError::InvariantViolation(format!(
                    "counter underflow evicting slot {evicted}"
                ))
            })?;
        }
        self.queue[self.head] = Some(h);
        let counter = self
            .slots
            .get_mut(h as usize)
            .ok_or_else(|| OracleError::InvariantViolation("hash index out of range".into()))?;
        *counter += 1;
        self.head = (self.head + 1) % self.queue.len();
        Ok(())
    }

    /// Returns `true` iff every slot index derived from `s` has a nonzero
    /// counter. This is the standard Bloom conjunction, not the weaker sum
    /// check the Python source used — see spec.md §9(a).
    pub fn contains(&self, s: &str) -> bool {
        let indices = hashes(self.digest, self.params.slots, self.params.per_item, s);
        indices.iter().all(|&h| self.slots[h as usize] > 0)
    }

    pub(crate) fn slots(&self) -> &[u64] {
        &self.slots
    }

    pub(crate) fn queue(&self) -> &[Option<u64>] {
        &self.queue
    }

    pub(crate) fn head(&self) -> usize {
        self.head
    }

    /// Rebuilds `slots` from `queue` (used by persistence on load) and
    /// returns the resulting sketch. `queue` and `head` must already be
    /// consistent with `params`.
    pub(crate) fn from_parts(
        params: SketchParams,
        queue: Vec<Option<u64>>,
        head: usize,
    ) -> Result<Self> {
        Self::validate(&params)?;
        let digest = Self::choose_digest_for(&params)?;
        let mut slots = vec![0u64; params.slots as usize];
        for entry in &queue {
            if let Some(idx) = entry {
                let counter = slots.get_mut(*idx as usize).ok_or_else(|| {
                    OracleError::InvariantViolation("persisted queue index out of range".into())
                })?;
                *counter += 1;
            }
        }
        Ok(Self { params, digest, slots, queue, head })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_deprecation_sequence() {
        let mut sketch = DeprecatingSketch::new(1000, 2, 1).unwrap();
        assert!(!sketch.contains("abc"));
        sketch.add("abc").unwrap();
        assert!(sketch.contains("abc"));
        sketch.add("def").unwrap();
        assert!(sketch.contains("abc"));
        sketch.add("123").unwrap();
        assert!(!sketch.contains("abc"));
    }

    #[test]
    fn s2_fifo_deprecation_items_two_per_item_one() {
        let mut sketch = DeprecatingSketch::new(1000, 2, 1).unwrap();
        sketch.add("a").unwrap();
        sketch.add("b").unwrap();
        sketch.add("c").unwrap();
        assert!(!sketch.contains("a"));
    }

    #[test]
    fn no_false_negatives_for_recent_window() {
        let items = 16;
        let mut sketch = DeprecatingSketch::new(4096, items, 1).unwrap();
        let words: Vec<String> = (0..items).map(|i| format!("word-{i}")).collect();
        for (i, w) in words.iter().enumerate() {
            sketch.add(w).unwrap();
            for recent in &words[..=i] {
                assert!(sketch.contains(recent), "missing {recent} after adding {w}");
            }
        }
    }

    #[test]
    fn counter_conservation() {
        let mut sketch = DeprecatingSketch::new(5000, 10, 3).unwrap();
        for i in 0..25 {
            sketch.add(&format!("pw{i}")).unwrap();
        }
        let non_empty = sketch.queue().iter().filter(|q| q.is_some()).count() as u64;
        let sum: u64 = sketch.slots().iter().sum();
        assert_eq!(sum, non_empty);
        assert_eq!(non_empty, (25 * 3).min(sketch.params().queue_len()));
    }

    #[test]
    fn rejects_slots_not_greater_than_queue() {
        assert!(DeprecatingSketch::new(10, 5, 2).is_err());
        assert!(DeprecatingSketch::new(20, 10, 2).is_err());
    }

    #[test]
    fn from_parts_reconstructs_slots_from_queue() {
        let mut sketch = DeprecatingSketch::new(1000, 4, 2).unwrap();
        sketch.add("hello").unwrap();
        sketch.add("world").unwrap();

        let rebuilt = DeprecatingSketch::from_parts(
            sketch.params(),
            sketch.queue().to_vec(),
            sketch.head(),
        )
        .unwrap();
        assert_eq!(rebuilt.slots(), sketch.slots());
        assert!(rebuilt.contains("hello"));
        assert!(rebuilt.contains("world"));
    }
}
