//! C5 — persistence: self-describing byte streams for the sketch and the
//! language model, with parameter-drift detection on the sketch.
//!
//! Neither format is meant to be a stable interchange format across
//! versions of this crate (spec.md §4.4) — only deterministic on repeated
//! load/store within one deployment. Both are tagged with a magic number
//! and a format version so a load can fail fast on garbage input rather
//! than silently misinterpreting it.

use crate::histogram::{Histogram, Symbol};
use crate::language_model::{Context, LanguageModel};
use crate::sketch::{DeprecatingSketch, SketchParams};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

const SKETCH_MAGIC: [u8; 4] = *b"PQSK";
const SKETCH_VERSION: u16 = 1;
const MODEL_MAGIC: [u8; 4] = *b"PQLM";
const MODEL_VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SketchWire {
    slots: u64,
    items: u64,
    per_item: usize,
    queue: Vec<Option<u64>>,
    head: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelWire {
    default_bits: f64,
    contexts: HashMap<Context, HashMap<Symbol, u64>>,
}

fn write_tagged<W: Write>(mut w: W, magic: [u8; 4], version: u16, payload: &[u8]) -> std::io::Result<()> {
    w.write_all(&magic)?;
    w.write_all(&version.to_le_bytes())?;
    w.write_all(&(payload.len() as u64).to_le_bytes())?;
    w.write_all(payload)
}

fn read_tagged<R: Read>(mut r: R, expect_magic: [u8; 4]) -> std::io::Result<(u16, Vec<u8>)> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != expect_magic {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad magic number in persisted file",
        ));
    }
    let mut version_buf = [0u8; 2];
    r.read_exact(&mut version_buf)?;
    let version = u16::from_le_bytes(version_buf);

    let mut len_buf = [0u8; 8];
    r.read_exact(&mut len_buf)?;
    let len = u64::from_le_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    Ok((version, payload))
}

/// Serializes `sketch` to `path` (plain, uncompressed — only the language
/// model file is gzipped per spec.md §4.4/§6).
pub fn save_sketch(sketch: &DeprecatingSketch, path: &Path) -> std::io::Result<()> {
    let params = sketch.params();
    let wire = SketchWire {
        slots: params.slots,
        items: params.items,
        per_item: params.per_item,
        queue: sketch.queue().to_vec(),
        head: sketch.head(),
    };
    let payload = bincode::serialize(&wire)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let file = std::fs::File::create(path)?;
    write_tagged(file, SKETCH_MAGIC, SKETCH_VERSION, &payload)
}

/// Loads a sketch from `path`, configured for `(slots, items, per_item)`.
///
/// If the file is missing, unreadable, or its stored parameters differ
/// from the ones requested, returns a fresh empty sketch configured with
/// the requested parameters (logging a warning in the parameter-mismatch
/// case) rather than an error — a missing/corrupt history file is not a
/// fatal condition (spec.md §4.4/§7).
pub fn load_sketch(path: &Path, slots: u64, items: u64, per_item: usize) -> crate::error::Result<DeprecatingSketch> {
    let fresh = || DeprecatingSketch::new(slots, items, per_item);

    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return fresh(),
    };

    let (_version, payload) = match read_tagged(file, SKETCH_MAGIC) {
        Ok(v) => v,
        Err(_) => return fresh(),
    };

    let wire: SketchWire = match bincode::deserialize(&payload) {
        Ok(w) => w,
        Err(_) => return fresh(),
    };

    let stored = SketchParams { slots: wire.slots, items: wire.items, per_item: wire.per_item };
    let requested = SketchParams { slots, items, per_item };
    if stored != requested {
        tracing::warn!(
            ?stored,
            ?requested,
            "sketch parameters changed, bloom filter wiped, password history lost"
        );
        return fresh();
    }

    DeprecatingSketch::from_parts(requested, wire.queue, wire.head)
}

/// Encodes `model` into its gzip-compressed wire representation, without
/// touching the filesystem. Used both by `save_language_model` and by
/// `oracle-compile`, which may write the result to stdout instead of a
/// path.
pub fn encode_language_model(model: &LanguageModel) -> std::io::Result<Vec<u8>> {
    let wire = ModelWire {
        default_bits: model.default_bits(),
        contexts: model
            .contexts()
            .iter()
            .map(|(ctx, hist)| (ctx.clone(), hist.counts().clone()))
            .collect(),
    };
    let payload = bincode::serialize(&wire)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut tagged = Vec::new();
    write_tagged(&mut tagged, MODEL_MAGIC, MODEL_VERSION, &payload)?;

    let mut gzipped = Vec::new();
    let mut encoder = flate2::write::GzEncoder::new(&mut gzipped, flate2::Compression::default());
    encoder.write_all(&tagged)?;
    encoder.finish()?;
    Ok(gzipped)
}

/// Serializes `model` to `path`, gzip-compressed.
pub fn save_language_model(model: &LanguageModel, path: &Path) -> std::io::Result<()> {
    let gzipped = encode_language_model(model)?;
    std::fs::write(path, gzipped)
}

/// Loads a gzip-compressed language model from `path`. A missing or
/// unreadable file yields `None` rather than an error — callers treat
/// "no model loaded" as a legitimate, documented state (entropy queries
/// respond 503, per spec.md §6).
pub fn load_language_model(path: &Path) -> Option<LanguageModel> {
    let file = std::fs::File::open(path).ok()?;
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut tagged = Vec::new();
    decoder.read_to_end(&mut tagged).ok()?;

    let (_version, payload) = read_tagged(tagged.as_slice(), MODEL_MAGIC).ok()?;
    let wire: ModelWire = bincode::deserialize(&payload).ok()?;

    let contexts = wire
        .contexts
        .into_iter()
        .map(|(ctx, counts)| (ctx, Histogram::from_counts(counts)))
        .collect();
    Some(LanguageModel::from_parts(contexts, wire.default_bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sketch_round_trips_with_same_parameters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sketch.bin");

        let mut sketch = DeprecatingSketch::new(1000, 8, 2).unwrap();
        sketch.add("hunter2").unwrap();
        sketch.add("correcthorse").unwrap();
        save_sketch(&sketch, &path).unwrap();

        let loaded = load_sketch(&path, 1000, 8, 2).unwrap();
        assert_eq!(loaded.slots(), sketch.slots());
        assert_eq!(loaded.queue(), sketch.queue());
        assert_eq!(loaded.head(), sketch.head());
    }

    #[test]
    fn sketch_load_resets_on_parameter_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sketch.bin");

        let mut sketch = DeprecatingSketch::new(1000, 8, 2).unwrap();
        sketch.add("hunter2").unwrap();
        save_sketch(&sketch, &path).unwrap();

        let loaded = load_sketch(&path, 2000, 8, 2).unwrap();
        assert!(loaded.queue().iter().all(Option::is_none));
        assert_eq!(loaded.slots().iter().sum::<u64>(), 0);
    }

    #[test]
    fn sketch_load_missing_file_yields_fresh_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.bin");
        let loaded = load_sketch(&path, 1000, 8, 2).unwrap();
        assert_eq!(loaded.slots().iter().sum::<u64>(), 0);
    }

    #[test]
    fn language_model_round_trips_gzipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin.gz");

        let model = LanguageModel::compile(["aaa", "aab", "abb"], 3);
        save_language_model(&model, &path).unwrap();

        let loaded = load_language_model(&path).unwrap();
        assert_eq!(loaded.bits("aaa", 3), model.bits("aaa", 3));
        assert_eq!(loaded.default_bits(), model.default_bits());
    }

    #[test]
    fn language_model_missing_file_yields_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.gz");
        assert!(load_language_model(&path).is_none());
    }
}
