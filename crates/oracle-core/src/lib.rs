//! Core password-quality-oracle algorithms: a deprecating Bloom sketch for
//! recent-password throttling, and a character n-gram language model for
//! entropy estimation. No networking, no configuration, no process
//! lifecycle — those live in `oracled`.

pub mod error;
pub mod hashing;
pub mod histogram;
pub mod language_model;
pub mod oracle;
pub mod persistence;
pub mod sketch;

pub use error::{OracleError, Result};
pub use histogram::{Histogram, Symbol};
pub use language_model::{Context, LanguageModel};
pub use oracle::{Oracle, Verdict};
pub use sketch::{DeprecatingSketch, SketchParams};
