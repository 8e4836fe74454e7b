//! Error kinds for the oracle core.
//!
//! Structural errors (`ParameterError`, `InvariantViolation`) are fatal:
//! callers should propagate them up to process startup/shutdown rather than
//! attempt recovery. `Io` is recoverable at the call sites in
//! `persistence` (falls back to a fresh instance on load, logs and
//! continues on save).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    /// Impossible hash width, `S <= Q`, or `Q` not a multiple of `k`.
    #[error("parameter error: {0}")]
    ParameterError(String),

    /// A structural invariant of the sketch was violated (counter
    /// underflow, out-of-range queue index). Indicates corrupt state.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OracleError>;
