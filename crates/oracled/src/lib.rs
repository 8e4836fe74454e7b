//! Password quality oracle daemon: HTTP façade, configuration, and process
//! wiring around `oracle_core`.
//!
//! This library exposes the modules needed for OpenAPI generation and
//! testing; `main.rs` compiles its own copy of the same sources for the
//! running daemon.

pub mod api;
pub mod config;
pub mod state;

pub use state::{AppState, NGRAM_LEN};
