//! Process-wide shared state.

use crate::config::OracleConfig;
use oracle_core::Oracle;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One reader-writer lock around the oracle satisfies the ordering
/// guarantees of spec.md §5 ("a reader-writer lock around the sketch
/// satisfies [the totally-ordered pre/post requirement]").
#[derive(Clone)]
pub struct AppState {
    pub oracle: Arc<RwLock<Oracle>>,
    pub config: Arc<OracleConfig>,
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn new(oracle: Oracle, config: OracleConfig) -> Self {
        Self {
            oracle: Arc::new(RwLock::new(oracle)),
            config: Arc::new(config),
            started_at: std::time::Instant::now(),
        }
    }
}

/// Language model tuple length. Not configurable independent of the
/// compiled corpus: `oracle-compile` and `oracled` must agree, so it is
/// fixed here rather than exposed as a flag (spec.md §4.3 gives no default;
/// `language_model.py`'s `compile` defaults to 3).
pub const NGRAM_LEN: usize = 3;
