//! Daemon configuration: `clap`-parsed CLI flags layered over environment
//! variables and hardcoded defaults, mirroring `sisctl::config::DaemonConfig`.

use clap::Parser;
use serde::Serialize;
use utoipa::ToSchema;

/// Password quality oracle daemon.
///
/// Serves `available`/`entropy`/`all`/`add` under a configurable URL
/// prefix, backed by a deprecating Bloom sketch (recent-password
/// throttling) and an optional n-gram language model (entropy scoring).
#[derive(Debug, Parser)]
#[command(name = "oracled", about, long_about = None)]
pub struct Cli {
    /// Number of counter cells in the deprecating sketch.
    #[arg(long, env = "ORACLE_SLOTS")]
    pub slots: Option<u64>,

    /// Queue capacity in logical items (history depth).
    #[arg(long, env = "ORACLE_ITEMS")]
    pub items: Option<u64>,

    /// Hashes per item; queue length is items * per_item.
    #[arg(long, env = "ORACLE_PER_ITEM")]
    pub per_item: Option<usize>,

    /// Path to a gzip-compressed, precompiled language model. Unset means
    /// entropy queries always respond 503.
    #[arg(long, env = "ORACLE_LANGUAGE_MODEL")]
    pub language_model: Option<String>,

    /// Path to the persisted sketch file.
    #[arg(long, env = "ORACLE_BLOOM_FILTER")]
    pub bloom_filter: Option<String>,

    /// Host address to bind to.
    #[arg(long, env = "ORACLE_HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "ORACLE_PORT")]
    pub port: Option<u16>,

    /// URL prefix the facade is served under.
    #[arg(long, env = "ORACLE_PATH")]
    pub path: Option<String>,
}

/// Resolved daemon configuration, after merging CLI flags, environment
/// variables, and defaults.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OracleConfig {
    pub slots: u64,
    pub items: u64,
    pub per_item: usize,
    pub language_model: Option<String>,
    pub bloom_filter: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            slots: 1 << 19,
            items: 1 << 16,
            per_item: 2,
            language_model: None,
            bloom_filter: "bloom_filter.bin".to_string(),
            host: String::new(),
            port: 8000,
            path: "/".to_string(),
        }
    }
}

impl OracleConfig {
    /// Builds a config from defaults, then overlays environment variables,
    /// then overlays explicit CLI flags (flags win).
    pub fn from_env_and_cli(cli: Cli) -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("ORACLE_SLOTS") {
            if let Ok(v) = v.parse() {
                config.slots = v;
            }
        }
        if let Ok(v) = std::env::var("ORACLE_ITEMS") {
            if let Ok(v) = v.parse() {
                config.items = v;
            }
        }
        if let Ok(v) = std::env::var("ORACLE_PER_ITEM") {
            if let Ok(v) = v.parse() {
                config.per_item = v;
            }
        }
        if let Ok(v) = std::env::var("ORACLE_LANGUAGE_MODEL") {
            config.language_model = Some(v);
        }
        if let Ok(v) = std::env::var("ORACLE_BLOOM_FILTER") {
            config.bloom_filter = v;
        }
        if let Ok(v) = std::env::var("ORACLE_HOST") {
            config.host = v;
        }
        if let Ok(v) = std::env::var("ORACLE_PORT") {
            if let Ok(v) = v.parse() {
                config.port = v;
            }
        }
        if let Ok(v) = std::env::var("ORACLE_PATH") {
            config.path = v;
        }

        if let Some(v) = cli.slots {
            config.slots = v;
        }
        if let Some(v) = cli.items {
            config.items = v;
        }
        if let Some(v) = cli.per_item {
            config.per_item = v;
        }
        if let Some(v) = cli.language_model {
            config.language_model = Some(v);
        }
        if let Some(v) = cli.bloom_filter {
            config.bloom_filter = v;
        }
        if let Some(v) = cli.host {
            config.host = v;
        }
        if let Some(v) = cli.port {
            config.port = v;
        }
        if let Some(v) = cli.path {
            config.path = v;
        }

        config
    }

    /// The URL prefix, guaranteed to start and end with `/`.
    pub fn normalized_path(&self) -> String {
        let mut p = self.path.clone();
        if !p.starts_with('/') {
            p.insert(0, '/');
        }
        if !p.ends_with('/') {
            p.push('/');
        }
        p
    }

    pub fn bind_addr(&self) -> String {
        let host = if self.host.is_empty() { "0.0.0.0" } else { &self.host };
        format!("{host}:{port}", port = self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = OracleConfig::default();
        assert_eq!(config.slots, 1 << 19);
        assert_eq!(config.items, 1 << 16);
        assert_eq!(config.per_item, 2);
        assert_eq!(config.language_model, None);
        assert_eq!(config.port, 8000);
        assert_eq!(config.path, "/");
    }

    #[test]
    fn normalized_path_always_has_leading_and_trailing_slash() {
        let mut config = OracleConfig::default();
        config.path = "api".to_string();
        assert_eq!(config.normalized_path(), "/api/");

        config.path = "/api".to_string();
        assert_eq!(config.normalized_path(), "/api/");

        config.path = "/".to_string();
        assert_eq!(config.normalized_path(), "/");
    }
}
