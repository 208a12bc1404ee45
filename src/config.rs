//! Application configuration: loaded from config/default.toml and environment variables
//!
//! Load order: the TOML file first, then environment variables with prefix
//! `LINAGENT__*` (double underscore marks nesting, e.g. `LINAGENT__SERVER__PORT=8080`).

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration root (matches the top level of config/default.toml)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub llm: LlmSection,
    pub agent: AgentSection,
    pub tools: ToolsSection,
}

/// [server] section: bind address, worker pool, request budget, thread lifecycle
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Concurrent request workers pulling from the FIFO queue
    pub workers: usize,
    pub queue_capacity: usize,
    /// Wall-clock budget per request (seconds)
    pub request_timeout_secs: u64,
    /// Inactive threads older than this are evicted
    pub thread_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11435,
            workers: 2,
            queue_capacity: 256,
            request_timeout_secs: 60,
            thread_ttl_secs: 600,
            sweep_interval_secs: 60,
        }
    }
}

/// [llm] section: backend selection, model, timeout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Backend: ollama / openai / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "qwen3:1.7b".to_string(),
            base_url: None,
            request_timeout_secs: 60,
        }
    }
}

/// [agent] section: loop bounds and context retention
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Planner iterations (tool calls) before finalization is forced
    pub max_cycles: u32,
    /// Planner visits per request before finalization is forced, regardless of cycles
    pub max_plan_steps: u32,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_cycles: 2,
            max_plan_steps: 8,
        }
    }
}

/// [tools] section: documentation service endpoint and result bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub doc_base_url: String,
    pub timeout_secs: u64,
    pub tool_timeout_secs: u64,
    /// Manual text is truncated to this many characters before entering context
    pub max_doc_chars: usize,
    /// search_in_doc returns at most this many matching lines
    pub max_matches: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            doc_base_url: "http://localhost:9000".to_string(),
            timeout_secs: 10,
            tool_timeout_secs: 30,
            max_doc_chars: 1500,
            max_matches: 10,
        }
    }
}

/// Load configuration from the config directory; `LINAGENT__*` env vars override
///
/// 1. Look for config/default.toml, ../config/default.toml, default.toml in order
/// 2. If config_path is given and exists, add it on top (may override earlier keys)
/// 3. Finally layer the environment variables
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("LINAGENT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_layer_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(&path, "[server]\nport = 8123\n[agent]\nmax_cycles = 3\n").unwrap();
        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.server.port, 8123);
        assert_eq!(cfg.agent.max_cycles, 3);
        // untouched sections keep their defaults
        assert_eq!(cfg.tools.max_doc_chars, 1500);
    }

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.workers, 2);
        assert_eq!(cfg.agent.max_cycles, 2);
        assert_eq!(cfg.tools.max_doc_chars, 1500);
        assert_eq!(cfg.tools.max_matches, 10);
        assert_eq!(cfg.server.port, 11435);
    }
}
