//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. File passed with `--config`
//! 4. `.sql-analyzer.toml` in current directory
//! 5. `~/.config/sql-analyzer/config.toml`
//! 6. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [llm]
//! provider = "ollama"          # openai, anthropic, ollama
//! model = "llama3.2"
//! api_key = "sk-..."           # or use LLM_API_KEY env var
//! ollama_url = "http://localhost:11434"
//!
//! [retry]
//! max_retries = 3
//! initial_delay_ms = 1000
//! max_delay_ms = 30000
//! backoff_factor = 2.0
//!
//! [engine]
//! max_concurrency = 3          # simultaneous Judge calls
//! timeout_ms = 60000           # per dimension
//! batch_concurrency = 2        # simultaneous statements in a batch
//! max_batch_size = 50
//! cache_capacity = 100
//! max_output_tokens = 2048
//!
//! [knowledge]
//! path = "./sql-guidelines"
//! top_k = 3
//!
//! [history]
//! path = "./analysis-history.jsonl"
//!
//! [logging]
//! filter = "sql_analysis_engine=info"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `LLM_API_KEY` | API key for OpenAI/Anthropic |
//! | `LLM_PROVIDER` | Provider name |
//! | `LLM_MODEL` | Model identifier |
//! | `OLLAMA_URL` | Ollama base URL |
//! | `SQL_ANALYZER_MAX_CONCURRENCY` | Engine-wide Judge call cap |
//! | `SQL_ANALYZER_TIMEOUT_MS` | Per-dimension timeout |

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration
};

use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm:       LlmConfig,
    #[serde(default)]
    pub retry:     RetryConfig,
    #[serde(default)]
    pub engine:    EngineConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub history:   HistoryConfig,
    #[serde(default)]
    pub logging:   LoggingConfig
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider:   Option<String>,
    pub api_key:    Option<String>,
    pub model:      Option<String>,
    pub ollama_url: Option<String>
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider:   None,
            api_key:    None,
            model:      None,
            ollama_url: Some(String::from("http://localhost:11434"))
        }
    }
}

/// Retry configuration for LLM requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries:      u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms:     u64,
    pub backoff_factor:   f64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries:      3,
            initial_delay_ms: 1000,
            max_delay_ms:     30000,
            backoff_factor:   2.0
        }
    }
}

/// Orchestration engine knobs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum simultaneous in-flight dimension workers, engine-wide
    pub max_concurrency:   usize,
    /// Per-dimension Judge timeout
    pub timeout_ms:        u64,
    /// Maximum simultaneous statements inside one batch
    pub batch_concurrency: usize,
    /// Largest accepted batch
    pub max_batch_size:    usize,
    /// Number of cached reports
    pub cache_capacity:    usize,
    /// Output token budget passed to the Judge
    pub max_output_tokens: u32
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency:   3,
            timeout_ms:        60_000,
            batch_concurrency: 2,
            max_batch_size:    50,
            cache_capacity:    100,
            max_output_tokens: 2048
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject values that would stall the engine
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrency == 0 {
            return Err(config_error("engine.max_concurrency must be at least 1"));
        }
        if self.batch_concurrency == 0 {
            return Err(config_error("engine.batch_concurrency must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(config_error("engine.timeout_ms must be greater than 0"));
        }
        if self.max_batch_size == 0 {
            return Err(config_error("engine.max_batch_size must be at least 1"));
        }
        Ok(())
    }
}

/// Knowledge directory used to enrich prompts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub path:  Option<PathBuf>,
    pub top_k: usize
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path:  None,
            top_k: 3
        }
    }
}

/// Append-only analysis history
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HistoryConfig {
    pub path: Option<PathBuf>
}

/// Log filter used when `RUST_LOG` is not set
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    pub filter: Option<String>
}

fn read_config_file(path: &Path) -> AppResult<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        config_error(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    Config::from_toml_str(&content)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> AppResult<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| config_error(format!("Invalid value for {}: '{}'", name, value))),
        Err(_) => Ok(None)
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Explicit config file (`--config`)
    /// 3. Config file in current directory (.sql-analyzer.toml)
    /// 4. Config file in home directory (~/.config/sql-analyzer/config.toml)
    /// 5. Default values
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-analyzer")
                .join("config.toml");
            if home_config.exists() {
                config = read_config_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-analyzer.toml");
        if local_config.exists() {
            config = read_config_file(&local_config)?;
        }

        if let Some(path) = explicit {
            config = read_config_file(path)?;
        }

        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(api_key) = env::var("LLM_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Ok(provider) = env::var("LLM_PROVIDER") {
            self.llm.provider = Some(provider);
        }
        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(url) = env::var("OLLAMA_URL") {
            self.llm.ollama_url = Some(url);
        }
        if let Some(max) = env_parse("SQL_ANALYZER_MAX_CONCURRENCY")? {
            self.engine.max_concurrency = max;
        }
        if let Some(timeout_ms) = env_parse("SQL_ANALYZER_TIMEOUT_MS")? {
            self.engine.timeout_ms = timeout_ms;
        }
        self.engine.validate()
    }
}
