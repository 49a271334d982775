//! Helper functions for the command runners.
//!
//! Input reading and statement splitting, LLM provider construction,
//! configuration overrides, engine assembly and exit code calculation.

use std::{
    fs::read_to_string,
    io::{self, Read},
    path::Path,
    sync::Arc
};

use clap::ValueEnum;
use tracing::info;

use super::types::LlmParams;
use crate::{
    cli::Provider,
    config::Config,
    engine::{BatchOutcome, OrchestrationEngine},
    error::{AppResult, batch_input_error, config_error, file_read_error, validation_error},
    history::{HistoryRecord, HistoryStore},
    knowledge::DirectoryKnowledge,
    llm::{LlmClient, LlmProvider},
    merge::MergedReport
};

/// Read text from a file or from stdin when `path` is "-"
pub fn read_text_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Resolve a single statement from inline text or an input path
pub fn read_sql_input(sql: Option<String>, input_path: Option<&str>) -> AppResult<String> {
    match (sql, input_path) {
        (Some(sql), _) => Ok(sql),
        (None, Some(path)) => read_text_input(path),
        (None, None) => Err(validation_error("either --sql or --input is required"))
    }
}

/// Split `;`-terminated SQL text into statements.
///
/// Semicolons inside quotes (`'`, `"`, `` ` ``), `--` line comments and
/// `/* */` block comments do not split. Chunks that contain only whitespace
/// or comments are dropped.
///
/// # Example
///
/// ```
/// use sql_analysis_engine::app::split_statements;
///
/// let parts = split_statements("SELECT ';'; -- done;\nSELECT 2;");
/// assert_eq!(parts, vec!["SELECT ';'", "-- done;\nSELECT 2"]);
/// ```
pub fn split_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                has_code = true;
                current.push(c);
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == c {
                        // doubled quote is an escaped quote
                        if chars.peek() == Some(&c) {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                            continue;
                        }
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                current.push(c);
                for inner in chars.by_ref() {
                    current.push(inner);
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                current.push(c);
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    current.push(inner);
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            ';' => {
                if has_code {
                    statements.push(current.trim().to_string());
                }
                current.clear();
                has_code = false;
            }
            _ => {
                if !c.is_whitespace() {
                    has_code = true;
                }
                current.push(c);
            }
        }
    }
    if has_code {
        statements.push(current.trim().to_string());
    }
    statements
}

/// Parse batch input by file extension: JSON or YAML list of strings, or
/// `;`-separated SQL otherwise
pub fn parse_batch_input(path: &str, content: &str) -> AppResult<Vec<String>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str(content)
            .map_err(|e| batch_input_error(e.line(), format!("invalid JSON list: {}", e))),
        Some("yaml") | Some("yml") => serde_yaml::from_str(content).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            batch_input_error(line, format!("invalid YAML list: {}", e))
        }),
        _ => Ok(split_statements(content))
    }
}

/// Build LLM provider from parameters
pub fn build_llm_provider(
    provider: Provider,
    api_key: Option<String>,
    model: String,
    ollama_url: String
) -> AppResult<LlmProvider> {
    match provider {
        Provider::OpenAI => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::OpenAI {
                api_key: key,
                model
            })
        }
        Provider::Anthropic => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::Anthropic {
                api_key: key,
                model
            })
        }
        Provider::Ollama => Ok(LlmProvider::Ollama {
            base_url: ollama_url,
            model
        })
    }
}

/// Get effective provider: command line, then configuration, then Ollama
pub fn get_effective_provider(
    provider: Option<Provider>,
    config_provider: Option<&str>
) -> AppResult<Provider> {
    match (provider, config_provider) {
        (Some(provider), _) => Ok(provider),
        (None, Some(name)) => <Provider as ValueEnum>::from_str(name.trim(), true)
            .map_err(|_| config_error(format!("Unknown LLM provider in configuration: {}", name))),
        (None, None) => Ok(Provider::Ollama)
    }
}

/// Get effective model name
pub fn get_effective_model(
    model: Option<String>,
    config_model: Option<String>,
    provider: &Provider
) -> String {
    model
        .or(config_model)
        .unwrap_or_else(|| provider.default_model().to_string())
}

/// Get effective Ollama URL
pub fn get_effective_ollama_url(url: String, config_url: Option<String>) -> String {
    if url == "http://localhost:11434" {
        config_url.unwrap_or(url)
    } else {
        url
    }
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(mut config: Config, llm: &LlmParams) -> AppResult<Config> {
    if let Some(max_retries) = llm.max_retries {
        config.retry.max_retries = max_retries;
    }
    if let Some(timeout_ms) = llm.timeout_ms {
        config.engine.timeout_ms = timeout_ms;
    }
    if let Some(max_concurrency) = llm.max_concurrency {
        config.engine.max_concurrency = max_concurrency;
    }
    if llm.knowledge.is_some() {
        config.knowledge.path = llm.knowledge.clone();
    }
    if llm.history.is_some() {
        config.history.path = llm.history.clone();
    }
    config.engine.validate()?;
    Ok(config)
}

/// Assemble the orchestration engine for a CLI run
pub fn build_engine(config: &Config, llm: &LlmParams) -> AppResult<OrchestrationEngine> {
    let api_key = llm.api_key.clone().or(config.llm.api_key.clone());
    let ollama_url = get_effective_ollama_url(llm.ollama_url.clone(), config.llm.ollama_url.clone());
    let provider = get_effective_provider(llm.provider.clone(), config.llm.provider.as_deref())?;
    let model = get_effective_model(llm.model.clone(), config.llm.model.clone(), &provider);
    let provider = build_llm_provider(provider, api_key, model, ollama_url)?;
    let judge = Arc::new(LlmClient::with_retry_config(provider, config.retry.clone()));
    match config.knowledge.path.as_deref() {
        Some(dir) => {
            let knowledge = Arc::new(DirectoryKnowledge::load(dir)?);
            info!(snippets = knowledge.len(), "knowledge source enabled");
            Ok(OrchestrationEngine::with_knowledge(
                judge,
                knowledge,
                config.knowledge.top_k,
                config.engine.clone()
            ))
        }
        None => Ok(OrchestrationEngine::new(judge, config.engine.clone()))
    }
}

/// Append analyzed statements to the configured history file, if any
pub fn record_history(config: &Config, entries: &[(&str, &MergedReport)]) -> AppResult<()> {
    let Some(path) = config.history.path.as_ref() else {
        return Ok(());
    };
    let records: Vec<HistoryRecord> = entries
        .iter()
        .map(|(sql, report)| HistoryRecord::from_report(sql, report))
        .collect();
    HistoryStore::new(path.clone()).append(&records)
}

/// Calculate exit code from analysis outcomes
///
/// - `2` - a statement failed, every dimension of a report failed, or a
///   security veto triggered
/// - `1` - a dimension degraded or a high/critical issue was reported
/// - `0` - otherwise
pub fn calculate_exit_code(outcomes: &[BatchOutcome]) -> i32 {
    let reports: Vec<&MergedReport> = outcomes.iter().filter_map(BatchOutcome::report).collect();
    let failed = outcomes.len() - reports.len();
    if failed > 0
        || reports
            .iter()
            .any(|r| !r.success || r.security_veto.triggered)
    {
        2
    } else if reports
        .iter()
        .any(|r| !r.degraded_dimensions().is_empty() || r.severe_issue_count() > 0)
    {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_handles_comments_and_quotes() {
        let sql = "SELECT 'a;b' FROM t; /* x; y */ SELECT \"c;\" FROM u;\n-- trailing; comment\n";
        let parts = split_statements(sql);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "SELECT 'a;b' FROM t");
        assert_eq!(parts[1], "/* x; y */ SELECT \"c;\" FROM u");
    }

    #[test]
    fn test_split_doubled_quote() {
        let parts = split_statements("SELECT 'it''s; fine'; SELECT 2");
        assert_eq!(parts, vec!["SELECT 'it''s; fine'", "SELECT 2"]);
    }

    #[test]
    fn test_split_skips_empty_chunks() {
        assert!(split_statements(" ;; ").is_empty());
    }

    #[test]
    fn test_parse_batch_json() {
        let list = parse_batch_input("batch.json", r#"["SELECT 1", "", "SELECT 2"]"#).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1], "");
    }

    #[test]
    fn test_parse_batch_yaml() {
        let list = parse_batch_input("batch.yml", "- SELECT 1\n- SELECT 2\n").unwrap();
        assert_eq!(list, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_parse_batch_invalid_json() {
        assert!(parse_batch_input("batch.json", "{not a list}").is_err());
    }

    #[test]
    fn test_build_llm_provider_requires_key() {
        let result = build_llm_provider(Provider::OpenAI, None, "gpt-4".into(), String::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_ollama_url() {
        assert_eq!(
            get_effective_ollama_url(
                "http://localhost:11434".into(),
                Some("http://gpu:11434".into())
            ),
            "http://gpu:11434"
        );
        assert_eq!(
            get_effective_ollama_url("http://other:1".into(), Some("http://gpu:11434".into())),
            "http://other:1"
        );
    }

    #[test]
    fn test_read_sql_input_requires_source() {
        assert!(read_sql_input(None, None).is_err());
        assert_eq!(read_sql_input(Some("SELECT 1".into()), None).unwrap(), "SELECT 1");
    }
}
