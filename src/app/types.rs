//! Application types for CLI commands.
//!
//! This module defines the parameter structures passed from the CLI to the
//! command runners and the output they produce.

use std::path::PathBuf;

use crate::{cli::Provider, dialect::SqlDialect, dimension::Dimension, output::OutputOptions};

/// LLM and engine settings shared by commands that call the Judge.
///
/// `None` fields fall back to the loaded configuration.
#[derive(Debug, Clone)]
pub struct LlmParams {
    /// LLM provider used as the Judge; `None` defers to the configuration.
    pub provider:        Option<Provider>,
    /// API key for cloud LLM providers (OpenAI, Anthropic).
    pub api_key:         Option<String>,
    /// Model name to use.
    pub model:           Option<String>,
    /// Base URL for Ollama server.
    pub ollama_url:      String,
    /// Retries for transient LLM failures.
    pub max_retries:     Option<u32>,
    /// Per-dimension timeout in milliseconds.
    pub timeout_ms:      Option<u64>,
    /// Engine-wide cap on simultaneous Judge calls.
    pub max_concurrency: Option<usize>,
    /// Knowledge directory for prompt enrichment.
    pub knowledge:       Option<PathBuf>,
    /// History file to append results to.
    pub history:         Option<PathBuf>
}

/// Parameters for the analyze command.
///
/// # Example
///
/// ```
/// use sql_analysis_engine::{
///     app::{AnalyzeParams, LlmParams},
///     cli::Provider,
///     output::OutputOptions
/// };
///
/// let params = AnalyzeParams {
///     sql:        Some("SELECT 1".to_string()),
///     input_path: None,
///     dimensions: vec![],
///     dialect:    None,
///     llm:        LlmParams {
///         provider:        Some(Provider::Ollama),
///         api_key:         None,
///         model:           None,
///         ollama_url:      "http://localhost:11434".to_string(),
///         max_retries:     None,
///         timeout_ms:      None,
///         max_concurrency: None,
///         knowledge:       None,
///         history:         None
///     },
///     output:     OutputOptions::default()
/// };
/// assert!(params.dimensions.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzeParams {
    /// Inline SQL text.
    pub sql:        Option<String>,
    /// Path to a statement file or "-" for stdin.
    pub input_path: Option<String>,
    /// Requested dimensions; empty means all.
    pub dimensions: Vec<Dimension>,
    /// Dialect hint.
    pub dialect:    Option<SqlDialect>,
    pub llm:        LlmParams,
    pub output:     OutputOptions
}

/// Parameters for the batch command.
#[derive(Debug, Clone)]
pub struct BatchParams {
    /// Path to the statements file or "-" for stdin.
    pub input_path:        String,
    pub dimensions:        Vec<Dimension>,
    pub dialect:           Option<SqlDialect>,
    /// Statements analyzed at the same time.
    pub batch_concurrency: Option<usize>,
    pub llm:               LlmParams,
    pub output:            OutputOptions
}

/// Parameters for the detect command.
#[derive(Debug, Clone)]
pub struct DetectParams {
    pub sql:        Option<String>,
    pub input_path: Option<String>,
    pub output:     OutputOptions
}

/// Output from CLI command execution.
///
/// # Example
///
/// ```
/// use sql_analysis_engine::app::CommandOutput;
///
/// let output = CommandOutput {
///     exit_code: 0,
///     stdout:    vec!["Analysis complete.".to_string()]
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code for the process (0=clean, 1=findings or degraded, 2=failure or veto).
    pub exit_code: i32,
    /// Lines to print to stdout.
    pub stdout:    Vec<String>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_clone() {
        let output = CommandOutput {
            exit_code: 1,
            stdout:    vec!["error".to_string()]
        };
        let cloned = output.clone();
        assert_eq!(cloned.exit_code, 1);
        assert_eq!(cloned.stdout.len(), 1);
    }

    #[test]
    fn test_detect_params_debug() {
        let params = DetectParams {
            sql:        Some("SELECT 1".to_string()),
            input_path: None,
            output:     OutputOptions::default()
        };
        assert!(format!("{:?}", params).contains("DetectParams"));
    }
}
