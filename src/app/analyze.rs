//! Command execution logic.
//!
//! Each runner resolves its input, assembles the engine from configuration
//! and CLI overrides, runs the analysis and formats the result. Runners never
//! print; they return a [`CommandOutput`] for the entry point to emit.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::{
    helpers::{
        apply_overrides, build_engine, calculate_exit_code, parse_batch_input, read_sql_input,
        read_text_input, record_history
    },
    types::{AnalyzeParams, BatchParams, CommandOutput, DetectParams}
};
use crate::{
    config::Config,
    dialect::identify,
    engine::{AnalysisRequest, BatchOutcome, OrchestrationEngine},
    error::AppResult,
    output::{
        OutputFormat, OutputOptions, format_batch, format_dialect_guess, format_report,
        format_stats
    }
};

fn spinner(opts: &OutputOptions, message: &str) -> Option<ProgressBar> {
    if opts.format != OutputFormat::Text {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn stats_line(engine: &OrchestrationEngine, opts: &OutputOptions) -> AppResult<Option<String>> {
    if opts.verbose && opts.format == OutputFormat::Text {
        format_stats(&engine.stats(), opts).map(Some)
    } else {
        Ok(None)
    }
}

/// Analyze one statement.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the configuration is
/// invalid, or the statement is empty. Judge failures are reported inside
/// the returned report, not as errors.
///
/// # Example
///
/// ```no_run
/// use sql_analysis_engine::{
///     app::{AnalyzeParams, LlmParams, run_analyze},
///     cli::Provider,
///     config::Config,
///     output::OutputOptions
/// };
///
/// # async fn example() -> sql_analysis_engine::error::AppResult<()> {
/// let params = AnalyzeParams {
///     sql:        Some("DELETE FROM users".to_string()),
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
/// let output = run_analyze(params, Config::default()).await?;
/// for line in output.stdout {
///     println!("{}", line);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_analyze(params: AnalyzeParams, config: Config) -> AppResult<CommandOutput> {
    let sql = read_sql_input(params.sql, params.input_path.as_deref())?;
    let config = apply_overrides(config, &params.llm)?;
    let engine = build_engine(&config, &params.llm)?;

    let mut request = AnalysisRequest::new(sql.clone()).with_dimensions(params.dimensions);
    if let Some(dialect) = params.dialect {
        request = request.with_dialect_hint(dialect);
    }

    let pb = spinner(&params.output, "Analyzing statement...");
    let result = engine.analyze(&request).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let report = result?;

    record_history(&config, &[(sql.as_str(), &report)])?;

    let mut stdout = vec![format_report(&report, &params.output)?];
    stdout.extend(stats_line(&engine, &params.output)?);
    Ok(CommandOutput {
        exit_code: calculate_exit_code(&[BatchOutcome::Report(report)]),
        stdout
    })
}

/// Analyze every statement of a batch file.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the batch is
/// empty or too large. Individual statement failures are reported as
/// failed entries.
pub async fn run_batch(params: BatchParams, config: Config) -> AppResult<CommandOutput> {
    let content = read_text_input(&params.input_path)?;
    let statements = parse_batch_input(&params.input_path, &content)?;
    let config = apply_overrides(config, &params.llm)?;
    let engine = build_engine(&config, &params.llm)?;

    let requests: Vec<AnalysisRequest> = statements
        .iter()
        .map(|sql| {
            let request =
                AnalysisRequest::new(sql.clone()).with_dimensions(params.dimensions.clone());
            match params.dialect {
                Some(dialect) => request.with_dialect_hint(dialect),
                None => request
            }
        })
        .collect();

    let message = format!("Analyzing {} statements...", requests.len());
    let pb = spinner(&params.output, &message);
    let result = engine
        .analyze_batch(requests, params.batch_concurrency)
        .await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let outcomes = result?;

    let analyzed: Vec<(&str, _)> = statements
        .iter()
        .zip(&outcomes)
        .filter_map(|(sql, outcome)| outcome.report().map(|r| (sql.as_str(), r)))
        .collect();
    record_history(&config, &analyzed)?;

    let mut stdout = vec![format_batch(&outcomes, &params.output)?];
    stdout.extend(stats_line(&engine, &params.output)?);
    Ok(CommandOutput {
        exit_code: calculate_exit_code(&outcomes),
        stdout
    })
}

/// Detect the dialect of a statement without calling the Judge.
pub fn run_detect(params: DetectParams) -> AppResult<CommandOutput> {
    let sql = read_sql_input(params.sql, params.input_path.as_deref())?;
    let guess = identify(&sql);
    Ok(CommandOutput {
        exit_code: 0,
        stdout:    vec![format_dialect_guess(&guess, &params.output)?]
    })
}
