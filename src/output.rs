use colored::Colorize;
use serde::Serialize;

use crate::{
    dialect::DialectGuess,
    dimension::Severity,
    engine::{BatchOutcome, EngineStats},
    error::{AppResult, serialization_error},
    merge::{MergedReport, score_label}
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    pub verbose: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            verbose: false
        }
    }
}

/// Machine-readable rendering, `None` for text output
fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> AppResult<Option<String>> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(Some)
            .map_err(|e| serialization_error("JSON", e)),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(Some)
            .map_err(|e| serialization_error("YAML", e)),
        OutputFormat::Text => Ok(None)
    }
}

fn paint(text: &str, opts: &OutputOptions, f: impl Fn(&str) -> String) -> String {
    if opts.colored { f(text) } else { text.to_string() }
}

fn severity_label(severity: Severity, opts: &OutputOptions) -> String {
    let label = format!("[{}]", severity);
    paint(&label, opts, |s| match severity {
        Severity::Critical => s.red().bold().to_string(),
        Severity::High => s.red().to_string(),
        Severity::Medium => s.yellow().to_string(),
        Severity::Low => s.blue().to_string()
    })
}

fn score_text(score: u8, opts: &OutputOptions) -> String {
    let text = format!("{}/100 ({})", score, score_label(score));
    paint(&text, opts, |s| match score {
        80.. => s.green().to_string(),
        60..=79 => s.yellow().to_string(),
        _ => s.red().to_string()
    })
}

/// Format a single merged report
pub fn format_report(report: &MergedReport, opts: &OutputOptions) -> AppResult<String> {
    if let Some(serialized) = serialize(report, opts.format)? {
        return Ok(serialized);
    }
    let mut output = String::new();
    output.push_str(&paint("=== SQL Analysis Report ===", opts, |s| s.bold().to_string()));
    output.push_str("\n\n");
    output.push_str(&format!("Dialect: {}\n", report.dialect));
    output.push_str(&format!(
        "Overall score: {}\n",
        score_text(report.overall_score, opts)
    ));
    if report.security_veto.triggered {
        let reason = report.security_veto.reason.as_deref().unwrap_or("unknown");
        let line = format!("Security veto: {}", reason);
        output.push_str(&paint(&line, opts, |s| s.red().bold().to_string()));
        output.push('\n');
    }
    output.push_str(&format!("\n{}\n", report.summary));

    if !report.all_issues.is_empty() {
        output.push_str(&paint("\nIssues:", opts, |s| s.cyan().bold().to_string()));
        output.push('\n');
        for issue in &report.all_issues {
            output.push_str(&format!(
                "  {} ({}) {}\n",
                severity_label(issue.severity, opts),
                issue.dimension,
                issue.description
            ));
        }
    }
    if !report.all_recommendations.is_empty() {
        output.push_str(&paint("\nRecommendations:", opts, |s| s.cyan().bold().to_string()));
        output.push('\n');
        for rec in &report.all_recommendations {
            output.push_str(&format!("  - ({}) {}\n", rec.dimension, rec.text));
        }
    }

    output.push_str(&paint("\nDimensions:", opts, |s| s.cyan().bold().to_string()));
    output.push('\n');
    for result in report.per_dimension.values() {
        if result.success {
            let score = result
                .payload
                .dimension_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {}: score {}, confidence {:.2} ({}, {}ms)\n",
                result.dimension, score, result.confidence, result.strategy, result.duration_ms
            ));
        } else {
            let line = format!(
                "  {}: degraded ({})",
                result.dimension,
                result.error.as_deref().unwrap_or("no judgment")
            );
            output.push_str(&paint(&line, opts, |s| s.yellow().to_string()));
            output.push('\n');
        }
        if opts.verbose && !result.payload.summary.is_empty() {
            output.push_str(&format!("    {}\n", result.payload.summary));
        }
    }
    Ok(output)
}

/// Format batch outcomes in input order
pub fn format_batch(outcomes: &[BatchOutcome], opts: &OutputOptions) -> AppResult<String> {
    if let Some(serialized) = serialize(outcomes, opts.format)? {
        return Ok(serialized);
    }
    let mut output = String::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        let header = format!("--- Statement #{} ---", i + 1);
        output.push_str(&paint(&header, opts, |s| s.cyan().bold().to_string()));
        output.push('\n');
        match outcome {
            BatchOutcome::Report(report) => output.push_str(&format_report(report, opts)?),
            BatchOutcome::Failed {
                error, ..
            } => {
                let line = format!("Failed: {}", error);
                output.push_str(&paint(&line, opts, |s| s.red().to_string()));
                output.push('\n');
            }
        }
        output.push('\n');
    }
    Ok(output)
}

/// Format a dialect guess
pub fn format_dialect_guess(guess: &DialectGuess, opts: &OutputOptions) -> AppResult<String> {
    if let Some(serialized) = serialize(guess, opts.format)? {
        return Ok(serialized);
    }
    Ok(format!(
        "Dialect: {} (matched signatures: {})",
        guess.dialect, guess.match_score
    ))
}

/// Format engine counters
pub fn format_stats(stats: &EngineStats, opts: &OutputOptions) -> AppResult<String> {
    if let Some(serialized) = serialize(stats, opts.format)? {
        return Ok(serialized);
    }
    Ok(format!(
        "Engine stats: {} calls, {} succeeded, {} failed, {} cache hits ({:.0}%), average {:.0}ms",
        stats.total_calls,
        stats.success_count,
        stats.error_count,
        stats.cache_hits,
        stats.cache_hit_rate * 100.0,
        stats.average_duration_ms
    ))
}
