//! Application logic for the SQL Analysis Engine CLI.
//!
//! This module contains the command runners separated from the main entry
//! point to enable testing.

mod analyze;
mod convert;
mod helpers;
mod types;

pub use analyze::{run_analyze, run_batch, run_detect};
pub use convert::{convert_dialect, convert_dimension, convert_format};
pub use helpers::{
    apply_overrides, build_engine, build_llm_provider, calculate_exit_code,
    get_effective_model, get_effective_ollama_url, get_effective_provider, parse_batch_input, read_sql_input,
    read_text_input, record_history, split_statements
};
pub use types::{AnalyzeParams, BatchParams, CommandOutput, DetectParams, LlmParams};

use crate::{
    cli::{Commands, InputArgs, LlmArgs, OutputArgs},
    config::Config,
    error::AppResult,
    output::OutputOptions
};

/// Create output options from CLI arguments
pub fn create_output_options(args: &OutputArgs) -> OutputOptions {
    OutputOptions {
        format:  convert_format(args.output_format),
        colored: !args.no_color,
        verbose: args.verbose
    }
}

fn llm_params(args: LlmArgs) -> LlmParams {
    LlmParams {
        provider:        args.provider,
        api_key:         args.api_key,
        model:           args.model,
        ollama_url:      args.ollama_url,
        max_retries:     args.max_retries,
        timeout_ms:      args.timeout_ms,
        max_concurrency: args.max_concurrency,
        knowledge:       args.knowledge,
        history:         args.history
    }
}

fn input_path(args: &InputArgs) -> Option<String> {
    args.input.as_ref().map(|p| p.display().to_string())
}

/// Explicit `--config` path of a command, if it takes one
pub fn config_path(command: &Commands) -> Option<&std::path::Path> {
    match command {
        Commands::Analyze {
            llm, ..
        }
        | Commands::Batch {
            llm, ..
        } => llm.config.as_deref(),
        Commands::Detect {
            ..
        } => None
    }
}

/// Output arguments of a command
pub fn output_args(command: &Commands) -> &OutputArgs {
    match command {
        Commands::Analyze {
            output, ..
        }
        | Commands::Batch {
            output, ..
        }
        | Commands::Detect {
            output, ..
        } => output
    }
}

/// Dispatch a parsed command
pub async fn run_command(command: Commands, config: Config) -> AppResult<CommandOutput> {
    match command {
        Commands::Analyze {
            input,
            dimensions,
            dialect,
            llm,
            output
        } => {
            let params = AnalyzeParams {
                input_path: input_path(&input),
                sql:        input.sql,
                dimensions: dimensions.into_iter().map(convert_dimension).collect(),
                dialect:    dialect.map(convert_dialect),
                llm:        llm_params(llm),
                output:     create_output_options(&output)
            };
            run_analyze(params, config).await
        }
        Commands::Batch {
            input,
            dimensions,
            dialect,
            batch_concurrency,
            llm,
            output
        } => {
            let params = BatchParams {
                input_path: input.display().to_string(),
                dimensions: dimensions.into_iter().map(convert_dimension).collect(),
                dialect: dialect.map(convert_dialect),
                batch_concurrency,
                llm: llm_params(llm),
                output: create_output_options(&output)
            };
            run_batch(params, config).await
        }
        Commands::Detect {
            input,
            output
        } => {
            let params = DetectParams {
                input_path: input_path(&input),
                sql:        input.sql,
                output:     create_output_options(&output)
            };
            run_detect(params)
        }
    }
}
