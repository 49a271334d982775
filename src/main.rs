//! # SQL Analysis Engine
//!
//! LLM-orchestrated review of SQL statements.
//!
//! Every statement is judged along up to three independent dimensions
//! (performance, security, standards). Each dimension is a separate LLM call
//! made concurrently under an engine-wide cap and a per-call timeout. The
//! free-text answers are parsed best-effort, merged into one report with an
//! overall score, and a severe security finding vetoes the score regardless
//! of the other dimensions.
//!
//! # Quick Start
//!
//! ```bash
//! # Analyze one statement with a local Ollama model
//! sql-analysis-engine analyze --sql "SELECT * FROM users WHERE name LIKE '%a'"
//!
//! # Only the security dimension, JSON output
//! sql-analysis-engine analyze -i query.sql -D security -f json
//!
//! # Batch of statements, two at a time
//! export LLM_API_KEY="sk-..."
//! sql-analysis-engine batch -i queries.sql --provider open-ai --batch-concurrency 2
//!
//! # Dialect detection only, no LLM call
//! echo "SELECT TOP 5 [id] FROM [users]" | sql-analysis-engine detect -i -
//! ```
//!
//! # Exit Codes
//!
//! - `0` - All reports succeeded without severe findings
//! - `1` - A dimension degraded or a high/critical issue was found, or a fatal
//!   error occurred
//! - `2` - A statement failed entirely or a security veto triggered

use std::process;

use clap::Parser;
use sql_analysis_engine::{
    app::{config_path, output_args, run_command},
    cli::Cli,
    config::Config,
    error::AppResult,
    logging::init_logging
};
use tokio::main;

#[main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load(config_path(&cli.command))?;
    let output = output_args(&cli.command);
    init_logging(&config.logging, output.verbose, !output.no_color);

    let result = run_command(cli.command, config).await?;
    for line in result.stdout {
        println!("{}", line);
    }
    Ok(result.exit_code)
}
