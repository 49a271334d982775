use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// SQL Analysis Engine - LLM-orchestrated performance, security and standards review
#[derive(Parser, Debug)]
#[command(name = "sql-analysis-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single SQL statement
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Dimensions to run (default: all)
        #[arg(short = 'D', long = "dimension", value_enum, value_delimiter = ',')]
        dimensions: Vec<DimensionArg>,

        /// Dialect hint; skips dialect detection
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        #[command(flatten)]
        llm: LlmArgs,

        #[command(flatten)]
        output: OutputArgs
    },
    /// Analyze many statements from a file
    Batch {
        /// Statements file: `;`-separated SQL, or a JSON/YAML list of strings
        /// (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Dimensions to run (default: all)
        #[arg(short = 'D', long = "dimension", value_enum, value_delimiter = ',')]
        dimensions: Vec<DimensionArg>,

        /// Dialect hint applied to every statement
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Statements analyzed at the same time
        #[arg(long)]
        batch_concurrency: Option<usize>,

        #[command(flatten)]
        llm: LlmArgs,

        #[command(flatten)]
        output: OutputArgs
    },
    /// Detect the SQL dialect without calling the LLM
    Detect {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs
    }
}

/// Where to read a single statement from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// SQL statement text
    #[arg(long)]
    pub sql: Option<String>,

    /// Path to a file containing the statement (use - for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>
}

/// LLM connection settings
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// LLM provider to use [default: config `llm.provider`, then ollama]
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// API key for OpenAI or Anthropic
    #[arg(short, long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long, default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Retries for transient LLM failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Per-dimension timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Maximum simultaneous LLM calls
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Directory of markdown/text guidelines used to enrich prompts
    #[arg(long)]
    pub knowledge: Option<PathBuf>,

    /// Append results to this JSON Lines history file
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Explicit configuration file
    #[arg(long)]
    pub config: Option<PathBuf>
}

/// Presentation settings
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub output_format: Format,

    /// Verbose output: per-dimension summaries, engine stats, debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(alias = "openai")]
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DimensionArg {
    Performance,
    Security,
    Standards
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlserver,
    Oracle
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
