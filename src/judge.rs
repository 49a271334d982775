//! The Judge: an external oracle that turns a prompt into free text.
//!
//! The engine never assumes anything about the returned text; it is handed to
//! the [`parser`](crate::parser) which degrades gracefully on garbage. Any
//! error returned by [`Judge::invoke`] is absorbed by the dimension worker.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppResult;

/// Per-call options passed to the Judge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeOptions {
    pub timeout:           Duration,
    pub max_output_tokens: u32
}

impl Default for JudgeOptions {
    fn default() -> Self {
        Self {
            timeout:           Duration::from_secs(60),
            max_output_tokens: 2048
        }
    }
}

/// Raw Judge output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeResponse {
    pub text: String
}

impl From<String> for JudgeResponse {
    fn from(text: String) -> Self {
        Self {
            text
        }
    }
}

/// Text-generation backend that judges SQL quality.
///
/// Implementations must be `Send + Sync`; the engine calls them from
/// concurrently spawned tasks.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Send a prompt and receive free text
    async fn invoke(&self, prompt: &str, options: &JudgeOptions) -> AppResult<JudgeResponse>;
}
