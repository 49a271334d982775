//! Analysis dimensions and the workers that judge them.
//!
//! A dimension is one independent axis of SQL judgment. Each enabled
//! dimension of a request is handled by a [`DimensionWorker`], which builds a
//! dimension-specific prompt, calls the [`Judge`](crate::judge::Judge) under a
//! deadline and runs the response through the [`parser`](crate::parser).
//!
//! ```text
//! ┌───────────┐   prompt   ┌─────────┐   text   ┌──────────┐
//! │  Worker   │───────────▶│  Judge  │─────────▶│  Parser  │──▶ DimensionResult
//! └───────────┘            └─────────┘          └──────────┘
//!       │ error / timeout                             │ fallback
//!       └───────────────────▶ degraded result ◀───────┘
//! ```

mod prompt;
mod types;
mod worker;

pub use prompt::build_prompt;
pub use types::{
    Dimension, DimensionPayload, DimensionResult, FALLBACK_CONFIDENCE, Issue, ParseStrategy,
    RiskLevel, Severity, normalize_dimensions
};
pub use worker::{DimensionWorker, UNPARSEABLE_RESPONSE};
