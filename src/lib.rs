//! # SQL Analysis Engine Library
//!
//! Orchestrates LLM judgments of SQL statements across performance, security
//! and standards dimensions and merges them into a single scored report.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dialect;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod history;
pub mod judge;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod merge;
pub mod output;
pub mod parser;
