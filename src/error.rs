pub use masterror::{AppError, AppResult};

/// Create validation error for malformed requests
///
/// Raised before any Judge call is made and never retried.
pub fn validation_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(format!("Validation error: {}", message.into()))
}

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create file write error
pub fn file_write_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to write file '{}': {}", path, source))
}

/// Create LLM API error
pub fn llm_api_error(message: impl Into<String>) -> AppError {
    AppError::service(message.into())
}

/// Create error for a Judge call that exceeded its deadline
pub fn judge_timeout_error(timeout_ms: u64) -> AppError {
    AppError::service(format!("Judge call timed out after {}ms", timeout_ms))
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> AppError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else {
        err.to_string()
    };
    AppError::service(msg)
}

/// Create error for a report that could not be rendered as JSON or YAML
pub fn serialization_error(format: &str, message: impl std::fmt::Display) -> AppError {
    AppError::internal(format!("Failed to render {} output: {}", format, message))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create batch input error with the 1-based statement position
pub fn batch_input_error(position: usize, message: impl Into<String>) -> AppError {
    let msg = message.into();
    AppError::bad_request(format!("Batch input error at statement {}:\n  {}", position, msg))
}
