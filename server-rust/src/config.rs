use crate::{
    extract::DEFAULT_MAX_UPLOAD_BYTES, gateway::DEFAULT_MAX_OUTPUT_TOKENS,
    prompt::DEFAULT_CONTEXT_BUDGET_CHARS,
};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is set but empty")]
    MissingApiKey,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Parser, Clone)]
#[command(
    name = "easeai-server",
    about = "HTTP API for document-grounded chat and prompt generation backed by Gemini"
)]
pub struct Config {
    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "EASEAI_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    /// Gemini API key. Required; the server refuses to start without it.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model identifier.
    #[arg(long, env = "EASEAI_MODEL", default_value = "gemini-1.5-flash-latest")]
    pub model: String,

    /// Base URL for the Gemini REST API.
    #[arg(long, env = "EASEAI_GEMINI_BASE_URL")]
    pub base_url: Option<String>,

    /// Ceiling on generated tokens per request.
    #[arg(long, env = "EASEAI_MAX_OUTPUT_TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,

    /// Characters of document text included in a chat prompt.
    #[arg(long, env = "EASEAI_CONTEXT_BUDGET_CHARS", default_value_t = DEFAULT_CONTEXT_BUDGET_CHARS)]
    pub context_budget_chars: usize,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "EASEAI_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Directory for temporary upload files.
    #[arg(long, env = "EASEAI_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Directory served for non-API paths.
    #[arg(long, env = "EASEAI_STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Seconds before a Gemini request times out.
    #[arg(long, env = "EASEAI_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// Retry attempts for transient Gemini failures (0 sends a single request).
    #[arg(long, env = "EASEAI_MAX_RETRIES", default_value_t = 0)]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in milliseconds.
    #[arg(long, env = "EASEAI_RETRY_BASE_DELAY_MS", default_value_t = 500)]
    pub retry_base_delay_ms: u64,

    /// Log filter directive; falls back to RUST_LOG, then to a built-in default.
    #[arg(long, env = "EASEAI_LOG")]
    pub log_filter: Option<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Zero("max-output-tokens"));
        }
        if self.context_budget_chars == 0 {
            return Err(ConfigError::Zero("context-budget-chars"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Zero("max-upload-bytes"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request-timeout-secs"));
        }
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
