mod client_utils;
mod errors;
pub mod google;
mod language_model;
pub mod llm_sdk_test;
mod opentelemetry;
mod retry;
mod types;
mod types_ext;

pub use errors::*;
pub use language_model::LanguageModel;
pub use retry::{RetryModel, RetryPolicy};
pub use types::*;
