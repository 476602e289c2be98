pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod logging;
pub mod prompt;
pub mod store;

pub use app::{build_model, router, AppState};
pub use config::Config;
pub use error::{ApiError, BoxedError};
