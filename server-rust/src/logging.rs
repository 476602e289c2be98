use crate::error::BoxedError;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "easeai_server=info,easeai_sdk=info,tower_http=info";

/// Resolves the filter from an explicit directive, then `RUST_LOG`, then
/// [`DEFAULT_LOG_FILTER`].
pub fn filter(directive: Option<&str>) -> Result<EnvFilter, BoxedError> {
    match directive {
        Some(directive) => Ok(EnvFilter::try_new(directive)?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))),
    }
}

/// Installs the global subscriber. Call once, before the server starts.
pub fn init(directive: Option<&str>) -> Result<(), BoxedError> {
    let subscriber = tracing_subscriber::registry()
        .with(filter(directive)?)
        .with(tracing_subscriber::fmt::layer().with_target(true));

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
