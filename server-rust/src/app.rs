use crate::{
    config::Config,
    error::BoxedError,
    extract::{PdfExtractor, TextExtractor},
    gateway::{GenerationGateway, GenerationOptions},
    handlers,
    prompt::PromptBuilder,
    store::DocumentStore,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use easeai_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    LanguageModel, RetryModel, RetryPolicy,
};
use std::{path::Path, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Everything the handlers share. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub prompts: PromptBuilder,
    pub gateway: GenerationGateway,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &Config, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            store: Arc::new(DocumentStore::new()),
            extractor: Arc::new(PdfExtractor::new(
                config.upload_dir.clone(),
                config.max_upload_bytes,
            )),
            prompts: PromptBuilder::new(config.context_budget_chars),
            gateway: GenerationGateway::new(
                model,
                GenerationOptions {
                    max_output_tokens: config.max_output_tokens,
                    temperature: None,
                },
            ),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Builds the Gemini client, wrapped for retries when configured.
pub fn build_model(config: &Config) -> Result<Arc<dyn LanguageModel>, BoxedError> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    let model = GoogleModel::new(
        config.model.clone(),
        GoogleModelOptions {
            api_key: config.gemini_api_key.clone(),
            base_url: config.base_url.clone(),
            client: Some(client),
            ..Default::default()
        },
    );

    if config.max_retries == 0 {
        return Ok(Arc::new(model));
    }

    Ok(Arc::new(RetryModel::new(
        model,
        RetryPolicy {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        },
    )))
}

/// API routes, plus static files from `static_dir` for every other path.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut app = Router::new()
        .route("/api", get(handlers::api_index))
        .route("/api/generate", post(handlers::generate))
        .route("/api/upload", post(handlers::upload))
        .route("/api/chat", post(handlers::chat))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if let Some(static_dir) = static_dir {
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    app.layer(TraceLayer::new_for_http())
}
