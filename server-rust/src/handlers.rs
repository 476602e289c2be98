use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// Multipart field that carries the uploaded document.
pub const DOCUMENT_FIELD: &str = "document";

const UPLOAD_OK: &str = "Document processed successfully! You can now ask questions.";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn api_index() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to EaseAi API!".to_string(),
    })
}

/// Forwards a caller-built prompt to the model.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let prompt = request
        .prompt
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Prompt is required"))?;

    tracing::info!(prompt_chars = prompt.chars().count(), "generating content");
    let response = state
        .gateway
        .generate(prompt)
        .await
        .map_err(|source| ApiError::generation("Failed to generate content", source))?;

    Ok(Json(GenerateResponse { response }))
}

/// Replaces the stored document with the text of the uploaded file.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "upload is not multipart");
        ApiError::validation("No file uploaded.")
    })?;

    let mut document = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        document = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = document.ok_or_else(|| ApiError::validation("No file uploaded."))?;
    tracing::info!(
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = bytes.len(),
        "extracting document"
    );

    let text = state.extractor.extract(bytes).await?;
    state.store.replace(text);
    tracing::info!(chars = state.store.len_chars(), "document stored");

    Ok(Json(MessageResponse {
        message: UPLOAD_OK.to_string(),
    }))
}

/// Answers a question using only the stored document.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let question = request.question.unwrap_or_default();

    let document = state.store.current();
    let prompt = state.prompts.build(&document, &question)?;

    tracing::info!(
        document_chars = document.chars().count(),
        budget_chars = state.prompts.budget_chars(),
        "answering question"
    );
    let response = state
        .gateway
        .generate(prompt)
        .await
        .map_err(|source| ApiError::generation("Failed to chat with document.", source))?;

    Ok(Json(GenerateResponse { response }))
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::warn!(error = %rejection.body_text(), "invalid JSON body");
    ApiError::validation("Request body must be a JSON object.")
}

fn multipart_error(error: MultipartError) -> ApiError {
    tracing::warn!(error = %error.body_text(), "malformed multipart upload");
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::validation("The uploaded document exceeds the size limit.")
    } else {
        ApiError::validation("Malformed multipart upload.")
    }
}
