use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use easeai_sdk::{
    google::{GoogleModel, GoogleModelOptions},
    ErrorKind, LanguageModel, LanguageModelError, LanguageModelInput, ModelUsage, RetryModel,
    RetryPolicy,
};
use serde_json::{json, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{net::TcpListener, sync::oneshot};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
struct RecordedRequest {
    model_path: String,
    api_key: Option<String>,
    body: Value,
}

#[derive(Default)]
struct StubState {
    replies: Mutex<VecDeque<(StatusCode, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

struct StubServer {
    url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    fn model(&self, model_id: &str) -> GoogleModel {
        GoogleModel::new(
            model_id,
            GoogleModelOptions {
                api_key: "test-key".to_string(),
                base_url: Some(format!("{}/v1beta/", self.url)),
                ..Default::default()
            },
        )
    }

    async fn stop(self) -> Result<(), BoxedError> {
        if let Some(tx) = self.shutdown {
            let _ = tx.send(());
        }
        self.handle
            .await
            .map_err(|err| format!("Failed to join stub Gemini server task: {err}"))?;
        Ok(())
    }
}

async fn generate_content(
    State(state): State<Arc<StubState>>,
    Path(model_path): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(RecordedRequest {
        model_path,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });

    let (status, reply) = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "no reply" })));
    (status, Json(reply))
}

async fn start_stub_gemini(replies: Vec<(StatusCode, Value)>) -> Result<StubServer, BoxedError> {
    let state = Arc::new(StubState {
        replies: Mutex::new(replies.into()),
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1beta/models/{model_path}", post(generate_content))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(err) = server.await {
            eprintln!("Gemini stub server error: {err}");
        }
    });

    Ok(StubServer {
        url: format!("http://{addr}"),
        state,
        shutdown: Some(shutdown_tx),
        handle,
    })
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [
            {
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }
        ],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15 }
    })
}

#[tokio::test]
async fn google_model_sends_prompt_and_reads_text() -> Result<(), BoxedError> {
    let stub = start_stub_gemini(vec![(StatusCode::OK, text_reply("Paris"))]).await?;
    let model = stub.model("gemini-1.5-flash-latest");

    let input = LanguageModelInput {
        max_tokens: Some(1024),
        ..LanguageModelInput::from_prompt("What is the capital of France?")
    };
    let response = model.generate(input).await?;

    assert_eq!(response.text(), "Paris");
    assert_eq!(
        response.usage,
        Some(ModelUsage {
            input_tokens: 12,
            output_tokens: 3,
        })
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].model_path,
        "gemini-1.5-flash-latest:generateContent"
    );
    assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
    assert_eq!(
        requests[0].body["contents"][0]["parts"][0]["text"],
        "What is the capital of France?"
    );
    assert_eq!(requests[0].body["generationConfig"]["maxOutputTokens"], 1024);

    stub.stop().await
}

#[tokio::test]
async fn google_model_classifies_upstream_failures() -> Result<(), BoxedError> {
    let stub = start_stub_gemini(vec![
        (StatusCode::FORBIDDEN, json!({ "error": { "message": "API key not valid" } })),
        (StatusCode::TOO_MANY_REQUESTS, json!({ "error": { "message": "quota" } })),
        (StatusCode::OK, json!({ "candidates": [] })),
        (StatusCode::OK, json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
    ])
    .await?;
    let model = stub.model("gemini-1.5-flash-latest");

    let auth = model
        .generate(LanguageModelInput::from_prompt("one"))
        .await
        .expect_err("403 should fail");
    assert!(matches!(auth, LanguageModelError::StatusCode(status, _) if status == 403));
    assert_eq!(auth.kind(), ErrorKind::Terminal);

    let rate_limited = model
        .generate(LanguageModelInput::from_prompt("two"))
        .await
        .expect_err("429 should fail");
    assert_eq!(rate_limited.kind(), ErrorKind::Retryable);

    let empty = model
        .generate(LanguageModelInput::from_prompt("three"))
        .await
        .expect_err("no candidates should fail");
    assert!(matches!(empty, LanguageModelError::Invariant("google", _)));
    assert_eq!(empty.kind(), ErrorKind::Terminal);

    let blocked = model
        .generate(LanguageModelInput::from_prompt("four"))
        .await
        .expect_err("blocked prompt should fail");
    assert!(matches!(blocked, LanguageModelError::Refusal(_)));

    stub.stop().await
}

#[tokio::test]
async fn retry_model_retries_transient_failures_only() -> Result<(), BoxedError> {
    let stub = start_stub_gemini(vec![
        (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": "overloaded" })),
        (StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" })),
        (StatusCode::OK, text_reply("third time lucky")),
        (StatusCode::UNAUTHORIZED, json!({ "error": "bad key" })),
    ])
    .await?;
    let model = RetryModel::new(
        stub.model("gemini-1.5-flash-latest"),
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        },
    );

    let response = model
        .generate(LanguageModelInput::from_prompt("hello"))
        .await?;
    assert_eq!(response.text(), "third time lucky");
    assert_eq!(stub.requests().len(), 3);

    let terminal = model
        .generate(LanguageModelInput::from_prompt("hello again"))
        .await
        .expect_err("401 should not be retried");
    assert_eq!(terminal.kind(), ErrorKind::Terminal);
    assert_eq!(stub.requests().len(), 4);

    stub.stop().await
}

#[tokio::test]
async fn retry_model_gives_up_after_max_retries() -> Result<(), BoxedError> {
    let stub = start_stub_gemini(vec![
        (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        (StatusCode::OK, text_reply("too late")),
    ])
    .await?;
    let model = RetryModel::new(
        stub.model("gemini-1.5-flash-latest"),
        RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
        },
    );

    let error = model
        .generate(LanguageModelInput::from_prompt("hello"))
        .await
        .expect_err("two 500s exhaust a single retry");
    assert!(error.is_retryable());
    assert_eq!(stub.requests().len(), 2);

    stub.stop().await
}
