use std::{collections::VecDeque, sync::Mutex};

use crate::{
    errors::{LanguageModelError, LanguageModelResult},
    language_model::LanguageModel,
    LanguageModelInput, ModelResponse, Part,
};

type Responder =
    Box<dyn FnOnce(&LanguageModelInput) -> LanguageModelResult<ModelResponse> + Send>;

/// Result for a mocked `generate` call.
/// It can be a full response, an error, or a function of the tracked input.
pub enum MockGenerateResult {
    Response(ModelResponse),
    Error(LanguageModelError),
    Respond(Responder),
}

impl MockGenerateResult {
    /// Construct a result that yields the provided response.
    pub fn response(response: ModelResponse) -> Self {
        Self::Response(response)
    }

    /// Construct a result holding a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Response(ModelResponse {
            content: vec![Part::text(text)],
            ..ModelResponse::default()
        })
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: LanguageModelError) -> Self {
        Self::Error(error)
    }

    /// Construct a result computed from the input the model receives.
    pub fn respond<F>(respond: F) -> Self
    where
        F: FnOnce(&LanguageModelInput) -> LanguageModelResult<ModelResponse> + Send + 'static,
    {
        Self::Respond(Box::new(respond))
    }
}

impl From<ModelResponse> for MockGenerateResult {
    fn from(response: ModelResponse) -> Self {
        Self::response(response)
    }
}

impl From<LanguageModelResult<ModelResponse>> for MockGenerateResult {
    fn from(result: LanguageModelResult<ModelResponse>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Error(error),
        }
    }
}

#[derive(Default)]
struct MockLanguageModelState {
    mocked_generate_results: VecDeque<MockGenerateResult>,
    tracked_generate_inputs: Vec<LanguageModelInput>,
}

impl MockLanguageModelState {
    fn enqueue_generate_result(&mut self, result: MockGenerateResult) {
        self.mocked_generate_results.push_back(result);
    }

    fn reset(&mut self) {
        self.tracked_generate_inputs.clear();
    }

    fn restore(&mut self) {
        self.mocked_generate_results.clear();
        self.reset();
    }
}

/// A mock language model for testing that tracks inputs and yields predefined outputs.
pub struct MockLanguageModel {
    provider: &'static str,
    model_id: String,
    state: Mutex<MockLanguageModelState>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self {
            provider: "mock",
            model_id: "mock-model".to_string(),
            state: Mutex::new(MockLanguageModelState::default()),
        }
    }
}

impl MockLanguageModel {
    /// Construct a new mock language model instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one or more mocked generate results.
    pub fn enqueue_generate_results<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockGenerateResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        for result in results {
            state.enqueue_generate_result(result);
        }
        drop(state);
        self
    }

    /// Convenience to enqueue a single mocked generate result.
    pub fn enqueue_generate<R>(&self, result: R) -> &Self
    where
        R: Into<MockGenerateResult>,
    {
        self.enqueue_generate_results(std::iter::once(result.into()))
    }

    /// Retrieve the tracked generate inputs accumulated so far.
    pub fn tracked_generate_inputs(&self) -> Vec<LanguageModelInput> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_generate_inputs.clone()
    }

    /// Number of `generate` calls received so far.
    pub fn generate_call_count(&self) -> usize {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_generate_inputs.len()
    }

    /// Reset tracked inputs without touching enqueued results.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.reset();
    }

    /// Clear both tracked inputs and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

#[async_trait::async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider(&self) -> &'static str {
        self.provider
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let result = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.tracked_generate_inputs.push(input.clone());

            state.mocked_generate_results.pop_front().ok_or_else(|| {
                LanguageModelError::Invariant(
                    self.provider,
                    "no mocked generate results available".into(),
                )
            })?
        };

        match result {
            MockGenerateResult::Response(response) => Ok(response),
            MockGenerateResult::Error(error) => Err(error),
            MockGenerateResult::Respond(respond) => respond(&input),
        }
    }
}
