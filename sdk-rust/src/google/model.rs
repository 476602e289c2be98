use super::api::{
    Content, FinishReason, GenerateContentConfig, GenerateContentParameters,
    GenerateContentResponse, GenerateContentResponseUsageMetadata, Part as GooglePart,
};
use crate::{
    client_utils, LanguageModel, LanguageModelError, LanguageModelInput, LanguageModelResult,
    Message, ModelResponse, ModelUsage, Part, ReasoningPart,
};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

const PROVIDER: &str = "google";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GoogleModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Clone, Default)]
pub struct GoogleModelOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub client: Option<Client>,
}

impl GoogleModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleModelOptions) -> Self {
        let GoogleModelOptions {
            api_key,
            base_url,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
        }
    }

    /// The key travels in a header so it never shows up in error URLs.
    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&self.api_key).map_err(|error| {
            LanguageModelError::InvalidInput(format!("Invalid Google API key: {error}"))
        })?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        crate::opentelemetry::trace_generate(
            self.provider(),
            &self.model_id(),
            input,
            |input| async move {
                let params = convert_to_generate_content_parameters(input)?;

                let url = format!("{}/models/{}:generateContent", self.base_url, self.model_id);

                let headers = self.request_headers()?;
                let response: GenerateContentResponse =
                    client_utils::send_json(&self.client, &url, &params, headers).await?;

                if let Some(reason) = response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|feedback| feedback.block_reason.as_ref())
                {
                    return Err(LanguageModelError::Refusal(format!(
                        "Prompt blocked: {reason}"
                    )));
                }

                let candidate = response
                    .candidates
                    .and_then(|c| c.into_iter().next())
                    .ok_or_else(|| {
                        LanguageModelError::Invariant(PROVIDER, "No candidate in response".to_string())
                    })?;

                let content =
                    map_google_content(candidate.content.and_then(|c| c.parts).unwrap_or_default());

                if content.is_empty() {
                    if let Some(reason) = candidate.finish_reason.filter(is_blocking_reason) {
                        return Err(LanguageModelError::Refusal(format!(
                            "Response blocked: {reason:?}"
                        )));
                    }
                }

                let usage = response.usage_metadata.map(|u| map_google_usage_metadata(&u));

                Ok(ModelResponse { content, usage })
            },
        )
        .await
    }
}

fn is_blocking_reason(reason: &FinishReason) -> bool {
    matches!(
        reason,
        FinishReason::Safety
            | FinishReason::Recitation
            | FinishReason::Blocklist
            | FinishReason::ProhibitedContent
            | FinishReason::Spii
    )
}

fn convert_to_generate_content_parameters(
    input: LanguageModelInput,
) -> LanguageModelResult<GenerateContentParameters> {
    if input.messages.is_empty() {
        return Err(LanguageModelError::InvalidInput(
            "At least one message is required".to_string(),
        ));
    }

    let mut params = GenerateContentParameters {
        contents: convert_to_google_contents(input.messages),
        ..Default::default()
    };

    if let Some(system_prompt) = input.system_prompt {
        params.system_instruction = Some(Content {
            role: Some("system".to_string()),
            parts: Some(vec![GooglePart {
                text: Some(system_prompt),
                ..Default::default()
            }]),
        });
    }

    params.generation_config = Some(GenerateContentConfig {
        temperature: input.temperature,
        top_p: input.top_p,
        top_k: input.top_k,
        max_output_tokens: input.max_tokens,
        seed: input.seed,
    });

    Ok(params)
}

fn convert_to_google_contents(messages: Vec<Message>) -> Vec<Content> {
    messages
        .into_iter()
        .map(|Message::User(user_message)| Content {
            role: Some("user".to_string()),
            parts: Some(
                user_message
                    .content
                    .into_iter()
                    .map(convert_to_google_part)
                    .collect(),
            ),
        })
        .collect()
}

fn convert_to_google_part(part: Part) -> GooglePart {
    match part {
        Part::Text(text_part) => GooglePart {
            text: Some(text_part.text),
            ..Default::default()
        },
        Part::Reasoning(reasoning_part) => GooglePart {
            text: Some(reasoning_part.text),
            thought: Some(true),
            thought_signature: reasoning_part.signature,
        },
    }
}

fn map_google_content(parts: Vec<GooglePart>) -> Vec<Part> {
    parts
        .into_iter()
        .filter_map(|part| {
            let text = part.text?;
            if part.thought.unwrap_or(false) {
                let mut reasoning_part = ReasoningPart::new(text);
                if let Some(signature) = part.thought_signature {
                    reasoning_part = reasoning_part.with_signature(signature);
                }
                Some(reasoning_part.into())
            } else {
                Some(Part::text(text))
            }
        })
        .collect()
}

fn map_google_usage_metadata(usage: &GenerateContentResponseUsageMetadata) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0)
            + usage.thoughts_token_count.unwrap_or(0),
    }
}
