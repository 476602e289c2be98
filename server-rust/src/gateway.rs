use easeai_sdk::{LanguageModel, LanguageModelInput, LanguageModelResult};
use std::sync::Arc;

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: Option<f64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: None,
        }
    }
}

/// The one path from request handlers to the hosted model.
///
/// It knows nothing about prompt contents: a prompt goes in, text or a
/// [`LanguageModelError`](easeai_sdk::LanguageModelError) comes out. The
/// model's text is passed through as is, even when empty. The configured
/// output cap is a ceiling that per-call options can lower but never raise.
#[derive(Clone)]
pub struct GenerationGateway {
    model: Arc<dyn LanguageModel>,
    options: GenerationOptions,
}

impl GenerationGateway {
    pub fn new(model: Arc<dyn LanguageModel>, options: GenerationOptions) -> Self {
        Self { model, options }
    }

    pub async fn generate(&self, prompt: impl Into<String>) -> LanguageModelResult<String> {
        let options = self.options;
        self.generate_with(prompt, &options).await
    }

    pub async fn generate_with(
        &self,
        prompt: impl Into<String>,
        options: &GenerationOptions,
    ) -> LanguageModelResult<String> {
        let input = LanguageModelInput {
            max_tokens: Some(options.max_output_tokens.min(self.options.max_output_tokens)),
            temperature: options.temperature,
            ..LanguageModelInput::from_prompt(prompt)
        };

        let text = self.model.generate(input).await?.text();

        tracing::debug!(
            provider = self.model.provider(),
            model = %self.model.model_id(),
            chars = text.chars().count(),
            "generation succeeded"
        );
        Ok(text)
    }
}
