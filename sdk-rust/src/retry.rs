use crate::{LanguageModel, LanguageModelInput, LanguageModelResult, ModelResponse};
use rand::Rng;
use std::time::Duration;

/// Upper bound on the backoff exponent, i.e. delays never exceed 32x base.
const MAX_BACKOFF_EXPONENT: u32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first one. Zero disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): exponential with up to
    /// 25% random jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let delay = self.base_delay.saturating_mul(1 << exponent);
        let jitter_ceiling = u64::try_from(delay.as_millis() / 4).unwrap_or(u64::MAX);
        let jitter = if jitter_ceiling == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ceiling)
        };
        delay.saturating_add(Duration::from_millis(jitter))
    }
}

/// Wraps a model and repeats calls that fail with a retryable error.
pub struct RetryModel<M> {
    inner: M,
    policy: RetryPolicy,
}

impl<M: LanguageModel> RetryModel<M> {
    pub fn new(inner: M, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait::async_trait]
impl<M: LanguageModel> LanguageModel for RetryModel<M> {
    fn provider(&self) -> &'static str {
        self.inner.provider()
    }

    fn model_id(&self) -> String {
        self.inner.model_id()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(input.clone()).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        provider = self.inner.provider(),
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "retrying generation after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
