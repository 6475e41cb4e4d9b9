use super::types::*;
use crate::{Result, config::CompletionConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote text-completion provider. One attempt per call, no memory between calls.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionError>;
}

/// Client for any OpenAI-compatible chat completion endpoint.
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    params: CompletionParams,
}

impl OpenAiCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(single_attempt());

        Ok(Self {
            client,
            params: CompletionParams {
                model: config.model,
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                timeout,
            },
        })
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    fn build_request(
        &self,
        prompt: &str,
    ) -> std::result::Result<openai_types::CreateChatCompletionRequest, CompletionError> {
        let user_message = openai_types::ChatCompletionRequestUserMessageArgs::default()
            .content(openai_types::ChatCompletionRequestUserMessageContent::Text(
                prompt.to_string(),
            ))
            .build()
            .map_err(|e| CompletionError::Provider(format!("Failed to build user message: {e}")))?;
        let messages: Vec<openai_types::ChatCompletionRequestMessage> = vec![user_message.into()];

        openai_types::CreateChatCompletionRequestArgs::default()
            .model(&self.params.model)
            .messages(messages)
            .temperature(self.params.temperature)
            .max_tokens(self.params.max_tokens)
            .build()
            .map_err(|e| CompletionError::Provider(format!("Failed to build request: {e}")))
    }
}

/// Backoff that gives up as soon as the first attempt fails.
fn single_attempt() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionError> {
        let request = self.build_request(prompt)?;
        debug!(
            "Requesting completion from {} for a {} character prompt",
            self.params.model,
            prompt.chars().count()
        );

        let response = tokio::time::timeout(self.params.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| CompletionError::Timeout(self.params.timeout))?
            .map_err(|e| CompletionError::Provider(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);
        let reply = non_empty_reply(content)?;

        info!(
            "Received {} character reply from {}",
            reply.chars().count(),
            self.params.model
        );
        Ok(reply)
    }
}
