//! `OpenAI` chat completions backend

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::ResponseGenerator;
use crate::config::{LlmConfig, OPENAI_API_KEY_VAR};
use crate::{Error, Result};

/// Generates replies with the `OpenAI` chat completions API
pub struct OpenAiGenerator {
    client: Client,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl OpenAiGenerator {
    /// Create a new generator
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(Error::MissingCredential {
                service: "OpenAI",
                var: OPENAI_API_KEY_VAR,
            });
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        tracing::debug!(model = %config.model, endpoint = %endpoint, "OpenAI generator configured");

        Ok(Self {
            client,
            api_key: config.api_key,
            model: config.model,
            endpoint,
        })
    }

    /// Model identifier sent with each request
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "OpenAI request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenAI API error");
            return Err(Error::Llm(format!("OpenAI API error {status}: {body}")));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("failed to parse OpenAI response: {e}")))?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Llm("response contained no choices".to_string()))?
            .message
            .content
            .ok_or_else(|| Error::Llm("first choice has no text content".to_string()))?;

        let reply = reply.trim().to_string();
        tracing::info!(reply_chars = reply.len(), "completion received");
        Ok(reply)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
