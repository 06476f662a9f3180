//! Ollama chat client used to generate the spoken rebuke

use async_trait::async_trait;
use sentinel_config::GeneratorConfig;
use sentinel_host_api::{GenerationRequest, MessageGenerator, NotifyError, NotifyResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Non-streaming client for a local Ollama server
pub struct OllamaGenerator {
    client: reqwest::Client,
    chat_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GeneratorConfig) -> NotifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Generation(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            chat_url: chat_url(&config.endpoint),
            model: config.model.clone(),
        })
    }
}

fn chat_url(endpoint: &str) -> String {
    format!("{}/api/chat", endpoint.trim_end_matches('/'))
}

fn chat_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [ChatMessage {
            role: "user",
            content: prompt,
        }],
        stream: false,
    }
}

#[async_trait]
impl MessageGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> NotifyResult<String> {
        debug!(url = %self.chat_url, model = %self.model, "Requesting rebuke");

        let response = self
            .client
            .post(&self.chat_url)
            .json(&chat_request(&self.model, &request.prompt))
            .send()
            .await
            .map_err(|e| NotifyError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Generation(format!(
                "Ollama error {}: {}",
                status, body
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Generation(format!("Unreadable reply: {}", e)))?;

        Ok(reply.message.content)
    }
}
