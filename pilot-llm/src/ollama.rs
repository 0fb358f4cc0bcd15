use crate::traits::{ChatRequest, ChatResponse, LlmClient, TokenUsage};
use async_trait::async_trait;
use pilot_common::{PilotError, Result};
use pilot_http::{HttpClient, RequestOpts};
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: HttpClient,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OllamaClient {
    /// Create a new client and verify server/model availability.
    pub async fn new(base_url: &str, model: String) -> Result<Self> {
        let client = HttpClient::new(base_url)
            .map_err(|e| PilotError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(Duration::from_secs(120))
            .with_retries(0);

        let ollama_client = Self {
            client,
            model,
            temperature: None,
            max_tokens: None,
        };

        ollama_client.probe_server().await?;
        ollama_client.ensure_model_available().await?;

        Ok(ollama_client)
    }

    /// Sampling defaults applied when a request leaves them unset.
    pub fn with_defaults(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    async fn probe_server(&self) -> Result<()> {
        self.fetch_tags(Duration::from_secs(10))
            .await
            .map(|_| ())
            .map_err(|_| PilotError::Llm(OLLAMA_CONNECTION_ERROR.to_string()))
    }

    async fn ensure_model_available(&self) -> Result<()> {
        let models = self.fetch_available_models().await?;

        if !models.contains(&self.model) {
            tracing::info!("Model {} not found locally, pulling...", self.model);
            self.pull_model(&self.model).await?;
        }

        Ok(())
    }

    async fn fetch_tags(
        &self,
        timeout: Duration,
    ) -> std::result::Result<JsonValue, pilot_http::HttpError> {
        // Listing tags has no side effects, so a server still starting up
        // gets a couple of attempts.
        let opts = RequestOpts {
            timeout: Some(timeout),
            retries: Some(2),
            ..Default::default()
        };
        self.client.get_json("api/tags", opts).await
    }

    async fn fetch_available_models(&self) -> Result<Vec<String>> {
        let val = self
            .fetch_tags(Duration::from_secs(10))
            .await
            .map_err(|e| PilotError::Llm(format!("Failed to fetch models: {e}")))?;

        let models = val
            .get("models")
            .and_then(|m| m.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.get("name").and_then(|n| n.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn pull_model(&self, model: &str) -> Result<()> {
        let payload = json!({
            "model": model,
            "stream": false
        });
        let opts = RequestOpts {
            timeout: Some(Duration::from_secs(1800)),
            retries: Some(0),
            ..Default::default()
        };

        let _: JsonValue = self
            .client
            .post_json_opts("api/pull", &payload, opts)
            .await
            .map_err(|e| PilotError::Llm(format!("Failed to pull model: {e}")))?;

        tracing::info!("Successfully pulled model: {}", model);
        Ok(())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut options = serde_json::Map::new();
        if let Some(temp) = request.temperature.or(self.temperature) {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tok) = request.max_tokens.or(self.max_tokens) {
            options.insert("num_predict".to_string(), json!(max_tok));
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let model = request.model.as_deref().unwrap_or(&self.model);
        let payload = json!({
            "model": model,
            "messages": messages,
            "stream": false,
            "options": options
        });

        let val: JsonValue = self
            .client
            .post_json("api/chat", None, &payload)
            .await
            .map_err(|e| PilotError::Llm(format!("Chat request failed: {e}")))?;

        let content = val
            .pointer("/message/content")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        let prompt_tokens = val.get("prompt_eval_count").and_then(|c| c.as_u64());
        let completion_tokens = val.get("eval_count").and_then(|c| c.as_u64());
        let usage = match (prompt_tokens, completion_tokens) {
            (None, None) => None,
            (p, c) => {
                let p = p.unwrap_or(0) as u32;
                let c = c.unwrap_or(0) as u32;
                Some(TokenUsage {
                    prompt_tokens: p,
                    completion_tokens: c,
                    total_tokens: p + c,
                })
            }
        };

        Ok(ChatResponse {
            content,
            usage,
            model: val
                .get("model")
                .and_then(|m| m.as_str())
                .unwrap_or(model)
                .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
