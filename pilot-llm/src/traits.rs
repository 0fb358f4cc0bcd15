use crate::json::{parse_json_array, parse_json_object};
use async_trait::async_trait;
use pilot_common::{PilotError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One chat-completion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Overrides the client's configured model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub model: String,
}

const ANALYZE_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that analyzes text and provides structured insights.";
const EXTRACT_SYSTEM_PROMPT: &str =
    "You are a data extraction assistant. Always respond with valid JSON.";
const PLAN_SYSTEM_PROMPT: &str =
    "You are an automation expert. Generate practical browser automation steps as valid JSON.";

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single chat turn and return the first completion.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Free-form analysis of `text` following `instruction`.
    async fn analyze_text(&self, text: &str, instruction: &str) -> Result<String> {
        let request = ChatRequest::new(format!("{instruction}\n\nText to analyze:\n{text}"))
            .with_system_prompt(ANALYZE_SYSTEM_PROMPT);

        let response = self.chat(request).await?;
        tracing::debug!(
            model = %response.model,
            reply_len = response.content.len(),
            "llm.analyze_text"
        );
        Ok(response.content)
    }

    /// Pull the fields described by `schema` (name -> description) out of an
    /// HTML document.
    async fn extract_data(
        &self,
        html: &str,
        schema: &BTreeMap<String, String>,
    ) -> Result<Map<String, Value>> {
        let schema_description = schema
            .iter()
            .map(|(key, description)| format!("{key}: {description}"))
            .collect::<Vec<_>>()
            .join("\n");

        let request = ChatRequest::new(format!(
            "Extract the following data from the HTML:\n{schema_description}\n\nHTML:\n{html}\n\nRespond with a JSON object containing the extracted data."
        ))
        .with_system_prompt(EXTRACT_SYSTEM_PROMPT);

        let response = self.chat(request).await?;
        parse_json_object(&response.content).ok_or_else(|| {
            tracing::warn!(reply = %response.content, "llm.extract_data.unparseable");
            PilotError::Parse("Failed to parse extracted data as JSON".to_string())
        })
    }

    /// Ask the model to plan browser steps for a task description.
    ///
    /// The returned values are step-shaped JSON objects; callers decide how
    /// strictly to validate them.
    async fn generate_automation_steps(&self, description: &str) -> Result<Vec<Value>> {
        let request = ChatRequest::new(format!(
            "Generate browser automation steps for the following task: {description}\n\nProvide the steps as a JSON array with action type, selector, and value fields."
        ))
        .with_system_prompt(PLAN_SYSTEM_PROMPT);

        let response = self.chat(request).await?;
        parse_json_array(&response.content).ok_or_else(|| {
            tracing::warn!(reply = %response.content, "llm.generate_steps.unparseable");
            PilotError::Parse("Failed to parse automation steps as JSON".to_string())
        })
    }
}
