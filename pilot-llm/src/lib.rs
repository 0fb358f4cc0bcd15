//! Provider‑agnostic language‑model bridge for Pilot.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for OpenAI-compatible endpoints and Ollama. It
//! also provides a convenience function to build a client from a
//! [`pilot_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use pilot_common::{LlmConfig, Result};
//! use pilot_llm::connect_llm;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = LlmConfig::None;
//! let client = connect_llm(&cfg).await?;
//! assert_eq!(client.model_name(), "none");
//! # Ok(())
//! # }
//! ```
pub mod json;
pub mod ollama;
pub mod openai;
pub mod traits;

use async_trait::async_trait;
use ollama::OllamaClient;
use openai::OpenAiClient;
use pilot_common::{LlmConfig, PilotError};
use std::sync::Arc;
use std::time::Duration;
use traits::{ChatRequest, ChatResponse, LlmClient};

/// Stand-in used when no provider is configured.
///
/// Construction always succeeds so that tasks without AI steps still run;
/// every call fails with a configuration error.
pub struct Unconfigured;

#[async_trait]
impl LlmClient for Unconfigured {
    async fn chat(&self, _request: ChatRequest) -> pilot_common::Result<ChatResponse> {
        Err(PilotError::Config("No LLM configured".to_string()))
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

/// Build the client for `config`, verifying local providers are reachable.
pub async fn connect_llm(
    config: &LlmConfig,
) -> pilot_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Openai {
            model,
            auth_token,
            endpoint,
            temperature,
            max_tokens,
            timeout_secs,
        } => {
            let client = OpenAiClient::new(endpoint, auth_token.clone(), model.clone())?
                .with_timeout(Duration::from_secs(*timeout_secs))
                .with_defaults(*temperature, *max_tokens);
            tracing::info!(provider = "openai", %model, %endpoint, "llm.connected");
            Ok(Arc::new(client))
        }
        LlmConfig::Ollama {
            model,
            endpoint,
            temperature,
            max_tokens,
        } => {
            let client = OllamaClient::new(endpoint, model.clone())
                .await?
                .with_defaults(*temperature, *max_tokens);
            tracing::info!(provider = "ollama", %model, %endpoint, "llm.connected");
            Ok(Arc::new(client))
        }
        LlmConfig::None => {
            tracing::debug!("llm.unconfigured");
            Ok(Arc::new(Unconfigured))
        }
    }
}
