//! Common types and utilities shared across Pilot crates.
//!
//! This crate defines the provider settings, observability helpers, and the
//! shared error type used throughout the Pilot workspace. It is intentionally
//! lightweight so that every crate can depend on it without pulling in the
//! HTTP or WebDriver stacks.
//!
//! # Overview
//!
//! - [`LlmConfig`]: provider‑agnostic language‑model settings
//! - [`OcrConfig`]: OCR service settings
//! - [`BrowserConfig`]: WebDriver session settings
//! - [`EngineConfig`]: step timeouts and defaults used by the interpreter
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`PilotError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use pilot_common::EngineConfig;
//!
//! let engine = EngineConfig::default();
//! assert_eq!(engine.element_timeout_ms, 5_000);
//! assert_eq!(engine.default_wait_ms, 1_000);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.deepseek.com/v1/ocr";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Language‑model provider settings.
///
/// The tag is `provider`; see the `pilot-llm` crate for the clients built
/// from each variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    /// Any OpenAI‑compatible `chat/completions` endpoint.
    Openai {
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        auth_token: String,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default = "default_llm_timeout_secs")]
        timeout_secs: u64,
    },
    /// A local Ollama server.
    Ollama {
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    /// No model configured; AI steps fail when executed.
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::None
    }
}

/// OCR service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrConfig {
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    /// Language hint sent when a request does not name one.
    #[serde(default = "default_ocr_language")]
    pub language: String,
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            auth_token: String::new(),
            endpoint: default_ocr_endpoint(),
            language: default_ocr_language(),
            timeout_secs: default_ocr_timeout_secs(),
        }
    }
}

/// WebDriver session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
        }
    }
}

/// Timeouts and fallbacks applied by the step interpreter when a step leaves
/// them unspecified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// How long `click` and `type` wait for their selector.
    pub element_timeout_ms: u64,
    /// Selector timeout for `wait` when the step has no `waitTime`.
    pub wait_selector_timeout_ms: u64,
    /// Sleep for `wait` without selector or `waitTime`.
    pub default_wait_ms: u64,
    /// Vertical scroll distance for `scroll` without selector or value.
    pub default_scroll_px: i64,
    /// Instruction for `llmAnalyze` without a value.
    pub default_instruction: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            element_timeout_ms: 5_000,
            wait_selector_timeout_ms: 10_000,
            default_wait_ms: 1_000,
            default_scroll_px: 500,
            default_instruction: "Analyze this page content".to_string(),
        }
    }
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_openai_endpoint() -> String {
    DEFAULT_OPENAI_ENDPOINT.into()
}
fn default_ollama_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.into()
}
fn default_ocr_endpoint() -> String {
    DEFAULT_OCR_ENDPOINT.into()
}
fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.into()
}
fn default_ocr_language() -> String {
    "en".into()
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_ocr_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

/// Error types used across the Pilot system.
#[derive(thiserror::Error, Debug)]
pub enum PilotError {
    /// The language‑model service failed or answered with something unusable.
    #[error("LLM API error: {0}")]
    Llm(String),

    /// The OCR service failed.
    #[error("OCR API error: {0}")]
    Ocr(String),

    /// The OCR service rejected our credentials.
    #[error("OCR API authentication failed. Please check your API key.")]
    OcrAuth,

    /// A model reply could not be turned into the requested structure.
    #[error("{0}")]
    Parse(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`PilotError`].
pub type Result<T> = std::result::Result<T, PilotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn llm_config_defaults_fill_missing_fields() {
        let cfg: LlmConfig = serde_json::from_value(json!({
            "provider": "openai",
            "auth_token": "sk-test"
        }))
        .unwrap();

        match cfg {
            LlmConfig::Openai {
                model,
                endpoint,
                timeout_secs,
                ..
            } => {
                assert_eq!(model, "gpt-4");
                assert_eq!(endpoint, DEFAULT_OPENAI_ENDPOINT);
                assert_eq!(timeout_secs, 60);
            }
            other => panic!("expected openai, got {other:?}"),
        }
    }

    #[test]
    fn none_provider_parses() {
        let cfg: LlmConfig = serde_json::from_value(json!({ "provider": "none" })).unwrap();
        assert_eq!(cfg, LlmConfig::None);
    }

    #[test]
    fn engine_config_partial_override() {
        let cfg: EngineConfig =
            serde_json::from_value(json!({ "default_wait_ms": 250 })).unwrap();
        assert_eq!(cfg.default_wait_ms, 250);
        assert_eq!(cfg.wait_selector_timeout_ms, 10_000);
        assert_eq!(cfg.default_instruction, "Analyze this page content");
    }

    #[test]
    fn error_messages_name_the_service() {
        assert_eq!(
            PilotError::OcrAuth.to_string(),
            "OCR API authentication failed. Please check your API key."
        );
        assert_eq!(
            PilotError::Llm("boom".into()).to_string(),
            "LLM API error: boom"
        );
        assert_eq!(
            PilotError::Parse("Failed to parse extracted data as JSON".into()).to_string(),
            "Failed to parse extracted data as JSON"
        );
    }
}
