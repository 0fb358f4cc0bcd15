#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use pilot_common::PilotError;
use pilot_drivers::{PageControl, ScreenshotOptions, ABORTED};
use pilot_engine::{StepInterpreter, TaskExecutor};
use pilot_llm::traits::{ChatRequest, ChatResponse, LlmClient};
use pilot_ocr::{OcrClient, OcrRequest, OcrResponse};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SCREENSHOT: &str = "iVBORw0KGgoAAAANSUhEUg==";

/// One recorded page-control call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Goto(String),
    Click(String),
    Type(String, String),
    WaitForSelector(String, Duration),
    WaitForTimeout(Duration),
    Evaluate(String, Vec<Value>),
    Screenshot(ScreenshotOptions),
    Content,
    Title,
    Url,
    Select(String, String),
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::Goto(_) => "goto",
            Call::Click(_) => "click",
            Call::Type(..) => "type",
            Call::WaitForSelector(..) => "wait_for_selector",
            Call::WaitForTimeout(_) => "wait_for_timeout",
            Call::Evaluate(..) => "evaluate",
            Call::Screenshot(_) => "screenshot",
            Call::Content => "content",
            Call::Title => "title",
            Call::Url => "url",
            Call::Select(..) => "select",
        }
    }
}

/// Page double that records every call and answers from canned data.
#[derive(Default)]
pub struct RecordingPage {
    calls: Mutex<Vec<Call>>,
    eval_results: Mutex<VecDeque<Value>>,
    fail_on: Option<&'static str>,
    abort_after: Option<usize>,
    content: String,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a value for the next `evaluate` call (later calls get `null`).
    pub fn with_eval_result(self, value: Value) -> Self {
        self.eval_results.lock().unwrap().push_back(value);
        self
    }

    /// Make the named operation (see [`Call::name`]) fail.
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Behave like an aborted page once `calls` operations went through.
    pub fn aborted_after(mut self, calls: usize) -> Self {
        self.abort_after = Some(calls);
        self
    }

    pub fn with_content(mut self, html: &str) -> Self {
        self.content = html.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::name).collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        let name = call.name();
        let mut calls = self.calls.lock().unwrap();
        if self.abort_after.is_some_and(|limit| calls.len() >= limit) {
            return Err(anyhow!(ABORTED));
        }
        calls.push(call);
        drop(calls);
        match self.fail_on {
            Some(op) if op == name => Err(anyhow!("{name} failed: element not found")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PageControl for RecordingPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(Call::Goto(url.to_string()))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(Call::Click(selector.to_string()))
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        self.record(Call::Type(selector.to_string(), text.to_string()))
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.record(Call::WaitForSelector(selector.to_string(), timeout))
    }

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        self.record(Call::WaitForTimeout(duration))
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.record(Call::Evaluate(script.to_string(), args))?;
        Ok(self
            .eval_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::Null))
    }

    async fn screenshot(&self, options: ScreenshotOptions) -> Result<String> {
        self.record(Call::Screenshot(options))?;
        Ok(SCREENSHOT.to_string())
    }

    async fn content(&self) -> Result<String> {
        self.record(Call::Content)?;
        Ok(self.content.clone())
    }

    async fn title(&self) -> Result<String> {
        self.record(Call::Title)?;
        Ok("Stub".to_string())
    }

    async fn url(&self) -> Result<String> {
        self.record(Call::Url)?;
        Ok("about:blank".to_string())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        self.record(Call::Select(selector.to_string(), value.to_string()))
    }
}

/// LLM double: fixed reply (or failure), remembers prompts.
pub struct StubLlm {
    reply: std::result::Result<String, String>,
    pub prompts: Mutex<Vec<ChatRequest>>,
}

impl StubLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn chat(&self, request: ChatRequest) -> pilot_common::Result<ChatResponse> {
        self.prompts.lock().unwrap().push(request);
        match &self.reply {
            Ok(content) => Ok(ChatResponse {
                content: content.clone(),
                usage: None,
                model: "stub".into(),
            }),
            Err(message) => Err(PilotError::Llm(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// OCR double: fixed text, or an auth rejection.
pub struct StubOcr {
    text: String,
    reject_auth: bool,
    pub requests: Mutex<Vec<OcrRequest>>,
}

impl StubOcr {
    pub fn reading(text: &str) -> Self {
        Self {
            text: text.to_string(),
            reject_auth: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            reject_auth: true,
            ..Self::reading("")
        }
    }
}

#[async_trait]
impl OcrClient for StubOcr {
    async fn extract_text(&self, request: OcrRequest) -> pilot_common::Result<OcrResponse> {
        self.requests.lock().unwrap().push(request);
        if self.reject_auth {
            return Err(PilotError::OcrAuth);
        }
        Ok(OcrResponse {
            text: self.text.clone(),
            confidence: 0.9,
            blocks: Vec::new(),
        })
    }
}

pub fn interpreter() -> StepInterpreter {
    interpreter_with(
        Arc::new(StubLlm::replying("analysis")),
        Arc::new(StubOcr::reading("recognised")),
    )
}

pub fn interpreter_with(llm: Arc<StubLlm>, ocr: Arc<StubOcr>) -> StepInterpreter {
    StepInterpreter::new(llm, ocr)
}

pub fn executor() -> TaskExecutor {
    TaskExecutor::new(interpreter())
}
