use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// What to capture in [`PageControl::screenshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotOptions {
    /// Capture only the first element matching this CSS selector.
    pub selector: Option<String>,
}

/// The operations a step can perform on a rendered page.
///
/// Selectors are CSS selectors. Every call may suspend; implementations are
/// expected to fail (not hang forever) once the page has been aborted.
#[async_trait]
pub trait PageControl: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Wait until `selector` matches an element, failing after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()>;

    /// Run `script` as the body of a function in the page. `args` are bound
    /// to `arguments[0..]`; the function's return value comes back as JSON.
    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Base64-encoded PNG.
    async fn screenshot(&self, options: ScreenshotOptions) -> Result<String>;

    /// Full serialized markup of the current document.
    async fn content(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    async fn url(&self) -> Result<String>;

    /// Choose the `<option>` whose value is `value` in a select control.
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;
}
