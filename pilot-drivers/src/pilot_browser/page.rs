use crate::page_control::{PageControl, ScreenshotOptions};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use fantoccini::{elements::Element, Client, Locator};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Returned by every call made after [`WebDriverPage::abort`].
pub const ABORTED: &str = "page control aborted";

/// [`PageControl`] over a WebDriver session.
///
/// Clones share the session and the abort token.
#[derive(Clone)]
pub struct WebDriverPage {
    client: Client,
    cancel: CancellationToken,
}

impl WebDriverPage {
    pub fn new(client: Client) -> Self {
        Self::with_cancellation(client, CancellationToken::new())
    }

    pub fn with_cancellation(client: Client, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    /// Fail the in-flight call and every later one.
    pub fn abort(&self) {
        tracing::warn!("page.abort");
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token that aborts this page when cancelled.
    pub fn abort_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn find(&self, selector: &str) -> Result<Element> {
        self.client
            .find(Locator::Css(selector))
            .await
            .with_context(|| format!("no element matches `{selector}`"))
    }
}

/// Race `fut` against `cancel`.
pub(crate) async fn abortable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(anyhow!(ABORTED));
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(anyhow!(ABORTED)),
        res = fut => res,
    }
}

fn encode_png(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[async_trait]
impl PageControl for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!(%url, "page.goto");
        abortable(&self.cancel, async {
            self.client
                .goto(url)
                .await
                .with_context(|| format!("navigation to {url} failed"))
        })
        .await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        tracing::debug!(%selector, "page.click");
        abortable(&self.cancel, async {
            self.find(selector).await?.click().await?;
            Ok(())
        })
        .await
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        tracing::debug!(%selector, len = text.len(), "page.type");
        abortable(&self.cancel, async {
            self.find(selector).await?.send_keys(text).await?;
            Ok(())
        })
        .await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        tracing::debug!(
            %selector,
            timeout_ms = timeout.as_millis() as u64,
            "page.wait_for_selector"
        );
        abortable(&self.cancel, async {
            self.client
                .wait()
                .at_most(timeout)
                .for_element(Locator::Css(selector))
                .await
                .with_context(|| {
                    format!("waiting for `{selector}` ({}ms)", timeout.as_millis())
                })?;
            Ok(())
        })
        .await
    }

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        abortable(&self.cancel, async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        tracing::debug!(script_len = script.len(), argc = args.len(), "page.evaluate");
        abortable(&self.cancel, async {
            self.client
                .execute(script, args)
                .await
                .context("script evaluation failed")
        })
        .await
    }

    async fn screenshot(&self, options: ScreenshotOptions) -> Result<String> {
        abortable(&self.cancel, async {
            let png = match options.selector.as_deref() {
                Some(selector) => self.find(selector).await?.screenshot().await?,
                None => self.client.screenshot().await?,
            };
            tracing::debug!(bytes = png.len(), "page.screenshot");
            Ok(encode_png(&png))
        })
        .await
    }

    async fn content(&self) -> Result<String> {
        abortable(&self.cancel, async { Ok(self.client.source().await?) }).await
    }

    async fn title(&self) -> Result<String> {
        abortable(&self.cancel, async { Ok(self.client.title().await?) }).await
    }

    async fn url(&self) -> Result<String> {
        abortable(&self.cancel, async {
            Ok(self.client.current_url().await?.to_string())
        })
        .await
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        tracing::debug!(%selector, %value, "page.select");
        abortable(&self.cancel, async {
            self.find(selector).await?.select_by_value(value).await?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn abort_interrupts_pending_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = abortable(&cancel, async {
            std::future::pending::<()>().await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), ABORTED);
    }

    #[tokio::test]
    async fn calls_after_abort_fail_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = abortable(&cancel, async { Ok(1) }).await.unwrap_err();
        assert_eq!(err.to_string(), ABORTED);
    }

    #[tokio::test]
    async fn completed_calls_pass_through() {
        let cancel = CancellationToken::new();
        assert_eq!(abortable(&cancel, async { Ok(7) }).await.unwrap(), 7);
    }

    #[test]
    fn png_bytes_are_standard_base64() {
        assert_eq!(encode_png(&[0x89, b'P', b'N', b'G']), "iVBORw==");
    }
}
