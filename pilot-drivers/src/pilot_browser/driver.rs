use crate::pilot_browser::page::WebDriverPage;
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use pilot_common::BrowserConfig;
use serde_json::json;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use webdriver::capabilities::Capabilities;

/// A WebDriver session plus the abort token shared by its pages.
pub struct PilotDriver {
    pub client: Client,
    cancel: CancellationToken,
}

/// Chrome capabilities for `config`.
pub fn browser_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    let mut chrome_opts = HashMap::new();

    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-infobars".to_string(),
        "--window-size=1366,768".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    chrome_opts.insert("args".to_string(), json!(args));

    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

impl PilotDriver {
    /// Connect to the WebDriver service named in `config`
    /// (Chromedriver at `http://localhost:9515` by default).
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        tracing::info!(
            webdriver_url = %config.webdriver_url,
            headless = config.headless,
            "driver.connect"
        );
        let client = ClientBuilder::native()
            .capabilities(browser_capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .with_context(|| format!("could not open a session at {}", config.webdriver_url))?;

        Ok(Self {
            client,
            cancel: CancellationToken::new(),
        })
    }

    /// Page handle sharing this session's abort token.
    pub fn page(&self) -> WebDriverPage {
        WebDriverPage::with_cancellation(self.client.clone(), self.cancel.clone())
    }

    /// Token that aborts every page of this session when cancelled.
    pub fn abort_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
