//! Needs a running chromedriver on the configured URL.

use pilot_common::BrowserConfig;
use pilot_drivers::{PageControl, PilotDriver, ScreenshotOptions};
use serde_json::json;
use std::time::Duration;

const PAGE: &str = "data:text/html,<title>Pilot</title><h1 id='t'> Hello </h1><select id='s'><option value='a'>A</option><option value='b'>B</option></select>";

#[tokio::test]
#[ignore]
async fn drives_a_data_url_page() -> anyhow::Result<()> {
    let driver = PilotDriver::connect(&BrowserConfig::default()).await?;
    let page = driver.page();

    page.goto(PAGE).await?;
    page.wait_for_selector("#t", Duration::from_secs(5)).await?;
    assert_eq!(page.title().await?, "Pilot");

    let text = page
        .evaluate(
            "const el = document.querySelector(arguments[0]); return el ? el.textContent.trim() : null;",
            vec![json!("#t")],
        )
        .await?;
    assert_eq!(text, json!("Hello"));

    page.select_option("#s", "b").await?;
    let chosen = page
        .evaluate("return document.querySelector('#s').value;", vec![])
        .await?;
    assert_eq!(chosen, json!("b"));

    let png = page.screenshot(ScreenshotOptions::default()).await?;
    assert!(png.starts_with("iVBOR"));

    driver.abort_handle().cancel();
    let err = page.title().await.unwrap_err();
    assert_eq!(err.to_string(), "page control aborted");

    driver.close().await?;
    Ok(())
}
