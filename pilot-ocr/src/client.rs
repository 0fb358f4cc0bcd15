use crate::traits::OcrClient;
use crate::types::{BoundingBox, OcrBlock, OcrRequest, OcrResponse};
use async_trait::async_trait;
use pilot_common::{OcrConfig, PilotError, Result};
use pilot_http::{HttpClient, HttpError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OCR service reached over JSON/HTTP with bearer auth.
pub struct HttpOcrClient {
    client: HttpClient,
    api_key: String,
    language: String,
}

#[derive(Serialize)]
struct OcrPayload<'a> {
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    blocks: Option<Vec<WireBlock>>,
}

#[derive(Debug, Deserialize)]
struct WireBlock {
    #[serde(default)]
    text: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    bounding_box: Option<WireBox>,
}

#[derive(Debug, Default, Deserialize)]
struct WireBox {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
}

impl HttpOcrClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = HttpClient::new(&config.endpoint)
            .map_err(|e| PilotError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_retries(0);

        if config.auth_token.is_empty() {
            tracing::warn!(endpoint = %config.endpoint, "ocr.no_auth_token");
        }

        Ok(Self {
            client,
            api_key: config.auth_token.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl OcrClient for HttpOcrClient {
    async fn extract_text(&self, request: OcrRequest) -> Result<OcrResponse> {
        let image_url = request.image_url.as_deref().filter(|s| !s.is_empty());
        let image = request.image_base64.as_deref().filter(|s| !s.is_empty());
        let payload = match (image_url, image) {
            (Some(url), _) => OcrPayload {
                language: request.language.as_deref().unwrap_or(&self.language),
                image_url: Some(url),
                image: None,
            },
            (None, Some(data)) => OcrPayload {
                language: request.language.as_deref().unwrap_or(&self.language),
                image_url: None,
                image: Some(data),
            },
            (None, None) => {
                return Err(PilotError::Ocr(
                    "Either imageUrl or imageBase64 must be provided".to_string(),
                ))
            }
        };

        tracing::debug!(
            language = payload.language,
            by_url = payload.image_url.is_some(),
            image_len = payload.image.map(str::len).unwrap_or(0),
            "ocr.extract_text"
        );

        let wire: WireResponse = self
            .client
            .post_json("", Some(&self.api_key), &payload)
            .await
            .map_err(http_to_pilot)?;

        Ok(into_response(wire))
    }
}

fn into_response(wire: WireResponse) -> OcrResponse {
    let blocks: Vec<OcrBlock> = wire
        .blocks
        .unwrap_or_default()
        .into_iter()
        .map(|b| {
            let bb = b.bounding_box.unwrap_or_default();
            OcrBlock {
                text: b.text,
                confidence: b.confidence.unwrap_or(0.0),
                bounding_box: BoundingBox {
                    x: bb.x.unwrap_or(0.0),
                    y: bb.y.unwrap_or(0.0),
                    width: bb.width.unwrap_or(0.0),
                    height: bb.height.unwrap_or(0.0),
                },
            }
        })
        .collect();

    let text = match wire.text {
        Some(t) if !t.is_empty() => t,
        _ => blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };

    OcrResponse {
        text,
        confidence: wire.confidence.unwrap_or(0.0),
        blocks,
    }
}

fn http_to_pilot(e: HttpError) -> PilotError {
    if e.is_unauthorized() {
        PilotError::OcrAuth
    } else {
        PilotError::Ocr(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_get_zero_defaults() {
        let wire: WireResponse = serde_json::from_value(json!({
            "blocks": [
                { "text": "Hello", "confidence": 0.9, "bounding_box": { "x": 1, "y": 2 } },
                { "text": "world" }
            ]
        }))
        .unwrap();
        let resp = into_response(wire);

        assert_eq!(resp.text, "Hello world");
        assert_eq!(resp.confidence, 0.0);
        assert_eq!(
            resp.blocks[0].bounding_box,
            BoundingBox { x: 1.0, y: 2.0, width: 0.0, height: 0.0 }
        );
        assert_eq!(resp.blocks[1].confidence, 0.0);
        assert_eq!(resp.blocks[1].bounding_box, BoundingBox::default());
    }

    #[test]
    fn server_text_wins_over_blocks() {
        let wire: WireResponse = serde_json::from_value(json!({
            "text": "full text",
            "confidence": 0.75,
            "blocks": [{ "text": "partial" }]
        }))
        .unwrap();
        let resp = into_response(wire);
        assert_eq!(resp.text, "full text");
        assert_eq!(resp.confidence, 0.75);
    }
}
