use crate::structured::match_fields;
use crate::types::{OcrRequest, OcrResponse};
use async_trait::async_trait;
use pilot_common::Result;
use std::collections::BTreeMap;

#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Recognise the text in one image.
    async fn extract_text(&self, request: OcrRequest) -> Result<OcrResponse>;

    async fn extract_from_screenshot(
        &self,
        screenshot_base64: &str,
        language: Option<&str>,
    ) -> Result<OcrResponse> {
        self.extract_text(
            OcrRequest::from_base64(screenshot_base64).with_language(language.map(str::to_string)),
        )
        .await
    }

    async fn extract_from_url(&self, url: &str, language: Option<&str>) -> Result<OcrResponse> {
        self.extract_text(OcrRequest::from_url(url).with_language(language.map(str::to_string)))
            .await
    }

    /// OCR the image, then pick `field: value` lines for each requested field.
    async fn extract_structured_data(
        &self,
        image_base64: &str,
        fields: &[String],
    ) -> Result<BTreeMap<String, String>> {
        let recognised = self
            .extract_text(OcrRequest::from_base64(image_base64))
            .await?;
        Ok(match_fields(&recognised.text, fields))
    }
}
