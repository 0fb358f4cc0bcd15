//! OCR bridge for Pilot.
//!
//! [`OcrClient`] is the contract the engine consumes; [`HttpOcrClient`] talks
//! to a JSON OCR service (DeepSeek-style `{language, image | image_url}`
//! payloads). Structured extraction is a plain regex pass over the
//! recognised text, see [`structured::match_fields`].
//!
//! ```no_run
//! use pilot_common::OcrConfig;
//! use pilot_ocr::{HttpOcrClient, OcrClient};
//!
//! # async fn demo() -> pilot_common::Result<()> {
//! let ocr = HttpOcrClient::new(&OcrConfig::default())?;
//! let found = ocr
//!     .extract_structured_data("iVBORw0KGgo...", &["Total".to_string()])
//!     .await?;
//! println!("{found:?}");
//! # Ok(()) }
//! ```

pub mod client;
pub mod structured;
pub mod traits;
pub mod types;

pub use client::HttpOcrClient;
pub use traits::OcrClient;
pub use types::{BoundingBox, OcrBlock, OcrRequest, OcrResponse};
