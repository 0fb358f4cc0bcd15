//! Driver layer for browser automation.
//!
//! This crate defines the page-control surface the step engine drives and a
//! WebDriver-backed implementation of it.
//!
//! - [`page_control::PageControl`]: the capability set consumed by the engine
//! - [`pilot_browser::driver::PilotDriver`]: WebDriver session bootstrap
//! - [`pilot_browser::page::WebDriverPage`]: `PageControl` over `fantoccini`
//!   with cooperative abort
pub mod page_control;
pub mod pilot_browser;

pub use page_control::{PageControl, ScreenshotOptions};
pub use pilot_browser::driver::PilotDriver;
pub use pilot_browser::page::{WebDriverPage, ABORTED};
