//! Step-execution engine for Pilot.
//!
//! A [`Task`] is an ordered list of [`Step`]s. The [`TaskExecutor`] walks
//! them one at a time through the [`StepInterpreter`], which drives a
//! [`pilot_drivers::PageControl`] and, for `llmAnalyze` / `ocrExtract`, the
//! AI bridges. The first failing step ends the run; everything that happened
//! is reported in a [`TaskResult`].
//!
//! ```no_run
//! use pilot_engine::{Step, StepInterpreter, Task, TaskExecutor};
//! use pilot_ocr::HttpOcrClient;
//! use std::sync::Arc;
//!
//! # async fn demo(page: &dyn pilot_drivers::PageControl) -> pilot_common::Result<()> {
//! let llm = pilot_llm::connect_llm(&Default::default()).await?;
//! let ocr = Arc::new(HttpOcrClient::new(&Default::default())?);
//! let executor = TaskExecutor::new(StepInterpreter::new(llm, ocr));
//!
//! let task = Task::new(
//!     "title",
//!     None,
//!     vec![
//!         Step::new("navigate").with_value("https://example.com"),
//!         Step::new("extract").with_selector("h1").with_output("heading"),
//!     ],
//! );
//! let result = executor.run(&task, page).await;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
//! # Ok(()) }
//! ```

pub mod error;
pub mod executor;
pub mod interpreter;
pub mod model;
pub mod variables;

pub use error::{StepExecutionError, StepFault};
pub use executor::TaskExecutor;
pub use interpreter::StepInterpreter;
pub use model::{ActionType, Step, Task, TaskResult, TaskStatus};
pub use variables::Variables;
