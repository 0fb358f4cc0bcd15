//! Executes a single [`Step`] against a page.

use crate::error::{StepExecutionError, StepFault};
use crate::model::{ActionType, Step};
use crate::variables::Variables;
use pilot_common::EngineConfig;
use pilot_drivers::{PageControl, ScreenshotOptions};
use pilot_llm::traits::LlmClient;
use pilot_ocr::OcrClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const EXTRACT_TEXT_JS: &str = "const el = document.querySelector(arguments[0]); \
     return el ? (el.textContent || '').trim() : null;";
const SCROLL_INTO_VIEW_JS: &str = "const el = document.querySelector(arguments[0]); \
     if (el) { el.scrollIntoView({ behavior: 'smooth', block: 'center' }); }";
const SCROLL_BY_JS: &str = "window.scrollBy(0, arguments[0]);";
// Global eval yields the completion value of an expression or statement list.
// A script written as a function body (`return ...`) cannot be eval'd and is
// run through `Function` instead.
const EVALUATE_SCRIPT_JS: &str = "const src = arguments[0]; \
     try { return (0, eval)(src); } catch (e) { \
       if (e instanceof SyntaxError && /\\breturn\\b/.test(src)) { return new Function(src)(); } \
       throw e; \
     }";

type StepOutcome = Result<(), StepFault>;

/// Dispatches steps to their handlers.
///
/// Holds the two AI bridges and the timeouts/defaults; it keeps no per-run
/// state, so one interpreter can serve concurrent runs.
pub struct StepInterpreter {
    llm: Arc<dyn LlmClient>,
    ocr: Arc<dyn OcrClient>,
    config: EngineConfig,
}

impl StepInterpreter {
    pub fn new(llm: Arc<dyn LlmClient>, ocr: Arc<dyn OcrClient>) -> Self {
        Self::with_config(llm, ocr, EngineConfig::default())
    }

    pub fn with_config(
        llm: Arc<dyn LlmClient>,
        ocr: Arc<dyn OcrClient>,
        config: EngineConfig,
    ) -> Self {
        Self { llm, ocr, config }
    }

    /// Run `step`, binding its output (if any) into `variables`.
    pub async fn execute(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> Result<(), StepExecutionError> {
        self.dispatch(step, page, variables)
            .await
            .map_err(|fault| StepExecutionError::new(step.action.clone(), fault))
    }

    async fn dispatch(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> StepOutcome {
        match &step.action {
            ActionType::Navigate => self.navigate(step, page).await,
            ActionType::Click => self.click(step, page).await,
            ActionType::Type => self.type_text(step, page).await,
            ActionType::Wait => self.wait(step, page).await,
            ActionType::Extract => self.extract(step, page, variables).await,
            ActionType::Screenshot => self.screenshot(step, page, variables).await,
            ActionType::Scroll => self.scroll(step, page).await,
            ActionType::Select => self.select(step, page).await,
            ActionType::ExecuteScript => self.execute_script(step, page, variables).await,
            ActionType::LlmAnalyze => self.llm_analyze(step, page, variables).await,
            ActionType::OcrExtract => self.ocr_extract(step, page, variables).await,
            ActionType::Unknown(name) => Err(StepFault::UnknownAction(name.clone())),
        }
    }

    async fn navigate(&self, step: &Step, page: &dyn PageControl) -> StepOutcome {
        let url = required(step.value(), "Navigate action requires a URL value")?;
        page.goto(url).await?;
        Ok(())
    }

    async fn click(&self, step: &Step, page: &dyn PageControl) -> StepOutcome {
        let selector = required(step.selector(), "Click action requires a selector")?;
        page.wait_for_selector(selector, self.element_timeout()).await?;
        page.click(selector).await?;
        Ok(())
    }

    async fn type_text(&self, step: &Step, page: &dyn PageControl) -> StepOutcome {
        let selector = required(step.selector(), "Type action requires a selector")?;
        let text = required(step.value(), "Type action requires a value")?;
        page.wait_for_selector(selector, self.element_timeout()).await?;
        page.type_text(selector, text).await?;
        Ok(())
    }

    async fn wait(&self, step: &Step, page: &dyn PageControl) -> StepOutcome {
        match step.selector() {
            Some(selector) => {
                let ms = step
                    .wait_time()
                    .unwrap_or(self.config.wait_selector_timeout_ms);
                page.wait_for_selector(selector, Duration::from_millis(ms)).await?;
            }
            None => {
                let ms = step.wait_time().unwrap_or(self.config.default_wait_ms);
                page.wait_for_timeout(Duration::from_millis(ms)).await?;
            }
        }
        Ok(())
    }

    async fn extract(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> StepOutcome {
        let selector = required(step.selector(), "Extract action requires a selector")?;
        let text = page.evaluate(EXTRACT_TEXT_JS, vec![json!(selector)]).await?;
        bind(step, variables, text);
        Ok(())
    }

    async fn screenshot(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> StepOutcome {
        let image = page.screenshot(ScreenshotOptions::default()).await?;
        bind(step, variables, Value::String(image));
        Ok(())
    }

    async fn scroll(&self, step: &Step, page: &dyn PageControl) -> StepOutcome {
        if let Some(selector) = step.selector() {
            page.evaluate(SCROLL_INTO_VIEW_JS, vec![json!(selector)]).await?;
            return Ok(());
        }

        let amount = match step.value() {
            Some(raw) => match leading_int(raw) {
                Some(px) => px,
                None => {
                    tracing::debug!(value = raw, "scroll.not_a_number");
                    return Ok(());
                }
            },
            None => self.config.default_scroll_px,
        };
        page.evaluate(SCROLL_BY_JS, vec![json!(amount)]).await?;
        Ok(())
    }

    async fn select(&self, step: &Step, page: &dyn PageControl) -> StepOutcome {
        let selector = required(step.selector(), "Select action requires a selector")?;
        let value = required(step.value(), "Select action requires a value")?;
        page.select_option(selector, value).await?;
        Ok(())
    }

    async fn execute_script(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> StepOutcome {
        let script = required(step.value(), "ExecuteScript action requires a script value")?;
        let returned = page.evaluate(EVALUATE_SCRIPT_JS, vec![json!(script)]).await?;
        bind(step, variables, returned);
        Ok(())
    }

    async fn llm_analyze(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> StepOutcome {
        let content = page.content().await?;
        let instruction = step
            .value()
            .unwrap_or(self.config.default_instruction.as_str());

        let analysis = self.llm.analyze_text(&content, instruction).await?;
        bind(step, variables, Value::String(analysis));
        Ok(())
    }

    async fn ocr_extract(
        &self,
        step: &Step,
        page: &dyn PageControl,
        variables: &mut Variables,
    ) -> StepOutcome {
        let image = page.screenshot(ScreenshotOptions::default()).await?;
        let recognised = self.ocr.extract_from_screenshot(&image, None).await?;
        bind(step, variables, Value::String(recognised.text));
        Ok(())
    }

    fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.config.element_timeout_ms)
    }
}

/// Leading integer of `raw` in `parseInt(raw, 10)` fashion: optional
/// whitespace and sign, then digits up to the first non-digit.
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn required<'a>(field: Option<&'a str>, missing: &'static str) -> Result<&'a str, StepFault> {
    field.ok_or(StepFault::MissingField(missing))
}

fn bind(step: &Step, variables: &mut Variables, value: Value) {
    if let Some(name) = step.output_variable() {
        variables.set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::leading_int;

    #[test]
    fn leading_int_reads_like_parse_int() {
        assert_eq!(leading_int("400"), Some(400));
        assert_eq!(leading_int("400px"), Some(400));
        assert_eq!(leading_int("12.5"), Some(12));
        assert_eq!(leading_int("  -80 down"), Some(-80));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(leading_int("lots"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(" px400"), None);
    }
}
